//! Message contents.

/// A plain-text email ready to hand to a [`Mailer`](crate::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Build the email carrying a signup confirmation code.
pub fn confirmation_message(to: &str, username: &str, code: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: "YaMDb confirmation code".to_string(),
        body: format!(
            "Hello, {username}!\n\n\
             Your confirmation code: {code}\n\n\
             Exchange it together with your username at /api/v1/auth/token \
             to receive an access token. The code can be used once."
        ),
    }
}
