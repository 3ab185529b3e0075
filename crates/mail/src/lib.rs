//! Outbound email for confirmation codes.
//!
//! Handlers depend on the [`Mailer`] trait only. The binary picks
//! [`SmtpMailer`] when `SMTP_HOST` is configured and falls back to
//! [`LogMailer`]; integration tests use [`MemoryMailer`] to read back the
//! codes that would have been sent.

pub mod error;
pub mod mailer;
pub mod message;
pub mod smtp;

pub use error::MailError;
pub use mailer::{LogMailer, Mailer, MemoryMailer};
pub use message::{confirmation_message, OutgoingMail};
pub use smtp::{EmailConfig, SmtpMailer};
