pub mod mime;
pub mod scanner;

pub use scanner::{MailboxConfig, MailboxError, MailboxScanner};
