use serde::{Deserialize, Serialize};

/// Transient result of one matched mailbox message.
///
/// Created during a scan, handed to the frontend for confirmation, then
/// discarded. By the time this struct exists its attachments already sit in
/// object storage (optimistic persist); discarding the email is expected to
/// delete them again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedEmail {
    /// Bare sender address extracted from the From header.
    pub sender: String,
    /// Decoded subject; empty string when the message carries none.
    pub subject: String,
    /// All `text/plain` parts of the message, newline-joined in
    /// depth-first order.
    pub body_text: String,
    pub attachments: Vec<ScannedAttachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedAttachment {
    pub file_name: String,
    /// Time-limited retrieval URL into the attachment store.
    pub url: String,
}
