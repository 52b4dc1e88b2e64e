//! IMAP inbox scanning: newest-first enumeration down to the last-sync
//! checkpoint, tracked-sender filtering, MIME extraction, optimistic
//! attachment upload.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use mailparse::MailHeaderMap;
use native_tls::TlsConnector;
use thiserror::Error;
use tracing::{debug, warn};

use crate::mailbox::mime;
use crate::models::email::{ScannedAttachment, ScannedEmail};
use crate::storage::AttachmentStore;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox login rejected: {0}")]
    Auth(String),

    #[error("mailbox connection failed: {0}")]
    Connection(String),
}

/// Fixed provider endpoint for linked mailboxes (TLS, port 993 for Gmail).
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    pub host: String,
    pub port: u16,
}

/// One raw message pulled during the blocking IMAP phase.
#[derive(Debug)]
pub struct FetchedMessage {
    pub received_at: DateTime<Utc>,
    pub raw: Vec<u8>,
}

#[derive(Clone)]
pub struct MailboxScanner {
    config: MailboxConfig,
}

impl MailboxScanner {
    pub fn new(config: MailboxConfig) -> Self {
        Self { config }
    }

    /// Scans the inbox for messages received strictly after `checkpoint`
    /// whose sender is in `tracked_senders`, newest-first.
    ///
    /// Fails with [`MailboxError::Auth`] on a rejected login and
    /// [`MailboxError::Connection`] on transport failure; no new mail is an
    /// empty vec, not an error. A single message failing to parse is logged
    /// and skipped without aborting the scan.
    pub async fn scan(
        &self,
        account: &str,
        app_password: &str,
        checkpoint: DateTime<Utc>,
        tracked_senders: &HashSet<String>,
        attachments: &dyn AttachmentStore,
    ) -> Result<Vec<ScannedEmail>, MailboxError> {
        let config = self.config.clone();
        let account = account.to_string();
        let app_password = app_password.to_string();

        // The imap session is blocking network I/O; keep it off the runtime.
        let fetched = tokio::task::spawn_blocking(move || {
            fetch_messages_after(&config, &account, &app_password, checkpoint)
        })
        .await
        .map_err(|e| MailboxError::Connection(format!("scan task aborted: {e}")))??;

        Ok(assemble_scanned(fetched, checkpoint, tracked_senders, attachments).await)
    }
}

/// Blocking IMAP phase: TLS connect, LOGIN, EXAMINE INBOX, then walk
/// sequence numbers newest-first fetching INTERNALDATE and the full body,
/// stopping at the first message at or before the checkpoint.
///
/// Termination on the first older message assumes the server returns
/// messages in received order; out-of-order delivery can skip mail for good
/// (known risk, see DESIGN.md).
fn fetch_messages_after(
    config: &MailboxConfig,
    account: &str,
    app_password: &str,
    checkpoint: DateTime<Utc>,
) -> Result<Vec<FetchedMessage>, MailboxError> {
    let tls = TlsConnector::builder()
        .build()
        .map_err(|e| MailboxError::Connection(e.to_string()))?;
    let client = imap::connect(
        (config.host.as_str(), config.port),
        config.host.as_str(),
        &tls,
    )
    .map_err(|e| MailboxError::Connection(e.to_string()))?;

    let mut session = client
        .login(account, app_password)
        .map_err(|(e, _)| MailboxError::Auth(e.to_string()))?;

    // EXAMINE keeps the mailbox read-only so \Seen flags stay untouched.
    let inbox = session
        .examine("INBOX")
        .map_err(|e| MailboxError::Connection(e.to_string()))?;

    let mut fetched = Vec::new();
    for seq in (1..=inbox.exists).rev() {
        let messages = session
            .fetch(seq.to_string(), "(INTERNALDATE BODY.PEEK[])")
            .map_err(|e| MailboxError::Connection(e.to_string()))?;
        let Some(message) = messages.iter().next() else {
            continue;
        };

        let Some(received_at) = message.internal_date() else {
            warn!(seq, "message missing INTERNALDATE, skipping");
            continue;
        };
        let received_at = received_at.with_timezone(&Utc);
        if received_at <= checkpoint {
            break;
        }

        match message.body() {
            Some(raw) => fetched.push(FetchedMessage {
                received_at,
                raw: raw.to_vec(),
            }),
            None => warn!(seq, "message body missing from FETCH response, skipping"),
        }
    }

    if let Err(e) = session.logout() {
        debug!("imap logout failed: {e}");
    }

    Ok(fetched)
}

/// Assembly phase over raw messages in newest-first order: stops at the
/// first message at or before the checkpoint, drops untracked senders,
/// walks the MIME tree and uploads every attachment before the result is
/// handed anywhere.
pub(crate) async fn assemble_scanned(
    messages: Vec<FetchedMessage>,
    checkpoint: DateTime<Utc>,
    tracked_senders: &HashSet<String>,
    attachments: &dyn AttachmentStore,
) -> Vec<ScannedEmail> {
    let mut scanned = Vec::new();

    for message in messages {
        if message.received_at <= checkpoint {
            break;
        }

        let parsed = match mailparse::parse_mail(&message.raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("unparseable message, skipping: {e}");
                continue;
            }
        };

        let Some(sender) = sender_address(&parsed) else {
            warn!("message without a parseable From address, skipping");
            continue;
        };
        if !tracked_senders.contains(&sender) {
            continue;
        }

        let subject = parsed
            .headers
            .get_first_value("Subject")
            .unwrap_or_default();
        let content = mime::walk(&parsed);

        let mut stored = Vec::with_capacity(content.attachments.len());
        for attachment in content.attachments {
            match attachments
                .upload(&attachment.file_name, attachment.data)
                .await
            {
                Ok(url) => stored.push(ScannedAttachment {
                    file_name: attachment.file_name,
                    url,
                }),
                Err(e) => warn!(
                    file_name = %attachment.file_name,
                    "attachment upload failed, dropping from result: {e}"
                ),
            }
        }

        scanned.push(ScannedEmail {
            sender,
            subject,
            body_text: content.body_text,
            attachments: stored,
        });
    }

    scanned
}

/// Bare lowercased address out of the From header, if one parses.
fn sender_address(parsed: &mailparse::ParsedMail) -> Option<String> {
    let header = parsed.headers.get_first_header("From")?;
    let addresses = mailparse::addrparse_header(header).ok()?;
    addresses
        .extract_single_info()
        .map(|info| info.addr.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AttachmentStore for MemoryStore {
        async fn upload(&self, file_name: &str, _bytes: Vec<u8>) -> Result<String, StorageError> {
            self.uploads.lock().unwrap().push(file_name.to_string());
            Ok(format!("https://store.test/{file_name}"))
        }

        async fn delete(&self, _file_name: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn plain_message(received_at: DateTime<Utc>, from: &str, body: &str) -> FetchedMessage {
        FetchedMessage {
            received_at,
            raw: format!(
                "From: Recruiter <{from}>\r\nSubject: Update\r\nContent-Type: text/plain\r\n\r\n{body}"
            )
            .into_bytes(),
        }
    }

    fn tracked(addresses: &[&str]) -> HashSet<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    #[tokio::test]
    async fn test_scan_stops_at_first_message_at_or_before_checkpoint() {
        let checkpoint = at(1000);
        let store = MemoryStore::default();
        // newest-first, exactly the ordering the fetch phase produces
        let messages = vec![
            plain_message(at(1003), "b@y.com", "untracked"),
            plain_message(at(1002), "a@x.com", "second update"),
            plain_message(at(1001), "a@x.com", "first update"),
            plain_message(at(999), "a@x.com", "already seen"),
        ];

        let result =
            assemble_scanned(messages, checkpoint, &tracked(&["a@x.com"]), &store).await;

        assert_eq!(result.len(), 2);
        assert!(result[0].body_text.contains("second update"));
        assert!(result[1].body_text.contains("first update"));
    }

    #[tokio::test]
    async fn test_message_at_exactly_checkpoint_terminates_scan() {
        let checkpoint = at(1000);
        let store = MemoryStore::default();
        let messages = vec![
            plain_message(at(1000), "a@x.com", "boundary"),
            plain_message(at(1001), "a@x.com", "never reached"),
        ];

        let result =
            assemble_scanned(messages, checkpoint, &tracked(&["a@x.com"]), &store).await;

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_untracked_sender_is_skipped_not_terminal() {
        let checkpoint = at(1000);
        let store = MemoryStore::default();
        let messages = vec![
            plain_message(at(1002), "stranger@elsewhere.com", "spam"),
            plain_message(at(1001), "a@x.com", "real update"),
        ];

        let result =
            assemble_scanned(messages, checkpoint, &tracked(&["a@x.com"]), &store).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sender, "a@x.com");
    }

    #[tokio::test]
    async fn test_sender_matching_is_case_insensitive() {
        let checkpoint = at(1000);
        let store = MemoryStore::default();
        let messages = vec![plain_message(at(1001), "Recruiter@X.com", "hello")];

        let result =
            assemble_scanned(messages, checkpoint, &tracked(&["recruiter@x.com"]), &store).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].sender, "recruiter@x.com");
    }

    #[tokio::test]
    async fn test_unparseable_message_is_skipped_scan_continues() {
        let checkpoint = at(1000);
        let store = MemoryStore::default();
        let messages = vec![
            FetchedMessage {
                received_at: at(1002),
                raw: b"\xff\xfe not a mime message".to_vec(),
            },
            plain_message(at(1001), "a@x.com", "still scanned"),
        ];

        let result =
            assemble_scanned(messages, checkpoint, &tracked(&["a@x.com"]), &store).await;

        assert_eq!(result.len(), 1);
        assert!(result[0].body_text.contains("still scanned"));
    }

    #[tokio::test]
    async fn test_missing_subject_becomes_empty_string() {
        let checkpoint = at(1000);
        let store = MemoryStore::default();
        let messages = vec![FetchedMessage {
            received_at: at(1001),
            raw: b"From: a@x.com\r\nContent-Type: text/plain\r\n\r\nno subject here".to_vec(),
        }];

        let result =
            assemble_scanned(messages, checkpoint, &tracked(&["a@x.com"]), &store).await;

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].subject, "");
    }

    #[tokio::test]
    async fn test_attachments_are_uploaded_and_linked() {
        let checkpoint = at(1000);
        let store = MemoryStore::default();
        let raw = concat!(
            "From: a@x.com\r\n",
            "Subject: Offer\r\n",
            "Content-Type: multipart/mixed; boundary=\"b1\"\r\n\r\n",
            "--b1\r\n",
            "Content-Type: text/plain\r\n\r\n",
            "see attached\r\n",
            "--b1\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment; filename=\"offer.pdf\"\r\n\r\n",
            "pdf bytes\r\n",
            "--b1\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment; filename=\"benefits.pdf\"\r\n\r\n",
            "more bytes\r\n",
            "--b1--\r\n",
        );
        let messages = vec![FetchedMessage {
            received_at: at(1001),
            raw: raw.as_bytes().to_vec(),
        }];

        let result =
            assemble_scanned(messages, checkpoint, &tracked(&["a@x.com"]), &store).await;

        assert_eq!(result.len(), 1);
        assert!(result[0].body_text.contains("see attached"));
        assert_eq!(result[0].attachments.len(), 2);
        assert_eq!(result[0].attachments[0].url, "https://store.test/offer.pdf");
        assert_eq!(
            store.uploads.lock().unwrap().as_slice(),
            &["offer.pdf".to_string(), "benefits.pdf".to_string()]
        );
    }

    #[tokio::test]
    async fn test_no_new_mail_returns_empty_not_error() {
        let store = MemoryStore::default();
        let result =
            assemble_scanned(Vec::new(), at(1000), &tracked(&["a@x.com"]), &store).await;
        assert!(result.is_empty());
    }
}
