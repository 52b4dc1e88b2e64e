use std::sync::Arc;

use sqlx::PgPool;

use crate::classify::StatusClassifier;
use crate::config::Config;
use crate::mailbox::MailboxScanner;
use crate::storage::AttachmentStore;
use crate::sync::SyncLeases;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub mailbox: MailboxScanner,
    /// Attachment persistence for scanned emails. Default: S3/MinIO.
    pub attachments: Arc<dyn AttachmentStore>,
    /// LLM-backed status classifier for scanned emails.
    pub classifier: Arc<dyn StatusClassifier>,
    /// Per-user leases preventing concurrent syncs from racing the checkpoint.
    pub sync_leases: SyncLeases,
}
