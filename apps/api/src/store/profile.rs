//! `user_profile` columns consumed by the sync workflow: the linked mailbox
//! credentials and the per-user scan checkpoint.
//!
//! The checkpoint is written only after a scan's results have been fully
//! assembled — a failed scan must leave it untouched so unseen mail is not
//! skipped forever.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn linked_account(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
    let account: Option<Option<String>> =
        sqlx::query_scalar("SELECT linked_mail_account FROM user_profile WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(account.flatten())
}

pub async fn app_password(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
    let password: Option<Option<String>> =
        sqlx::query_scalar("SELECT mail_app_password FROM user_profile WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(password.flatten())
}

/// Last successfully scanned mailbox instant, if any sync ever completed.
pub async fn last_sync_at(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let checkpoint: Option<Option<DateTime<Utc>>> =
        sqlx::query_scalar("SELECT last_mailbox_sync_at FROM user_profile WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(checkpoint.flatten())
}

pub async fn set_last_sync_at(
    pool: &PgPool,
    user_id: Uuid,
    checkpoint: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_profile SET last_mailbox_sync_at = $2 WHERE user_id = $1")
        .bind(user_id)
        .bind(checkpoint)
        .execute(pool)
        .await?;
    Ok(())
}
