//! `job_application` / `recruiter` access for the sync and progress
//! workflows. Applications are created elsewhere (when an outbound email is
//! sent); this module only reads them and applies confirmed status changes.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::application::{ApplicationStatus, JobApplicationRow};

/// Listing row for places that need the recruiter's address alongside the
/// application.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobWithRecruiter {
    pub app_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub recruiter_email: String,
}

pub async fn list_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<JobApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, JobApplicationRow>(
        r#"
        SELECT app_id, user_id, job_title, company_name, app_status_id, recruiter_id, created_at
        FROM job_application
        WHERE user_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_status(
    pool: &PgPool,
    user_id: Uuid,
    status: ApplicationStatus,
) -> Result<Vec<JobWithRecruiter>, sqlx::Error> {
    sqlx::query_as::<_, JobWithRecruiter>(
        r#"
        SELECT a.app_id, a.job_title, a.company_name, r.email AS recruiter_email
        FROM job_application a
        JOIN recruiter r ON r.recruiter_id = a.recruiter_id
        WHERE a.user_id = $1 AND a.app_status_id = $2
        ORDER BY a.created_at
        "#,
    )
    .bind(user_id)
    .bind(status.id())
    .fetch_all(pool)
    .await
}

/// Applications whose recruiter matches the given address, for the
/// "which job does this email update" choice during confirmation.
pub async fn list_by_recruiter_email(
    pool: &PgPool,
    user_id: Uuid,
    email: &str,
) -> Result<Vec<JobWithRecruiter>, sqlx::Error> {
    sqlx::query_as::<_, JobWithRecruiter>(
        r#"
        SELECT a.app_id, a.job_title, a.company_name, r.email AS recruiter_email
        FROM job_application a
        JOIN recruiter r ON r.recruiter_id = a.recruiter_id
        WHERE a.user_id = $1 AND lower(r.email) = lower($2)
        ORDER BY a.created_at
        "#,
    )
    .bind(user_id)
    .bind(email)
    .fetch_all(pool)
    .await
}

/// Returns the number of rows updated (0 when the id does not exist).
pub async fn update_status(
    pool: &PgPool,
    app_id: Uuid,
    status: ApplicationStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE job_application SET app_status_id = $2 WHERE app_id = $1")
        .bind(app_id)
        .bind(status.id())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Returns the number of rows deleted (0 when the id does not exist).
pub async fn delete(pool: &PgPool, app_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM job_application WHERE app_id = $1")
        .bind(app_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Every recruiter address attached to one of the user's applications.
/// These are the senders the mailbox scan is allowed to match.
pub async fn recruiter_emails_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT r.email
        FROM job_application a
        JOIN recruiter r ON r.recruiter_id = a.recruiter_id
        WHERE a.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
