//! The sync workflow: credentials → tracked senders → checkpoint → scan →
//! classification → candidate matching → checkpoint advance.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationStatus;
use crate::models::email::ScannedEmail;
use crate::state::AppState;
use crate::store::{applications, profile};

/// One scanned email plus everything the confirmation dialog needs: the
/// LLM's suggested status and the applications whose recruiter matches the
/// sender.
#[derive(Debug, Serialize)]
pub struct SyncedEmail {
    #[serde(flatten)]
    pub email: ScannedEmail,
    pub suggested_status: ApplicationStatus,
    pub candidate_applications: Vec<CandidateApplication>,
}

#[derive(Debug, Serialize)]
pub struct CandidateApplication {
    pub app_id: Uuid,
    pub job_title: String,
    pub company_name: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No linked mailbox account or app password; nothing was scanned.
    CredentialsMissing,
    Completed {
        emails: Vec<SyncedEmail>,
        /// The new checkpoint; the next sync scans forward from here.
        checkpoint: DateTime<Utc>,
    },
}

/// Runs one full sync for a user. The checkpoint is advanced only after the
/// scan results are fully assembled; an auth or transport failure surfaces
/// the error and leaves the checkpoint untouched.
pub async fn run_sync(state: &AppState, user_id: Uuid) -> Result<SyncOutcome, AppError> {
    // One sync per user at a time. A second caller gets a 409 instead of
    // racing this one on the checkpoint.
    let _lease = state
        .sync_leases
        .try_acquire(user_id)
        .ok_or(AppError::SyncInProgress)?;

    let Some(account) = profile::linked_account(&state.db, user_id).await? else {
        return Ok(SyncOutcome::CredentialsMissing);
    };
    let Some(app_password) = profile::app_password(&state.db, user_id).await? else {
        return Ok(SyncOutcome::CredentialsMissing);
    };

    let tracked = applications::recruiter_emails_for_user(&state.db, user_id).await?;
    let started_at = Utc::now();

    if tracked.is_empty() {
        // No applications means nothing can match; fast-forward the
        // checkpoint instead of scanning a fresh account's entire mailbox.
        profile::set_last_sync_at(&state.db, user_id, started_at).await?;
        return Ok(SyncOutcome::Completed {
            emails: Vec::new(),
            checkpoint: started_at,
        });
    }

    let tracked = normalize_senders(tracked);
    let checkpoint = profile::last_sync_at(&state.db, user_id)
        .await?
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    info!(%user_id, %checkpoint, senders = tracked.len(), "starting mailbox scan");
    let scanned = state
        .mailbox
        .scan(
            &account,
            &app_password,
            checkpoint,
            &tracked,
            state.attachments.as_ref(),
        )
        .await?;

    let mut emails = Vec::with_capacity(scanned.len());
    for email in scanned {
        let suggested_status = match state.classifier.classify(&email.body_text).await {
            Ok(status) => status,
            Err(e) => {
                warn!("status classification failed, defaulting to OTHER: {e}");
                ApplicationStatus::Other
            }
        };
        let candidate_applications =
            applications::list_by_recruiter_email(&state.db, user_id, &email.sender)
                .await?
                .into_iter()
                .map(|row| CandidateApplication {
                    app_id: row.app_id,
                    job_title: row.job_title,
                    company_name: row.company_name,
                })
                .collect();
        emails.push(SyncedEmail {
            email,
            suggested_status,
            candidate_applications,
        });
    }

    // Scan results are fully assembled; only now may the checkpoint move.
    profile::set_last_sync_at(&state.db, user_id, started_at).await?;
    info!(%user_id, count = emails.len(), "mailbox sync completed");

    Ok(SyncOutcome::Completed {
        emails,
        checkpoint: started_at,
    })
}

/// Recruiter addresses come back one per application; senders are matched
/// as a deduplicated, lowercased set.
fn normalize_senders(addresses: Vec<String>) -> HashSet<String> {
    addresses
        .into_iter()
        .map(|address| address.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_senders_dedups_and_lowercases() {
        let tracked = normalize_senders(vec![
            "Recruiter@X.com".to_string(),
            "recruiter@x.com".to_string(),
            "other@y.com".to_string(),
        ]);
        assert_eq!(tracked.len(), 2);
        assert!(tracked.contains("recruiter@x.com"));
        assert!(tracked.contains("other@y.com"));
    }
}
