//! Progress aggregation and user-confirmed status changes.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationStatus;
use crate::models::progress::{JobSummary, Progress, StatusBucket};
use crate::store::applications::{self, JobWithRecruiter};

/// Buckets all of a user's applications by status for the dashboard.
/// Rejection is modeled as deletion, so there is no rejected bucket.
/// All-or-nothing: any bucket query failing fails the whole aggregate.
pub async fn aggregate(pool: &PgPool, user_id: Uuid) -> Result<Progress, AppError> {
    Ok(Progress {
        applied: bucket(pool, user_id, ApplicationStatus::Applied).await?,
        interviewing: bucket(pool, user_id, ApplicationStatus::Interviewing).await?,
        offer: bucket(pool, user_id, ApplicationStatus::Offer).await?,
        other: bucket(pool, user_id, ApplicationStatus::Other).await?,
    })
}

async fn bucket(
    pool: &PgPool,
    user_id: Uuid,
    status: ApplicationStatus,
) -> Result<StatusBucket, AppError> {
    let jobs: Vec<JobSummary> = applications::list_by_status(pool, user_id, status)
        .await?
        .into_iter()
        .map(summarize)
        .collect();
    Ok(StatusBucket {
        count: jobs.len(),
        jobs,
    })
}

fn summarize(row: JobWithRecruiter) -> JobSummary {
    JobSummary {
        job_title: row.job_title,
        company_name: row.company_name,
        recruiter_email: row.recruiter_email,
    }
}

/// Applies one confirmed status change. `Rejected` deletes the application
/// row; anything else updates the status field in place. One atomic
/// statement per call — no batch spans multiple applications.
pub async fn apply_status(
    pool: &PgPool,
    app_id: Uuid,
    status: ApplicationStatus,
) -> Result<(), AppError> {
    let rows = if status.is_rejection() {
        applications::delete(pool, app_id).await?
    } else {
        applications::update_status(pool, app_id, status).await?
    };

    if rows == 0 {
        return Err(AppError::NotFound(format!("Application {app_id} not found")));
    }
    Ok(())
}
