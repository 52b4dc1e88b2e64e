use serde::{Deserialize, Serialize};

/// One job application as shown on the progress dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_title: String,
    pub company_name: String,
    pub recruiter_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBucket {
    pub count: usize,
    pub jobs: Vec<JobSummary>,
}

/// All of a user's applications bucketed by status. Rejection is modeled as
/// deletion, so there is no rejected bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub applied: StatusBucket,
    pub interviewing: StatusBucket,
    pub offer: StatusBucket,
    pub other: StatusBucket,
}
