use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Application status as stored in `job_application.app_status_id`.
///
/// `Rejected` (id 5) is never persisted: applying it deletes the row, so the
/// progress dashboard only ever shows the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    Interviewing,
    Offer,
    Other,
    Rejected,
}

impl ApplicationStatus {
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::Applied),
            2 => Some(Self::Interviewing),
            3 => Some(Self::Offer),
            4 => Some(Self::Other),
            5 => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn id(self) -> i16 {
        match self {
            Self::Applied => 1,
            Self::Interviewing => 2,
            Self::Offer => 3,
            Self::Other => 4,
            Self::Rejected => 5,
        }
    }

    /// A rejection removes the application instead of updating it.
    pub fn is_rejection(self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Maps a free-text classifier reply onto a status. The model is told to
    /// answer with exactly one uppercase word, but replies are matched
    /// case-insensitively and anything unrecognized falls back to `Other`.
    pub fn parse_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "APPLIED" => Self::Applied,
            "INTERVIEWING" => Self::Interviewing,
            "OFFER" => Self::Offer,
            "REJECTED" => Self::Rejected,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplicationRow {
    pub app_id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub app_status_id: i16,
    pub recruiter_id: i32,
    pub created_at: DateTime<Utc>,
}
