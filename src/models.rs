use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub type ReportId = Uuid;
pub type SessionId = Uuid;

/// Display format for `created_at`, second granularity.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Lost,
    Found,
}

impl ReportKind {
    pub fn label(self) -> &'static str {
        match self {
            ReportKind::Lost => "Lost",
            ReportKind::Found => "Found",
        }
    }
}

/// A stored lost/found report. Never mutated once inserted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: Uuid,
    pub kind: ReportKind,
    pub item_name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ReportRecord {
    pub fn display_time(&self) -> String {
        self.created_at.format(DISPLAY_TIME_FORMAT).to_string()
    }
}

/// Raw submission as it arrives from a client; not yet validated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub kind: ReportKind,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportCount {
    pub count: usize,
}
