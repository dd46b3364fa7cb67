use crate::output::{collect_urls, TaskOutput};
use crate::types::{TaskInfo, TaskStatus};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

pub const STATUS_STARTING: &str = "starting";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_SUCCEEDED: &str = "succeeded";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_CANCELED: &str = "canceled";

/// Total mapping; anything unrecognized is still pending.
pub fn convert_status(status: &str) -> TaskStatus {
    match status {
        STATUS_SUCCEEDED => TaskStatus::Completed,
        STATUS_PROCESSING | STATUS_STARTING => TaskStatus::Running,
        STATUS_FAILED => TaskStatus::Failed,
        STATUS_CANCELED => TaskStatus::Canceled,
        _ => TaskStatus::Pending,
    }
}

pub fn is_final_status(status: &str) -> bool {
    matches!(status, STATUS_SUCCEEDED | STATUS_FAILED | STATUS_CANCELED)
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest<I> {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub input: I,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictionUrls {
    pub get: String,
    pub cancel: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictionMetrics {
    pub predict_time: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictionResponse {
    pub id: String,
    pub model: String,
    pub version: String,
    pub input: serde_json::Value,
    pub logs: Option<String>,
    pub output: Option<TaskOutput>,
    pub data_removed: bool,
    pub error: serde_json::Value,
    pub status: String,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub urls: PredictionUrls,
    pub metrics: PredictionMetrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PredictionList {
    #[serde(default)]
    pub results: Vec<PredictionResponse>,
}

/// `{type, title, status, detail}` error body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: i64,
    pub detail: String,
}

pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) if !err.title.is_empty() || !err.detail.is_empty() => {
            format!("{} - {}", err.title, err.detail)
        }
        _ => crate::client::excerpt(body),
    }
}

fn unix_seconds(timestamp: Option<&str>) -> Option<i64> {
    timestamp
        .filter(|t| !t.is_empty())
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.timestamp())
}

impl PredictionResponse {
    pub fn output_urls(&self) -> Vec<String> {
        self.output.as_ref().map(TaskOutput::urls).unwrap_or_default()
    }

    pub fn is_model(&self, version: &str) -> bool {
        self.model == version || self.version == version
    }

    /// Converts to the common task info, passing the raw output list
    /// through `post_process` before de-duplication.
    pub fn to_task_info(&self, post_process: fn(Vec<String>) -> Vec<String>) -> TaskInfo {
        let create_time = unix_seconds(self.created_at.as_deref()).unwrap_or(0);
        let end_time = unix_seconds(self.completed_at.as_deref())
            .or_else(|| unix_seconds(self.started_at.as_deref()));
        let update_time = end_time.unwrap_or(create_time);

        let duration = match self.metrics.predict_time {
            Some(seconds) if seconds > 0.0 => seconds,
            _ => match end_time {
                Some(end) if create_time > 0 && end >= create_time => (end - create_time) as f64,
                _ => 0.0,
            },
        };

        TaskInfo {
            task_id: self.id.clone(),
            status: convert_status(&self.status),
            result: collect_urls(post_process(self.output_urls())),
            duration,
            create_time,
            update_time,
        }
    }
}
