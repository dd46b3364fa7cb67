use crate::output::{collect_urls, TaskOutput};
use crate::types::{TaskInfo, TaskStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_ERROR: &str = "error";

pub fn convert_status(status: &str) -> TaskStatus {
    match status {
        STATUS_SUCCESS => TaskStatus::Completed,
        STATUS_PROCESSING => TaskStatus::Running,
        STATUS_FAILED => TaskStatus::Failed,
        _ => TaskStatus::Pending,
    }
}

pub fn is_final_status(status: &str) -> bool {
    matches!(status, STATUS_SUCCESS | STATUS_FAILED | STATUS_ERROR)
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskGetRequest<'a> {
    pub key: &'a str,
    pub request_id: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskRunResponse {
    pub status: String,
    #[serde(rename = "generationTime")]
    pub generation_time: Option<f64>,
    pub id: Option<i64>,
    pub output: Option<TaskOutput>,
    pub proxy_links: Vec<String>,
    pub message: Option<Value>,
    pub nsfw_content_detected: Option<Value>,
    pub webhook_status: Option<String>,
    pub tip: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskGetResponse {
    pub status: String,
    pub id: Option<i64>,
    pub output: Option<TaskOutput>,
    pub proxy_links: Vec<String>,
    pub message: Option<Value>,
    pub tip: Option<String>,
}

/// `message` arrives either as a string or as a field-to-errors object.
pub(crate) fn message_text(message: &Option<Value>) -> String {
    match message {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "unknown error".to_string(),
        Some(other) => other.to_string(),
    }
}

impl TaskGetResponse {
    /// Generated URLs, falling back to the proxy links when `output` is empty.
    pub fn result_urls(&self) -> Option<Vec<String>> {
        let output = self.output.as_ref().map(TaskOutput::urls).unwrap_or_default();
        collect_urls(output).or_else(|| collect_urls(&self.proxy_links))
    }

    /// The vendor reports no timings, so times and duration stay zero.
    pub fn to_task_info(&self, task_id: &str) -> TaskInfo {
        TaskInfo {
            task_id: task_id.to_string(),
            status: convert_status(&self.status),
            result: self.result_urls(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_mapping_is_total() {
        assert_eq!(convert_status("success"), TaskStatus::Completed);
        assert_eq!(convert_status("processing"), TaskStatus::Running);
        assert_eq!(convert_status("failed"), TaskStatus::Failed);
        assert_eq!(convert_status("pending"), TaskStatus::Pending);
        assert_eq!(convert_status("whatever"), TaskStatus::Pending);
    }

    #[test]
    fn output_may_be_empty_string() {
        let resp: TaskGetResponse =
            serde_json::from_value(json!({"status": "processing", "id": 12, "output": ""})).unwrap();
        let info = resp.to_task_info("12");
        assert_eq!(info.status, TaskStatus::Running);
        assert_eq!(info.result, None);
        assert_eq!(info.create_time, 0);
    }

    #[test]
    fn proxy_links_fallback() {
        let resp: TaskGetResponse = serde_json::from_value(json!({
            "status": "success",
            "output": [],
            "proxy_links": ["https://cdn/1.png", "https://cdn/1.png"]
        }))
        .unwrap();
        assert_eq!(resp.result_urls(), Some(vec!["https://cdn/1.png".to_string()]));
    }

    #[test]
    fn message_shapes() {
        assert_eq!(message_text(&Some(json!("Invalid key"))), "Invalid key");
        assert_eq!(
            message_text(&Some(json!({"prompt": ["required"]}))),
            r#"{"prompt":["required"]}"#
        );
        assert_eq!(message_text(&None), "unknown error");
    }
}
