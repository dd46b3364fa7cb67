use crate::output::collect_urls;
use crate::types::{TaskInfo, TaskStatus};
use serde::{Deserialize, Deserializer, Serialize};

pub const STATE_WAITING: &str = "waiting";
pub const STATE_QUEUING: &str = "queuing";
pub const STATE_GENERATING: &str = "generating";
pub const STATE_SUCCESS: &str = "success";
pub const STATE_FAIL: &str = "fail";

/// Business code of a successful reply.
pub const CODE_OK: i64 = 200;

pub fn convert_state(state: &str) -> TaskStatus {
    match state {
        STATE_SUCCESS => TaskStatus::Completed,
        STATE_GENERATING => TaskStatus::Running,
        STATE_FAIL => TaskStatus::Failed,
        STATE_WAITING | STATE_QUEUING => TaskStatus::Pending,
        _ => TaskStatus::Pending,
    }
}

pub fn is_final_state(state: &str) -> bool {
    matches!(state, STATE_SUCCESS | STATE_FAIL)
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskCreateRequest<I> {
    pub model: String,
    #[serde(rename = "callBackUrl", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub input: I,
}

/// `{code, message, data}` wrapper around every reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default, alias = "msg", deserialize_with = "null_as_default")]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskCreatePayload {
    #[serde(deserialize_with = "null_as_default")]
    pub task_id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub task_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub param: String,
    /// JSON document encoded as a string.
    #[serde(deserialize_with = "null_as_default")]
    pub result_json: String,
    pub fail_code: Option<String>,
    pub fail_msg: Option<String>,
    /// Milliseconds since the epoch, as are the other times.
    pub complete_time: Option<i64>,
    pub create_time: Option<i64>,
    pub update_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub result_urls: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub result_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub urls: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
}

/// Reads `null` as the type's default; the API sends it for unset fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads result URLs out of a `resultJson` string, in the order
/// `resultUrls`, `resultUrl`, `urls`, `url`.
pub fn parse_result_urls(result_json: &str) -> Option<Vec<String>> {
    if result_json.trim().is_empty() {
        return None;
    }
    let envelope: ResultEnvelope = serde_json::from_str(result_json).ok()?;

    let candidates = envelope
        .result_urls
        .iter()
        .chain(std::iter::once(&envelope.result_url))
        .chain(envelope.urls.iter())
        .chain(std::iter::once(&envelope.url));
    collect_urls(candidates)
}

fn positive(ms: Option<i64>) -> Option<i64> {
    ms.filter(|ms| *ms > 0)
}

impl TaskRecord {
    pub fn to_task_info(&self) -> TaskInfo {
        let create_ms = positive(self.create_time);
        let update_ms = positive(self.update_time);
        let end_ms = positive(self.complete_time).or(update_ms);

        let duration = match (create_ms, end_ms) {
            (Some(create), Some(end)) if end >= create => (end - create) as f64 / 1000.0,
            _ => 0.0,
        };

        TaskInfo {
            task_id: self.task_id.clone(),
            status: convert_state(&self.state),
            result: parse_result_urls(&self.result_json),
            duration,
            create_time: create_ms.map_or(0, |ms| ms / 1000),
            update_time: update_ms.map_or(0, |ms| ms / 1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_mapping_is_total() {
        assert_eq!(convert_state("waiting"), TaskStatus::Pending);
        assert_eq!(convert_state("queuing"), TaskStatus::Pending);
        assert_eq!(convert_state("generating"), TaskStatus::Running);
        assert_eq!(convert_state("success"), TaskStatus::Completed);
        assert_eq!(convert_state("fail"), TaskStatus::Failed);
        assert_eq!(convert_state("SUCCESS"), TaskStatus::Pending);
    }

    #[test]
    fn result_priority_and_dedup() {
        let raw = r#"{"resultUrls": ["a", "b"], "resultUrl": "a", "urls": ["", "c"], "url": "b"}"#;
        assert_eq!(
            parse_result_urls(raw),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn result_edge_cases() {
        assert_eq!(parse_result_urls(""), None);
        assert_eq!(parse_result_urls("not json"), None);
        assert_eq!(parse_result_urls(r#"{"resultUrls": []}"#), None);
        assert_eq!(
            parse_result_urls(r#"{"url": "https://x/1.png"}"#),
            Some(vec!["https://x/1.png".to_string()])
        );
    }

    #[test]
    fn record_times() {
        let record: TaskRecord = serde_json::from_value(json!({
            "taskId": "k1",
            "state": "success",
            "resultJson": "{\"resultUrls\":[\"https://x/1.png\"]}",
            "createTime": 1_700_000_000_000i64,
            "updateTime": 1_700_000_009_000i64,
            "completeTime": 1_700_000_012_500i64
        }))
        .unwrap();
        let info = record.to_task_info();
        assert_eq!(info.create_time, 1_700_000_000);
        assert_eq!(info.update_time, 1_700_000_009);
        assert_eq!(info.duration, 12.5);
        assert_eq!(info.status, TaskStatus::Completed);
    }

    #[test]
    fn null_fields_read_as_empty() {
        let record: TaskRecord = serde_json::from_value(json!({
            "taskId": "k2",
            "model": null,
            "state": "waiting",
            "param": null,
            "resultJson": null,
            "failCode": null,
            "completeTime": null
        }))
        .unwrap();
        assert_eq!(record.result_json, "");
        let info = record.to_task_info();
        assert_eq!(info.status, TaskStatus::Pending);
        assert_eq!(info.result, None);

        assert_eq!(
            parse_result_urls(r#"{"resultUrls": ["https://kie/a.png"], "resultUrl": null, "urls": null}"#),
            Some(vec!["https://kie/a.png".to_string()])
        );
    }

    #[test]
    fn duration_needs_ordered_times() {
        let record = TaskRecord {
            create_time: Some(5_000),
            update_time: Some(1_000),
            ..Default::default()
        };
        assert_eq!(record.to_task_info().duration, 0.0);

        let no_create = TaskRecord {
            update_time: Some(9_000),
            ..Default::default()
        };
        assert_eq!(no_create.to_task_info().duration, 0.0);
    }
}
