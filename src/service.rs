use crate::error::{ComponentsError, Result};
use crate::types::{TaskInfo, TaskStatus};
use async_trait::async_trait;

pub const MOCK_TASK_ID_PREFIX: &str = "mock_task_id_";
pub const MOCK_RESULT_URL: &str = "https://kie.ai/cdn-cgi/image/width=1920,quality=85,fit=scale-down,format=webp/https://file.aiquickdraw.com/custom-page/akr/section-images/1756260298615p09gs2nz.webp";
pub const MOCK_DURATION_SECS: f64 = 5.0;

/// A generation task backend for one vendor in one domain.
///
/// Vendors without native cancel or list support return
/// [`ComponentsError::Unsupported`] from those operations.
#[async_trait]
pub trait TaskService: Send + Sync {
    type Request: GenerationRequest;

    /// Registry source name of this backend.
    fn source(&self) -> &'static str;

    /// Submits a task and returns the vendor-assigned id.
    async fn task_run(&self, request: &Self::Request) -> Result<String>;

    async fn task_get(&self, task_id: &str) -> Result<TaskInfo>;

    async fn task_cancel(&self, task_id: &str) -> Result<()>;

    async fn task_list(&self) -> Result<Vec<TaskInfo>>;
}

/// Common surface of the per-domain request records.
pub trait GenerationRequest: Send + Sync {
    /// Debug requests never reach the network.
    fn is_debug(&self) -> bool;
}

pub fn mock_task_id() -> String {
    format!(
        "{MOCK_TASK_ID_PREFIX}{}",
        crate::utils::strings::random_alphanumeric(5)
    )
}

pub fn is_mock_task_id(task_id: &str) -> bool {
    task_id.starts_with(MOCK_TASK_ID_PREFIX)
}

/// Synthetic completed result for a debug task id.
pub fn mock_task_info(task_id: &str) -> TaskInfo {
    let now = chrono::Utc::now().timestamp();
    TaskInfo {
        task_id: task_id.to_string(),
        status: TaskStatus::Completed,
        result: Some(vec![MOCK_RESULT_URL.to_string()]),
        duration: MOCK_DURATION_SECS,
        create_time: now,
        update_time: now,
    }
}

pub(crate) fn ensure_task_id(task_id: &str) -> Result<()> {
    if task_id.trim().is_empty() {
        return Err(ComponentsError::EmptyTaskId);
    }
    Ok(())
}

pub(crate) fn unsupported(operation: &'static str, vendor: &'static str) -> ComponentsError {
    ComponentsError::Unsupported { operation, vendor }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ids() {
        let id = mock_task_id();
        assert!(is_mock_task_id(&id));
        assert_eq!(id.len(), MOCK_TASK_ID_PREFIX.len() + 5);
        assert!(!is_mock_task_id("abc"));
    }

    #[test]
    fn mock_info_is_completed() {
        let info = mock_task_info("mock_task_id_abcde");
        assert_eq!(info.status, TaskStatus::Completed);
        assert_eq!(info.result.as_ref().map(Vec::len), Some(1));
        assert!(info.duration > 0.0);
    }

    #[test]
    fn blank_task_id_rejected() {
        assert!(matches!(
            ensure_task_id("  "),
            Err(ComponentsError::EmptyTaskId)
        ));
        assert!(ensure_task_id("id").is_ok());
    }
}
