//! ModelsLab image APIs: interior and exterior restoration, Flux text-to-image.

pub mod client;
pub mod flux;
pub mod restorer;
pub mod types;

pub use client::ModelsLabClient;
pub use flux::FluxService;
pub use restorer::RestorerService;

use crate::error::{ComponentsError, Result};
use crate::service::{is_mock_task_id, mock_task_info};
use crate::types::TaskInfo;
use serde::Serialize;
use tracing::info;

/// Submits a request and turns the numeric id into the task id.
pub(crate) async fn submit<B>(
    client: &ModelsLabClient,
    source: &'static str,
    path: &str,
    body: &B,
) -> Result<String>
where
    B: Serialize + Sync,
{
    let resp = client.run(path, body).await?;
    let task_id = resp
        .id
        .filter(|id| *id > 0)
        .map(|id| id.to_string())
        .ok_or(ComponentsError::MissingTaskId)?;

    info!(source, %task_id, status = %resp.status, "modelslab task submitted");
    Ok(task_id)
}

pub(crate) async fn fetch_task_info(client: &ModelsLabClient, task_id: &str) -> Result<TaskInfo> {
    if is_mock_task_id(task_id) {
        return Ok(mock_task_info(task_id));
    }
    let resp = client.fetch(task_id).await?;
    Ok(resp.to_task_info(task_id))
}
