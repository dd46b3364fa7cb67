//! KIE jobs API: nano-banana image editing and Qwen text-to-image.

pub mod client;
pub mod nano_banana;
pub mod qwen_text2image;
pub mod types;

pub use client::KieClient;
pub use nano_banana::NanoBananaService;
pub use qwen_text2image::QwenText2ImageService;

use crate::error::Result;
use crate::service::{is_mock_task_id, mock_task_info};
use crate::types::TaskInfo;
use serde::Serialize;
use tracing::info;
use types::TaskCreateRequest;

pub(crate) async fn submit<I>(
    client: &KieClient,
    source: &'static str,
    request: &TaskCreateRequest<I>,
) -> Result<String>
where
    I: Serialize + Sync,
{
    let task_id = client.create_task(request).await?;
    info!(source, model = %request.model, %task_id, "kie task submitted");
    Ok(task_id)
}

pub(crate) async fn fetch_task_info(client: &KieClient, task_id: &str) -> Result<TaskInfo> {
    if is_mock_task_id(task_id) {
        return Ok(mock_task_info(task_id));
    }
    let record = client.get_task_record(task_id).await?;
    Ok(record.to_task_info())
}

pub(crate) fn non_empty_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}
