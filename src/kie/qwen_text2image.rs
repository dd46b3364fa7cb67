use super::client::{KieClient, VENDOR};
use super::types::TaskCreateRequest;
use super::{fetch_task_info, non_empty_or, submit};
use crate::error::Result;
use crate::service::{ensure_task_id, mock_task_id, unsupported, GenerationRequest, TaskService};
use crate::text2image::{Text2ImageRequest, SOURCE_KIE_QWEN_IMAGE_TEXT2IMAGE};
use crate::types::{ClientOptions, TaskInfo};
use async_trait::async_trait;
use serde::Serialize;

pub const QWEN_TEXT2IMAGE_MODEL: &str = "qwen/text-to-image";

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct QwenText2ImageInput {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_safety_checker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<String>,
}

/// Accepts `none`, `regular` or `high` in any case; anything else is dropped.
pub fn normalize_acceleration(speed_mode: Option<&str>) -> Option<String> {
    let mode = speed_mode?.trim().to_lowercase();
    match mode.as_str() {
        "none" | "regular" | "high" => Some(mode),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct QwenText2ImageService {
    client: KieClient,
}

impl QwenText2ImageService {
    pub fn new(client: KieClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(KieClient::from_env()?))
    }

    pub fn with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self::new(KieClient::new(options)?))
    }

    pub fn client(&self) -> &KieClient {
        &self.client
    }

    pub fn build_request(request: &Text2ImageRequest) -> TaskCreateRequest<QwenText2ImageInput> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

        TaskCreateRequest {
            model: non_empty_or(&request.model, QWEN_TEXT2IMAGE_MODEL),
            callback_url: None,
            input: QwenText2ImageInput {
                prompt: request.prompt.clone().unwrap_or_default(),
                image_size: non_empty(&request.aspect_ratio),
                num_inference_steps: request.num_inference_steps.filter(|n| *n > 0),
                seed: request.seed.filter(|s| *s > 0),
                guidance_scale: request.guidance.filter(|g| *g > 0.0),
                enable_safety_checker: request
                    .disable_safety_checker
                    .filter(|disabled| *disabled)
                    .map(|_| false),
                output_format: non_empty(&request.output_format),
                negative_prompt: non_empty(&request.negative_prompt),
                acceleration: normalize_acceleration(request.speed_mode.as_deref()),
            },
        }
    }
}

#[async_trait]
impl TaskService for QwenText2ImageService {
    type Request = Text2ImageRequest;

    fn source(&self) -> &'static str {
        SOURCE_KIE_QWEN_IMAGE_TEXT2IMAGE
    }

    async fn task_run(&self, request: &Text2ImageRequest) -> Result<String> {
        if request.is_debug() {
            return Ok(mock_task_id());
        }
        submit(
            &self.client,
            SOURCE_KIE_QWEN_IMAGE_TEXT2IMAGE,
            &Self::build_request(request),
        )
        .await
    }

    async fn task_get(&self, task_id: &str) -> Result<TaskInfo> {
        fetch_task_info(&self.client, task_id).await
    }

    async fn task_cancel(&self, task_id: &str) -> Result<()> {
        ensure_task_id(task_id)?;
        Err(unsupported("task cancellation", VENDOR))
    }

    async fn task_list(&self) -> Result<Vec<TaskInfo>> {
        Err(unsupported("task listing", VENDOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn acceleration_normalized() {
        assert_eq!(normalize_acceleration(Some(" HIGH ")), Some("high".to_string()));
        assert_eq!(normalize_acceleration(Some("regular")), Some("regular".to_string()));
        assert_eq!(normalize_acceleration(Some("turbo")), None);
        assert_eq!(normalize_acceleration(None), None);
    }

    #[test]
    fn request_mapping() {
        let req = Text2ImageRequest {
            prompt: Some("city at night".to_string()),
            aspect_ratio: Some("landscape_16_9".to_string()),
            guidance: Some(2.5),
            speed_mode: Some("None".to_string()),
            disable_safety_checker: Some(true),
            ..Default::default()
        };
        let body = serde_json::to_value(QwenText2ImageService::build_request(&req)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "qwen/text-to-image",
                "input": {
                    "prompt": "city at night",
                    "image_size": "landscape_16_9",
                    "guidance_scale": 2.5,
                    "enable_safety_checker": false,
                    "acceleration": "none"
                }
            })
        );
    }

    #[test]
    fn safety_checker_left_to_vendor_by_default() {
        let req = Text2ImageRequest {
            model: Some("qwen/custom".to_string()),
            disable_safety_checker: Some(false),
            ..Default::default()
        };
        let body = serde_json::to_value(QwenText2ImageService::build_request(&req)).unwrap();
        assert_eq!(body["model"], "qwen/custom");
        assert!(body["input"].get("enable_safety_checker").is_none());
    }
}
