use super::client::{ModelsLabClient, TEXT2IMG_PATH, VENDOR};
use super::{fetch_task_info, submit};
use crate::error::Result;
use crate::text2image::{Text2ImageRequest, SOURCE_MODELSLAB_FLUX};
use crate::service::{ensure_task_id, mock_task_id, unsupported, GenerationRequest, TaskService};
use crate::types::{ClientOptions, TaskInfo};
use async_trait::async_trait;
use serde::Serialize;

pub const MODEL_ID: &str = "flux";
pub const DEFAULT_SIZE: i64 = 1024;
pub const DEFAULT_SAMPLES: i64 = 1;
pub const DEFAULT_INFERENCE_STEPS: i64 = 20;
pub const GUIDANCE_SCALE: f64 = 7.5;
pub const SCHEDULER: &str = "DPMSolverMultistepScheduler";

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FluxInput {
    pub key: String,
    pub model_id: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub negative_prompt: String,
    pub width: i64,
    pub height: i64,
    pub samples: i64,
    pub num_inference_steps: i64,
    pub safety_checker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhance_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub guidance_scale: f64,
    pub panorama: String,
    pub self_attention: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lora_model: Option<String>,
    pub tomesd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_skip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_karras_sigmas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vae: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lora_strength: Option<String>,
    pub scheduler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
}

/// ModelsLab community Flux text-to-image.
#[derive(Debug, Clone)]
pub struct FluxService {
    client: ModelsLabClient,
}

impl FluxService {
    pub fn new(client: ModelsLabClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ModelsLabClient::from_env()?))
    }

    pub fn with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self::new(ModelsLabClient::new(options)?))
    }

    pub fn client(&self) -> &ModelsLabClient {
        &self.client
    }

    pub fn build_input(&self, request: &Text2ImageRequest) -> FluxInput {
        let positive_or = |value: Option<i64>, default: i64| value.filter(|v| *v > 0).unwrap_or(default);

        FluxInput {
            key: self.client.api_key().to_string(),
            model_id: MODEL_ID.to_string(),
            prompt: request.prompt.clone().unwrap_or_default(),
            negative_prompt: request.negative_prompt.clone().unwrap_or_default(),
            width: positive_or(request.image_width, DEFAULT_SIZE),
            height: positive_or(request.image_height, DEFAULT_SIZE),
            samples: positive_or(request.num_outputs, DEFAULT_SAMPLES),
            num_inference_steps: positive_or(request.num_inference_steps, DEFAULT_INFERENCE_STEPS),
            safety_checker: "no".to_string(),
            seed: request.seed.filter(|seed| *seed > 0),
            guidance_scale: GUIDANCE_SCALE,
            panorama: "no".to_string(),
            self_attention: "yes".to_string(),
            tomesd: "yes".to_string(),
            scheduler: SCHEDULER.to_string(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl TaskService for FluxService {
    type Request = Text2ImageRequest;

    fn source(&self) -> &'static str {
        SOURCE_MODELSLAB_FLUX
    }

    async fn task_run(&self, request: &Text2ImageRequest) -> Result<String> {
        if request.is_debug() {
            return Ok(mock_task_id());
        }
        let input = self.build_input(request);
        submit(&self.client, SOURCE_MODELSLAB_FLUX, TEXT2IMG_PATH, &input).await
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

    fn service() -> FluxService {
        FluxService::with_options(ClientOptions::with_api_key("ml-key")).unwrap()
    }

    #[test]
    fn defaults_applied() {
        let input = service().build_input(&Text2ImageRequest {
            prompt: Some("a lighthouse".to_string()),
            ..Default::default()
        });
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            json!({
                "key": "ml-key",
                "model_id": "flux",
                "prompt": "a lighthouse",
                "width": 1024,
                "height": 1024,
                "samples": 1,
                "num_inference_steps": 20,
                "safety_checker": "no",
                "guidance_scale": 7.5,
                "panorama": "no",
                "self_attention": "yes",
                "tomesd": "yes",
                "scheduler": "DPMSolverMultistepScheduler"
            })
        );
    }

    #[test]
    fn request_values_override_defaults() {
        let input = service().build_input(&Text2ImageRequest {
            image_width: Some(768),
            image_height: Some(512),
            num_outputs: Some(3),
            num_inference_steps: Some(30),
            seed: Some(99),
            negative_prompt: Some("text".to_string()),
            ..Default::default()
        });
        assert_eq!((input.width, input.height), (768, 512));
        assert_eq!(input.samples, 3);
        assert_eq!(input.num_inference_steps, 30);
        assert_eq!(input.seed, Some(99));
        assert_eq!(input.negative_prompt, "text");
    }

    #[tokio::test]
    async fn test_debug_short_circuits() {
        let svc = service();
        let id = svc
            .task_run(&Text2ImageRequest {
                debug: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        let info = svc.task_get(&id).await.unwrap();
        assert_eq!(info.result.map(|r| r.len()), Some(1));
    }
}
