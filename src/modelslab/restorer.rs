use super::client::{ModelsLabClient, EXTERIOR_PATH, INTERIOR_PATH, VENDOR};
use super::{fetch_task_info, submit};
use crate::error::Result;
use crate::image2image::{
    Image2ImageRequest, SOURCE_MODELSLAB_EXTERIOR, SOURCE_MODELSLAB_INTERIOR,
};
use crate::service::{ensure_task_id, mock_task_id, unsupported, GenerationRequest, TaskService};
use crate::types::{ClientOptions, TaskInfo};
use async_trait::async_trait;
use serde::Serialize;

pub const NEGATIVE_PROMPT: &str = "blurry, low resolution, bad lighting, poorly drawn furniture, distorted proportions, messy room, unrealistic colors, extra limbs, missing furniture, bad anatomy, low detail, pixelated, grainy, artifacts, oversaturated, asymmetry, ugly, cartoonish, out of frame, duplicate objects";

pub const DEFAULT_STRENGTH: f64 = 1.0;
pub const DEFAULT_GUIDANCE_SCALE: f64 = 8.0;
pub const DEFAULT_INFERENCE_STEPS: i64 = 31;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RestorerInput {
    pub key: String,
    pub init_image: String,
    pub prompt: String,
    pub negative_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub guidance_scale: f64,
    pub strength: f64,
    pub num_inference_steps: i64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub base64: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub temp: bool,
}

/// Interior redesign and exterior restoration share one request schema and
/// differ only in endpoint.
#[derive(Debug, Clone)]
pub struct RestorerService {
    client: ModelsLabClient,
    source: &'static str,
    path: &'static str,
}

impl RestorerService {
    pub fn interior(client: ModelsLabClient) -> Self {
        Self {
            client,
            source: SOURCE_MODELSLAB_INTERIOR,
            path: INTERIOR_PATH,
        }
    }

    pub fn exterior(client: ModelsLabClient) -> Self {
        Self {
            client,
            source: SOURCE_MODELSLAB_EXTERIOR,
            path: EXTERIOR_PATH,
        }
    }

    pub fn interior_from_env() -> Result<Self> {
        Ok(Self::interior(ModelsLabClient::from_env()?))
    }

    pub fn exterior_from_env() -> Result<Self> {
        Ok(Self::exterior(ModelsLabClient::from_env()?))
    }

    pub fn interior_with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self::interior(ModelsLabClient::new(options)?))
    }

    pub fn exterior_with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self::exterior(ModelsLabClient::new(options)?))
    }

    pub fn client(&self) -> &ModelsLabClient {
        &self.client
    }

    pub fn build_input(&self, request: &Image2ImageRequest) -> RestorerInput {
        RestorerInput {
            key: self.client.api_key().to_string(),
            init_image: request.first_image().unwrap_or_default().to_string(),
            prompt: request.prompt.clone().unwrap_or_default(),
            negative_prompt: NEGATIVE_PROMPT.to_string(),
            seed: request.seed.filter(|seed| *seed > 0),
            guidance_scale: request
                .guidance_scale
                .filter(|g| *g > 0)
                .map_or(DEFAULT_GUIDANCE_SCALE, |g| g as f64),
            strength: request
                .strength
                .filter(|s| *s > 0.0)
                .unwrap_or(DEFAULT_STRENGTH),
            num_inference_steps: request
                .num_inference_steps
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_INFERENCE_STEPS),
            base64: false,
            temp: false,
        }
    }
}

#[async_trait]
impl TaskService for RestorerService {
    type Request = Image2ImageRequest;

    fn source(&self) -> &'static str {
        self.source
    }

    async fn task_run(&self, request: &Image2ImageRequest) -> Result<String> {
        if request.is_debug() {
            return Ok(mock_task_id());
        }
        let input = self.build_input(request);
        submit(&self.client, self.source, self.path, &input).await
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
