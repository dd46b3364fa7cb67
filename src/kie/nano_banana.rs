use super::client::{KieClient, VENDOR};
use super::types::TaskCreateRequest;
use super::{fetch_task_info, non_empty_or, submit};
use crate::error::Result;
use crate::image2image::{Image2ImageRequest, SOURCE_KIE_NANO_BANANA};
use crate::service::{ensure_task_id, mock_task_id, unsupported, GenerationRequest, TaskService};
use crate::types::{ClientOptions, TaskInfo};
use async_trait::async_trait;
use serde::Serialize;

pub const NANO_BANANA_MODEL: &str = "google/nano-banana";
pub const NANO_BANANA_EDIT_MODEL: &str = "google/nano-banana-edit";
pub const NANO_BANANA_PRO_MODEL: &str = "nano-banana-pro";

const DEFAULT_OUTPUT_FORMAT: &str = "png";
const DEFAULT_PRO_RESOLUTION: &str = "1K";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NanoBananaInput {
    pub prompt: String,
    pub output_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NanoBananaProInput {
    pub prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    pub resolution: String,
    pub output_format: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum NanoBananaPayload {
    Standard(NanoBananaInput),
    Pro(NanoBananaProInput),
}

#[derive(Debug, Clone)]
pub struct NanoBananaService {
    client: KieClient,
}

impl NanoBananaService {
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

    /// Picks the model and input schema from `request.model`. An empty model
    /// selects the edit variant when input images are present; names other
    /// than the pro model are sent as-is with the standard schema.
    pub fn build_request(request: &Image2ImageRequest) -> TaskCreateRequest<NanoBananaPayload> {
        let prompt = request.prompt.clone().unwrap_or_default();
        let images = request.images().to_vec();
        let size = request
            .output_image_size
            .clone()
            .filter(|s| !s.is_empty());
        let output_format = non_empty_or(&request.output_format, DEFAULT_OUTPUT_FORMAT);

        let (model, input) = match request.model.as_deref().unwrap_or_default() {
            NANO_BANANA_PRO_MODEL => (
                NANO_BANANA_PRO_MODEL.to_string(),
                NanoBananaPayload::Pro(NanoBananaProInput {
                    prompt,
                    image_input: images,
                    aspect_ratio: size,
                    resolution: non_empty_or(&request.resolution, DEFAULT_PRO_RESOLUTION),
                    output_format,
                }),
            ),
            model => {
                let model = match model {
                    "" if images.is_empty() => NANO_BANANA_MODEL,
                    "" => NANO_BANANA_EDIT_MODEL,
                    named => named,
                };
                (
                    model.to_string(),
                    NanoBananaPayload::Standard(NanoBananaInput {
                        prompt,
                        output_format,
                        image_size: size,
                        image_urls: images,
                    }),
                )
            }
        };

        TaskCreateRequest {
            model,
            callback_url: None,
            input,
        }
    }
}

#[async_trait]
impl TaskService for NanoBananaService {
    type Request = Image2ImageRequest;

    fn source(&self) -> &'static str {
        SOURCE_KIE_NANO_BANANA
    }

    async fn task_run(&self, request: &Image2ImageRequest) -> Result<String> {
        if request.is_debug() {
            return Ok(mock_task_id());
        }
        submit(&self.client, SOURCE_KIE_NANO_BANANA, &Self::build_request(request)).await
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
