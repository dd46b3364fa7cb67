//! Replicate predictions API and the models served through it.

pub mod client;
pub mod controlnet;
pub mod flux1dev;
pub mod flux_schnell;
pub mod nano_banana;
pub mod pixverse;
pub mod qwen_image;
pub mod qwen_image_fast;
pub mod types;

pub use client::ReplicateClient;
pub use controlnet::ControlNet;
pub use flux1dev::Flux1Dev;
pub use flux_schnell::FluxSchnell;
pub use nano_banana::NanoBanana;
pub use pixverse::PixverseV5;
pub use qwen_image::QwenImage;
pub use qwen_image_fast::PrunaAiQwenImageFast;

use crate::error::{ComponentsError, Result};
use crate::service::{
    is_mock_task_id, mock_task_id, mock_task_info, GenerationRequest, TaskService,
};
use crate::types::{ClientOptions, TaskInfo};
use async_trait::async_trait;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::info;
use types::{PredictionRequest, PredictionResponse};

/// A Replicate-hosted model: its version string and how a domain request maps onto its input.
pub trait PredictionModel: Send + Sync + 'static {
    type Request: GenerationRequest;
    type Input: Serialize + Send + Sync;

    /// Sent as `version`; matched against `model`/`version` when listing.
    const VERSION: &'static str;
    const SOURCE: &'static str;
    /// When false, listing returns every prediction on the account.
    const FILTER_LIST: bool = true;

    fn build_input(request: &Self::Request) -> Self::Input;

    fn post_process(urls: Vec<String>) -> Vec<String> {
        urls
    }
}

/// Task service for one Replicate model.
pub struct PredictionService<M> {
    client: ReplicateClient,
    _model: PhantomData<fn() -> M>,
}

impl<M: PredictionModel> PredictionService<M> {
    pub fn new(client: ReplicateClient) -> Self {
        Self {
            client,
            _model: PhantomData,
        }
    }

    pub fn with_options(options: ClientOptions) -> Result<Self> {
        Ok(Self::new(ReplicateClient::new(options)?))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ReplicateClient::from_env()?))
    }

    pub fn client(&self) -> &ReplicateClient {
        &self.client
    }

    fn task_info(resp: &PredictionResponse) -> TaskInfo {
        resp.to_task_info(M::post_process)
    }
}

#[async_trait]
impl<M: PredictionModel> TaskService for PredictionService<M> {
    type Request = M::Request;

    fn source(&self) -> &'static str {
        M::SOURCE
    }

    async fn task_run(&self, request: &Self::Request) -> Result<String> {
        if request.is_debug() {
            return Ok(mock_task_id());
        }

        let prediction = PredictionRequest {
            version: M::VERSION.to_string(),
            input: M::build_input(request),
            webhook: None,
        };
        let resp = self.client.create_prediction(&prediction).await?;
        if resp.id.is_empty() {
            return Err(ComponentsError::MissingTaskId);
        }

        info!(source = M::SOURCE, task_id = %resp.id, "replicate task submitted");
        Ok(resp.id)
    }

    async fn task_get(&self, task_id: &str) -> Result<TaskInfo> {
        if is_mock_task_id(task_id) {
            return Ok(mock_task_info(task_id));
        }
        let resp = self.client.get_prediction(task_id).await?;
        Ok(Self::task_info(&resp))
    }

    async fn task_cancel(&self, task_id: &str) -> Result<()> {
        self.client.cancel_prediction(task_id).await?;
        Ok(())
    }

    async fn task_list(&self) -> Result<Vec<TaskInfo>> {
        let predictions = self.client.list_predictions().await?;
        Ok(predictions
            .iter()
            .filter(|pred| !M::FILTER_LIST || pred.is_model(M::VERSION))
            .map(Self::task_info)
            .collect())
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

pub(crate) fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}

pub(crate) fn positive_f64(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}
