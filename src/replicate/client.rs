use super::types::{
    error_message, is_final_status, PredictionList, PredictionRequest, PredictionResponse,
};
use crate::client::{bearer_headers, resolve_api_key, HttpClient};
use crate::error::Result;
use crate::polling::{wait_for, PollSchedule};
use crate::service::ensure_task_id;
use crate::types::ClientOptions;
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";
pub const API_TOKEN_ENV: &str = "REPLICATE_TOKEN";
pub const VENDOR: &str = "Replicate";

const PATH_PREDICTIONS: &str = "/predictions";

#[derive(Debug, Clone)]
pub struct ReplicateClient {
    pub(crate) http: HttpClient,
}

impl ReplicateClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let token = resolve_api_key(options.api_key, API_TOKEN_ENV)?;
        let base_url = options
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = HttpClient::new(VENDOR, base_url, options.timeout, bearer_headers(&token)?)?
            .with_error_message(error_message);

        Ok(Self { http })
    }

    /// Reads the token from `REPLICATE_TOKEN`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::default())
    }

    pub async fn create_prediction<I>(
        &self,
        request: &PredictionRequest<I>,
    ) -> Result<PredictionResponse>
    where
        I: Serialize + Sync,
    {
        debug!(version = %request.version, "creating replicate prediction");
        let builder = self
            .http
            .request(Method::POST, PATH_PREDICTIONS)
            .header("Prefer", "respond-async")
            .json(request);
        self.http.send(builder, PATH_PREDICTIONS).await
    }

    pub async fn get_prediction(&self, prediction_id: &str) -> Result<PredictionResponse> {
        ensure_task_id(prediction_id)?;
        let path = format!("{PATH_PREDICTIONS}/{prediction_id}");
        self.http
            .send(self.http.request(Method::GET, &path), &path)
            .await
    }

    pub async fn cancel_prediction(&self, prediction_id: &str) -> Result<PredictionResponse> {
        ensure_task_id(prediction_id)?;
        let path = format!("{PATH_PREDICTIONS}/{prediction_id}/cancel");
        self.http
            .send(self.http.request(Method::POST, &path), &path)
            .await
    }

    pub async fn list_predictions(&self) -> Result<Vec<PredictionResponse>> {
        let list: PredictionList = self
            .http
            .send(self.http.request(Method::GET, PATH_PREDICTIONS), PATH_PREDICTIONS)
            .await?;
        Ok(list.results)
    }

    /// Polls until the prediction succeeds, fails or is canceled.
    pub async fn wait_for_completion(
        &self,
        prediction_id: &str,
        max_wait: Duration,
    ) -> Result<PredictionResponse> {
        self.wait_for_completion_with(prediction_id, max_wait, &PollSchedule::default())
            .await
    }

    pub async fn wait_for_completion_with(
        &self,
        prediction_id: &str,
        max_wait: Duration,
        schedule: &PollSchedule,
    ) -> Result<PredictionResponse> {
        wait_for(
            max_wait,
            schedule,
            || self.get_prediction(prediction_id),
            |resp| is_final_status(&resp.status),
        )
        .await
    }

    pub async fn check_link_availability(&self, url: &str) -> bool {
        self.http.check_link_availability(url).await
    }
}
