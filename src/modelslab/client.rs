use super::types::{
    is_final_status, message_text, TaskGetRequest, TaskGetResponse, TaskRunResponse, STATUS_ERROR,
};
use crate::client::{resolve_api_key, HttpClient};
use crate::error::{ComponentsError, Result};
use crate::polling::{wait_for, PollSchedule};
use crate::service::ensure_task_id;
use crate::types::ClientOptions;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://modelslab.com/api/v6";
pub const API_KEY_ENV: &str = "MODELSLAB_API_KEY";
pub const VENDOR: &str = "ModelsLab";

pub const TEXT2IMG_PATH: &str = "/images/text2img";
pub const INTERIOR_PATH: &str = "/interior/make";
pub const EXTERIOR_PATH: &str = "/interior/exterior_restorer";
pub const FETCH_PATH: &str = "/images/fetch";

/// ModelsLab authenticates with a `key` field inside every JSON body.
#[derive(Debug, Clone)]
pub struct ModelsLabClient {
    pub(crate) http: HttpClient,
    api_key: String,
}

impl ModelsLabClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let api_key = resolve_api_key(options.api_key, API_KEY_ENV)?;
        let base_url = options
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let http = HttpClient::new(VENDOR, base_url, options.timeout, HeaderMap::new())?;
        Ok(Self { http, api_key })
    }

    /// Reads the key from `MODELSLAB_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::default())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let builder = self.http.request(Method::POST, path).json(body);
        self.http.send(builder, path).await
    }

    /// Submits a generation request. A `status: "error"` reply is a vendor error.
    pub async fn run<B>(&self, path: &str, body: &B) -> Result<TaskRunResponse>
    where
        B: Serialize + Sync,
    {
        let resp: TaskRunResponse = self.post(path, body).await?;
        if resp.status == STATUS_ERROR {
            return Err(vendor_error(&resp.message));
        }
        Ok(resp)
    }

    pub async fn fetch(&self, request_id: &str) -> Result<TaskGetResponse> {
        ensure_task_id(request_id)?;
        let body = TaskGetRequest {
            key: &self.api_key,
            request_id,
        };
        let resp: TaskGetResponse = self.post(FETCH_PATH, &body).await?;
        if resp.status == STATUS_ERROR {
            return Err(vendor_error(&resp.message));
        }
        Ok(resp)
    }

    /// Polls the fetch endpoint until the request succeeds or fails.
    pub async fn wait_for_completion(
        &self,
        request_id: &str,
        max_wait: Duration,
    ) -> Result<TaskGetResponse> {
        self.wait_for_completion_with(request_id, max_wait, &PollSchedule::default())
            .await
    }

    pub async fn wait_for_completion_with(
        &self,
        request_id: &str,
        max_wait: Duration,
        schedule: &PollSchedule,
    ) -> Result<TaskGetResponse> {
        wait_for(
            max_wait,
            schedule,
            || self.fetch(request_id),
            |resp| is_final_status(&resp.status),
        )
        .await
    }

    pub async fn check_link_availability(&self, url: &str) -> bool {
        self.http.check_link_availability(url).await
    }
}

fn vendor_error(message: &Option<serde_json::Value>) -> ComponentsError {
    ComponentsError::Vendor {
        vendor: VENDOR,
        code: None,
        message: message_text(message),
    }
}
