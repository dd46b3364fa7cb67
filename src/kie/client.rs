use super::types::{
    is_final_state, Envelope, TaskCreatePayload, TaskCreateRequest, TaskRecord, CODE_OK,
};
use crate::client::{bearer_headers, HttpClient};
use crate::error::{ComponentsError, Result};
use crate::polling::{wait_for, PollSchedule};
use crate::service::ensure_task_id;
use crate::types::ClientOptions;
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.kie.ai";
pub const API_KEY_ENV: &str = "KIE_API_KEY";
pub const VENDOR: &str = "KIE";

pub const CREATE_TASK_PATH: &str = "/api/v1/jobs/createTask";
pub const RECORD_INFO_PATH: &str = "/api/v1/jobs/recordInfo";

#[derive(Debug, Clone)]
pub struct KieClient {
    pub(crate) http: HttpClient,
}

impl KieClient {
    /// The bearer header is only sent when a key is configured.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let api_key = options
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_default();
        let base_url = options
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = HttpClient::new(VENDOR, base_url, options.timeout, bearer_headers(&api_key)?)?;
        Ok(Self { http })
    }

    /// Reads the key from `KIE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::default())
    }

    /// Creates a job and returns its task id.
    pub async fn create_task<I>(&self, request: &TaskCreateRequest<I>) -> Result<String>
    where
        I: Serialize + Sync,
    {
        let builder = self.http.request(Method::POST, CREATE_TASK_PATH).json(request);
        let envelope: Envelope<TaskCreatePayload> =
            self.http.send(builder, CREATE_TASK_PATH).await?;
        let payload = check(envelope)?.ok_or(ComponentsError::MissingTaskId)?;

        if payload.task_id.is_empty() {
            return Err(ComponentsError::MissingTaskId);
        }
        Ok(payload.task_id)
    }

    pub async fn get_task_record(&self, task_id: &str) -> Result<TaskRecord> {
        ensure_task_id(task_id)?;
        let builder = self
            .http
            .request(Method::GET, RECORD_INFO_PATH)
            .query(&[("taskId", task_id)]);
        let envelope: Envelope<TaskRecord> = self.http.send(builder, RECORD_INFO_PATH).await?;
        check(envelope)?.ok_or(ComponentsError::MissingTaskData)
    }

    /// Polls the record until the job succeeds or fails.
    pub async fn wait_for_completion(&self, task_id: &str, max_wait: Duration) -> Result<TaskRecord> {
        self.wait_for_completion_with(task_id, max_wait, &PollSchedule::default())
            .await
    }

    pub async fn wait_for_completion_with(
        &self,
        task_id: &str,
        max_wait: Duration,
        schedule: &PollSchedule,
    ) -> Result<TaskRecord> {
        wait_for(
            max_wait,
            schedule,
            || self.get_task_record(task_id),
            |record| is_final_state(&record.state),
        )
        .await
    }

    pub async fn check_link_availability(&self, url: &str) -> bool {
        self.http.check_link_availability(url).await
    }
}

fn check<T>(envelope: Envelope<T>) -> Result<Option<T>> {
    if envelope.code != CODE_OK {
        return Err(ComponentsError::Vendor {
            vendor: VENDOR,
            code: Some(envelope.code),
            message: envelope.message,
        });
    }
    Ok(envelope.data)
}
