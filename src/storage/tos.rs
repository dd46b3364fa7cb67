use super::{Backend, ObjectStorage};
use crate::error::{ComponentsError, Result};
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client;
use std::time::Duration;

pub const DEFAULT_REGION: &str = "cn-beijing";

/// Volcengine TOS through its S3-compatible endpoint
/// (for example `tos-s3-cn-beijing.volces.com`).
#[derive(Debug, Clone, Default)]
pub struct TosConfig {
    pub endpoint: String,
    pub region: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub security_token: Option<String>,
    /// Zero keeps the 15 minute default.
    pub presign_expires: Duration,
}

impl ObjectStorage {
    pub fn tos(config: TosConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(ComponentsError::Storage("tos: endpoint is required".to_string()));
        }
        let endpoint = if config.endpoint.contains("://") {
            config.endpoint
        } else {
            format!("https://{}", config.endpoint)
        };
        let region = config
            .region
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region))
            .endpoint_url(endpoint);
        if !config.access_key.is_empty() && !config.secret_key.is_empty() {
            let token = config.security_token.filter(|t| !t.is_empty());
            builder = builder.credentials_provider(Credentials::new(
                config.access_key,
                config.secret_key,
                token,
                None,
                "tos-static",
            ));
        }

        Ok(Self::new(Client::from_conf(builder.build()), Backend::Tos)
            .with_presign_ttl(config.presign_expires))
    }
}
