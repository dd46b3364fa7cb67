use super::{Backend, ObjectStorage};
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;

pub const REGION_ENV: &str = "AWS_REGION";

#[derive(Debug, Clone, Default)]
pub struct S3Config {
    /// Falls back to the ambient AWS configuration when unset.
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

impl S3Config {
    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Self::default()
        }
    }
}

impl ObjectStorage {
    /// AWS S3 with credentials from the default provider chain.
    pub async fn s3(config: S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = config.region.filter(|r| !r.is_empty()) {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = config.endpoint_url.filter(|e| !e.is_empty()) {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), Backend::S3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_with_region() {
        let config = S3Config::with_region("us-west-2");
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert!(config.endpoint_url.is_none());
    }
}
