use super::{Backend, ObjectStorage};
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client;

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";
const SIGNING_REGION: &str = "auto";

/// Cloud Storage through its XML interoperability API, authenticated with
/// HMAC keys.
#[derive(Debug, Clone, Default)]
pub struct GcsConfig {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: Option<String>,
}

impl ObjectStorage {
    pub fn gcs(config: GcsConfig) -> Self {
        let endpoint = config
            .endpoint
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let credentials = Credentials::new(config.access_key, config.secret_key, None, None, "gcs-hmac");
        let sdk_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(SIGNING_REGION))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Self::new(Client::from_conf(sdk_config), Backend::Gcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageService;

    #[tokio::test]
    async fn presigns_against_interop_endpoint() {
        let storage = ObjectStorage::gcs(GcsConfig {
            access_key: "GOOGTEST".to_string(),
            secret_key: "secret".to_string(),
            endpoint: None,
        });
        assert_eq!(storage.backend(), Backend::Gcs);

        let url = storage.presign_get_object("media", "a.png").await.unwrap();
        assert!(url.starts_with("https://storage.googleapis.com/media/a.png?"));
        assert!(url.contains("GOOGTEST"));
    }

    #[tokio::test]
    async fn delete_objects_runs_per_key() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("DELETE", "/media/a.png")
            .match_query(mockito::Matcher::Any)
            .with_status(204)
            .create_async()
            .await;
        let denied = server
            .mock("DELETE", "/media/b.png")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body("<Error><Code>AccessDenied</Code><Message>denied</Message></Error>")
            .create_async()
            .await;

        let storage = ObjectStorage::gcs(GcsConfig {
            access_key: "GOOGTEST".to_string(),
            secret_key: "secret".to_string(),
            endpoint: Some(server.url()),
        });
        let deleted = storage
            .delete_objects("media", &["a.png".to_string(), "b.png".to_string()])
            .await
            .unwrap();

        assert_eq!(deleted, vec!["a.png".to_string()]);
        ok.assert_async().await;
        denied.assert_async().await;
    }
}
