//! Lark (Feishu) bot messaging: card builder and a minimal IM client.

pub mod card;

pub use card::{Button, ButtonType, CardElement, CardHeader, MessageCard};

use crate::client::{bearer_headers, HttpClient};
use crate::error::{ComponentsError, Result};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://open.feishu.cn";
pub const APP_ID_ENV: &str = "LARK_APP_ID";
pub const APP_SECRET_ENV: &str = "LARK_APP_SECRET";
pub const VENDOR: &str = "Lark";

pub const TENANT_TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";
pub const MESSAGES_PATH: &str = "/open-apis/im/v1/messages";
pub const MSG_TYPE_INTERACTIVE: &str = "interactive";
pub const RECEIVE_ID_TYPE_CHAT: &str = "chat_id";

/// Tokens are refreshed this long before they expire.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default)]
pub struct LarkConfig {
    pub app_id: String,
    pub app_secret: String,
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
}

impl LarkConfig {
    pub fn from_env() -> Self {
        Self {
            app_id: std::env::var(APP_ID_ENV).unwrap_or_default(),
            app_secret: std::env::var(APP_SECRET_ENV).unwrap_or_default(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct TenantTokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TenantTokenResponse {
    code: i64,
    msg: String,
    tenant_access_token: String,
    expire: u64,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    receive_id: &'a str,
    msg_type: &'a str,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateMessageResponse {
    code: i64,
    msg: String,
    data: Option<MessageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageData {
    pub message_id: String,
    pub chat_id: String,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug)]
pub struct LarkClient {
    http: HttpClient,
    config: LarkConfig,
    token: Mutex<Option<CachedToken>>,
}

impl LarkClient {
    pub fn new(config: LarkConfig) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(ComponentsError::MissingApiKey { env: APP_ID_ENV });
        }
        if config.app_secret.is_empty() {
            return Err(ComponentsError::MissingApiKey { env: APP_SECRET_ENV });
        }
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let http = HttpClient::new(VENDOR, base_url, config.timeout, HeaderMap::new())?;
        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LarkConfig::from_env())
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().ok()?;
        guard
            .as_ref()
            .filter(|t| Instant::now() < t.refresh_at)
            .map(|t| t.value.clone())
    }

    /// Tenant access token, reused until shortly before it expires.
    pub async fn tenant_access_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let body = TenantTokenRequest {
            app_id: &self.config.app_id,
            app_secret: &self.config.app_secret,
        };
        let builder = self.http.request(Method::POST, TENANT_TOKEN_PATH).json(&body);
        let resp: TenantTokenResponse = self.http.send(builder, TENANT_TOKEN_PATH).await?;
        if resp.code != 0 || resp.tenant_access_token.is_empty() {
            return Err(ComponentsError::Vendor {
                vendor: VENDOR,
                code: Some(resp.code),
                message: resp.msg,
            });
        }

        let ttl = Duration::from_secs(resp.expire).saturating_sub(TOKEN_REFRESH_MARGIN);
        if let Ok(mut guard) = self.token.lock() {
            *guard = Some(CachedToken {
                value: resp.tenant_access_token.clone(),
                refresh_at: Instant::now() + ttl,
            });
        }
        debug!(expire = resp.expire, "lark tenant token refreshed");
        Ok(resp.tenant_access_token)
    }

    /// Sends an interactive card to a group chat.
    pub async fn send_card(&self, chat_id: &str, card: &MessageCard) -> Result<MessageData> {
        let token = self.tenant_access_token().await?;
        let body = CreateMessageRequest {
            receive_id: chat_id,
            msg_type: MSG_TYPE_INTERACTIVE,
            content: card.to_json()?,
        };
        let builder = self
            .http
            .request(Method::POST, MESSAGES_PATH)
            .headers(bearer_headers(&token)?)
            .query(&[("receive_id_type", RECEIVE_ID_TYPE_CHAT)])
            .json(&body);

        let resp: CreateMessageResponse = self.http.send(builder, MESSAGES_PATH).await?;
        if resp.code != 0 {
            return Err(ComponentsError::Vendor {
                vendor: VENDOR,
                code: Some(resp.code),
                message: resp.msg,
            });
        }
        let data = resp.data.unwrap_or_default();
        info!(chat_id, message_id = %data.message_id, "lark card sent");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(base_url: String) -> LarkClient {
        LarkClient::new(LarkConfig {
            app_id: "cli_app".to_string(),
            app_secret: "shh".to_string(),
            base_url: Some(base_url),
            timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn requires_credentials() {
        let err = LarkClient::new(LarkConfig::default()).unwrap_err();
        assert!(matches!(err, ComponentsError::MissingApiKey { env: APP_ID_ENV }));

        let err = LarkClient::new(LarkConfig {
            app_id: "cli_a1".to_string(),
            ..LarkConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ComponentsError::MissingApiKey { env: APP_SECRET_ENV }));
    }

    #[tokio::test]
    async fn sends_card_with_cached_token() {
        let mut server = Server::new_async().await;
        let token_mock = server
            .mock("POST", TENANT_TOKEN_PATH)
            .match_body(Matcher::Json(json!({"app_id": "cli_app", "app_secret": "shh"})))
            .with_status(200)
            .with_body(r#"{"code":0,"msg":"ok","tenant_access_token":"t-123","expire":7200}"#)
            .expect(1)
            .create_async()
            .await;
        let send_mock = server
            .mock("POST", MESSAGES_PATH)
            .match_query(Matcher::UrlEncoded("receive_id_type".into(), "chat_id".into()))
            .match_header("authorization", "Bearer t-123")
            .match_body(Matcher::PartialJson(json!({
                "receive_id": "oc_chat",
                "msg_type": "interactive"
            })))
            .with_status(200)
            .with_body(r#"{"code":0,"msg":"success","data":{"message_id":"om_1","chat_id":"oc_chat"}}"#)
            .expect(2)
            .create_async()
            .await;

        let lark = client(server.url());
        let card = MessageCard::new(card::header("", "blue"), vec![card::note("hi")]);
        let sent = lark.send_card("oc_chat", &card).await.unwrap();
        assert_eq!(sent.message_id, "om_1");
        lark.send_card("oc_chat", &card).await.unwrap();

        token_mock.assert_async().await;
        send_mock.assert_async().await;
    }

    #[tokio::test]
    async fn token_error_is_vendor_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", TENANT_TOKEN_PATH)
            .with_status(200)
            .with_body(r#"{"code":10003,"msg":"invalid app_id"}"#)
            .create_async()
            .await;

        let err = client(server.url()).tenant_access_token().await.unwrap_err();
        match err {
            ComponentsError::Vendor { vendor, code, message } => {
                assert_eq!(vendor, "Lark");
                assert_eq!(code, Some(10003));
                assert_eq!(message, "invalid app_id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
