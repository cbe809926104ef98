//! A1Base messaging API client.
//!
//! Credentials are read from the environment on every send.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::channels::{GroupMessage, IndividualMessage, MessagingClient};
use crate::config::{EnvSource, env_keys};
use crate::error::ChannelError;

/// Production API base.
pub const DEFAULT_API_BASE: &str = "https://api.a1base.com";

const CHANNEL_NAME: &str = "a1base";

/// HTTP client for the A1Base messaging API.
pub struct A1BaseClient {
    client: reqwest::Client,
    env: Arc<dyn EnvSource>,
}

struct Credentials {
    api_key: SecretString,
    api_secret: SecretString,
    api_base: String,
}

impl A1BaseClient {
    pub fn new(env: Arc<dyn EnvSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            env,
        }
    }

    fn credentials(&self) -> Result<Credentials, ChannelError> {
        Ok(Credentials {
            api_key: SecretString::from(self.env.require(env_keys::A1BASE_API_KEY)?),
            api_secret: SecretString::from(self.env.require(env_keys::A1BASE_API_SECRET)?),
            api_base: self
                .env
                .var(env_keys::A1BASE_API_URL)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    async fn post<T: Serialize + Sync>(
        &self,
        kind: &str,
        account_id: &str,
        body: &T,
    ) -> Result<(), ChannelError> {
        let creds = self.credentials()?;
        let url = format!("{}/v1/messages/{kind}/{account_id}/send", creds.api_base);

        let resp = self
            .client
            .post(&url)
            .header("X-API-Key", creds.api_key.expose_secret())
            .header("X-API-Secret", creds.api_secret.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: CHANNEL_NAME.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Rejected {
                name: CHANNEL_NAME.into(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(kind = kind, account_id = account_id, "A1Base message sent");
        Ok(())
    }
}

#[async_trait]
impl MessagingClient for A1BaseClient {
    async fn send_individual(
        &self,
        account_id: &str,
        message: &IndividualMessage,
    ) -> Result<(), ChannelError> {
        self.post("individual", account_id, message).await
    }

    async fn send_group(
        &self,
        account_id: &str,
        message: &GroupMessage,
    ) -> Result<(), ChannelError> {
        self.post("group", account_id, message).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    use super::*;
    use crate::channels::WHATSAPP_SERVICE;

    #[derive(Debug, Clone)]
    struct Captured {
        kind: String,
        account_id: String,
        api_key: Option<String>,
        body: serde_json::Value,
    }

    type Log = Arc<Mutex<Vec<Captured>>>;

    async fn capture(
        State((log, status)): State<(Log, StatusCode)>,
        Path((kind, account_id)): Path<(String, String)>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        log.lock().unwrap().push(Captured {
            kind,
            account_id,
            api_key: headers
                .get("x-api-key")
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body,
        });
        status
    }

    async fn start_mock(status: StatusCode) -> (String, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1/messages/{kind}/{account_id}/send", post(capture))
            .with_state((Arc::clone(&log), status));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://127.0.0.1:{port}"), log)
    }

    fn env_for(base: &str) -> Arc<dyn EnvSource> {
        let mut env = HashMap::new();
        env.insert(env_keys::A1BASE_API_KEY.to_string(), "key-1".to_string());
        env.insert(env_keys::A1BASE_API_SECRET.to_string(), "secret-1".to_string());
        env.insert(env_keys::A1BASE_API_URL.to_string(), base.to_string());
        Arc::new(env)
    }

    #[tokio::test]
    async fn sends_individual_message_with_credentials() {
        let (base, log) = start_mock(StatusCode::OK).await;
        let client = A1BaseClient::new(env_for(&base));

        client
            .send_individual(
                "acct-9",
                &IndividualMessage {
                    content: "hello".into(),
                    from: "+15550001111".into(),
                    to: "+15550002222".into(),
                    service: WHATSAPP_SERVICE.into(),
                },
            )
            .await
            .unwrap();

        let captured = log.lock().unwrap().clone();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].kind, "individual");
        assert_eq!(captured[0].account_id, "acct-9");
        assert_eq!(captured[0].api_key.as_deref(), Some("key-1"));
        assert_eq!(captured[0].body["to"], "+15550002222");
        assert_eq!(captured[0].body["service"], "whatsapp");
    }

    #[tokio::test]
    async fn sends_group_message() {
        let (base, log) = start_mock(StatusCode::OK).await;
        let client = A1BaseClient::new(env_for(&base));

        client
            .send_group(
                "acct-9",
                &GroupMessage {
                    content: "hi all".into(),
                    from: "+15550001111".into(),
                    thread_id: "grp-1".into(),
                    service: WHATSAPP_SERVICE.into(),
                },
            )
            .await
            .unwrap();

        let captured = log.lock().unwrap().clone();
        assert_eq!(captured[0].kind, "group");
        assert_eq!(captured[0].body["thread_id"], "grp-1");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (base, _log) = start_mock(StatusCode::UNAUTHORIZED).await;
        let client = A1BaseClient::new(env_for(&base));

        let err = client
            .send_individual(
                "acct-9",
                &IndividualMessage {
                    content: "hello".into(),
                    from: "a".into(),
                    to: "b".into(),
                    service: WHATSAPP_SERVICE.into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Rejected { status: 401, .. }));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_sending() {
        let client = A1BaseClient::new(Arc::new(HashMap::<String, String>::new()));
        let err = client
            .send_individual(
                "acct-9",
                &IndividualMessage {
                    content: "hello".into(),
                    from: "a".into(),
                    to: "b".into(),
                    service: WHATSAPP_SERVICE.into(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains(env_keys::A1BASE_API_KEY));
    }
}
