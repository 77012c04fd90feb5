//! Recent activity served by the local recent-chats endpoint.

use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use kindred_core::recent::{RecentEntry, RecentKey, RecentSource};
use kindred_core::{KindredError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    character_id: &'a str,
    persona_id: &'a str,
}

/// `GET {url}` lists entries; `POST {url}/delete` removes one.
pub struct HttpRecentSource {
    client: Client,
    url: String,
}

impl HttpRecentSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KindredError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl RecentSource for HttpRecentSource {
    fn name(&self) -> &str {
        "recent-chats-api"
    }

    async fn fetch(&self) -> Result<Vec<RecentEntry>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| KindredError::network(format!("GET {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KindredError::network(format!(
                "GET {} returned {}",
                self.url, status
            )));
        }

        response
            .json::<Vec<RecentEntry>>()
            .await
            .map_err(|e| KindredError::network(format!("Invalid recent chats payload: {}", e)))
    }

    async fn delete(&self, key: &RecentKey) -> Result<()> {
        let url = format!("{}/delete", self.url);
        let response = self
            .client
            .post(&url)
            .json(&DeleteRequest {
                character_id: &key.character_id,
                persona_id: &key.persona_id,
            })
            .send()
            .await
            .map_err(|e| KindredError::network(format!("POST {} failed: {}", url, e)))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(KindredError::not_found(
                "recent chat",
                format!("{}/{}", key.character_id, key.persona_id),
            )),
            status => Err(KindredError::network(format!("POST {} returned {}", url, status))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> HttpRecentSource {
        HttpRecentSource::new(
            format!("{}/recent-chats", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_parses_both_field_spellings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recent-chats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"characterId": "luna_1", "personaId": "me", "name": "Luna", "lastUsed": 20},
                {"character_id": "sol_2", "persona_id": "me", "name": "Sol", "last_used": 10,
                 "last_message": "bye"}
            ])))
            .mount(&server)
            .await;

        let entries = source(&server).fetch().await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].character_id, "luna_1");
        assert_eq!(entries[1].last_used, 10);
        assert_eq!(entries[1].last_message.as_deref(), Some("bye"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recent-chats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = source(&server).fetch().await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        let server = MockServer::start().await;
        let url = format!("{}/recent-chats", server.uri());
        drop(server);

        let err = HttpRecentSource::new(url, Duration::from_secs(1))
            .unwrap()
            .fetch()
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_delete_posts_key_and_maps_404() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recent-chats/delete"))
            .and(body_json(serde_json::json!({"characterId": "luna_1", "personaId": "me"})))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/recent-chats/delete"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = source(&server);
        source.delete(&RecentKey::new("luna_1", "me")).await.unwrap();

        let err = source.delete(&RecentKey::new("sol_2", "me")).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
