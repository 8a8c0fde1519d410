//! Place resource registry: does a place exist, is a slug taken, and
//! what is the place's title.
//!
//! The registry is abstracted behind a trait with two implementations: a
//! live HTTP-backed one and an in-memory fake for deterministic offline
//! tests. Batch callers inject whichever fits.

use crate::error::RemoteError;
use crate::retry::{with_retry_if, RetryConfig};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::debug;

/// The subset of a place document the name engine needs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Place {
    #[serde(default)]
    pub id: String,
    pub title: String,
}

/// Lookups against the place registry.
pub trait PlaceRegistry {
    /// Whether a place with this pid exists.
    fn place_exists(&self, pid: &str) -> impl std::future::Future<Output = Result<bool, RemoteError>> + Send;

    /// Whether `slug` is already taken under the parent `pid`.
    fn slug_exists(
        &self,
        pid: &str,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<bool, RemoteError>> + Send;

    /// Fetch the place document for `pid`.
    fn fetch_place(&self, pid: &str) -> impl std::future::Future<Output = Result<Place, RemoteError>> + Send;
}

/// HTTP-backed registry client.
///
/// Responses are cached by URL for the life of the process; registry
/// data is assumed stable during a batch run.
pub struct HttpPlaceRegistry {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
    exists_cache: Mutex<HashMap<String, bool>>,
    place_cache: Mutex<HashMap<String, Place>>,
}

impl HttpPlaceRegistry {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryConfig::remote_lookup(),
            exists_cache: Mutex::new(HashMap::new()),
            place_cache: Mutex::new(HashMap::new()),
        }
    }

    fn place_url(&self, pid: &str) -> String {
        format!("{}/places/{}/json", self.base_url, pid)
    }

    fn slug_url(&self, pid: &str, slug: &str) -> String {
        format!("{}/places/{}/{}/json", self.base_url, pid, slug)
    }

    /// GET a URL and report whether the resource exists. 200 means yes,
    /// 404 means no, anything else is an error.
    async fn resource_exists(&self, url: &str) -> Result<bool, RemoteError> {
        if let Some(&cached) = self.exists_cache.lock().unwrap().get(url) {
            debug!("registry cache hit for {}", url);
            return Ok(cached);
        }

        let exists = with_retry_if(
            &self.retry,
            "registry existence lookup",
            || async {
                let response = self.client.get(url).send().await.map_err(|source| {
                    RemoteError::Transport {
                        url: url.to_string(),
                        source,
                    }
                })?;
                match response.status().as_u16() {
                    200 => Ok(true),
                    404 => Ok(false),
                    status => Err(RemoteError::Status {
                        url: url.to_string(),
                        status,
                    }),
                }
            },
            is_retryable,
        )
        .await?;

        self.exists_cache
            .lock()
            .unwrap()
            .insert(url.to_string(), exists);
        Ok(exists)
    }
}

impl PlaceRegistry for HttpPlaceRegistry {
    async fn place_exists(&self, pid: &str) -> Result<bool, RemoteError> {
        self.resource_exists(&self.place_url(pid)).await
    }

    async fn slug_exists(&self, pid: &str, slug: &str) -> Result<bool, RemoteError> {
        self.resource_exists(&self.slug_url(pid, slug)).await
    }

    async fn fetch_place(&self, pid: &str) -> Result<Place, RemoteError> {
        let url = self.place_url(pid);
        if let Some(cached) = self.place_cache.lock().unwrap().get(&url) {
            debug!("registry cache hit for {}", url);
            return Ok(cached.clone());
        }

        let place = with_retry_if(
            &self.retry,
            "registry place fetch",
            || async {
                let response = self.client.get(&url).send().await.map_err(|source| {
                    RemoteError::Transport {
                        url: url.clone(),
                        source,
                    }
                })?;
                let status = response.status().as_u16();
                if status != 200 {
                    return Err(RemoteError::Status {
                        url: url.clone(),
                        status,
                    });
                }
                response
                    .json::<Place>()
                    .await
                    .map_err(|source| RemoteError::Decode {
                        url: url.clone(),
                        source,
                    })
            },
            is_retryable,
        )
        .await?;

        self.place_cache
            .lock()
            .unwrap()
            .insert(url, place.clone());
        Ok(place)
    }
}

/// Transient failures and 429/5xx responses are retried; other statuses
/// (401, 403, ...) fail immediately.
fn is_retryable(error: &RemoteError) -> bool {
    match error {
        RemoteError::Transport { .. } => true,
        RemoteError::Status { status, .. } => *status == 429 || *status >= 500,
        RemoteError::Decode { .. } => false,
    }
}

/// In-memory registry for offline tests and skip-remote batch runs.
#[derive(Debug, Default)]
pub struct InMemoryPlaceRegistry {
    places: HashMap<String, Place>,
    slugs: HashSet<(String, String)>,
}

impl InMemoryPlaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, pid: &str, title: &str) -> Self {
        self.places.insert(
            pid.to_string(),
            Place {
                id: pid.to_string(),
                title: title.to_string(),
            },
        );
        self
    }

    pub fn with_slug(mut self, pid: &str, slug: &str) -> Self {
        self.slugs.insert((pid.to_string(), slug.to_string()));
        self
    }
}

impl PlaceRegistry for InMemoryPlaceRegistry {
    async fn place_exists(&self, pid: &str) -> Result<bool, RemoteError> {
        Ok(self.places.contains_key(pid))
    }

    async fn slug_exists(&self, pid: &str, slug: &str) -> Result<bool, RemoteError> {
        Ok(self.slugs.contains(&(pid.to_string(), slug.to_string())))
    }

    async fn fetch_place(&self, pid: &str) -> Result<Place, RemoteError> {
        self.places
            .get(pid)
            .cloned()
            .ok_or_else(|| RemoteError::Status {
                url: format!("memory://places/{}", pid),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_place_exists_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/857359/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "857359", "title": "Trapezus"})),
            )
            .mount(&server)
            .await;

        let registry = HttpPlaceRegistry::new(reqwest::Client::new(), server.uri());
        assert!(registry.place_exists("857359").await.unwrap());
    }

    #[tokio::test]
    async fn test_place_exists_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/1/json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry = HttpPlaceRegistry::new(reqwest::Client::new(), server.uri());
        assert!(!registry.place_exists("1").await.unwrap());
    }

    #[tokio::test]
    async fn test_place_exists_uses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/857359/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "857359",
                "title": "Trapezus"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = HttpPlaceRegistry::new(reqwest::Client::new(), server.uri());
        assert!(registry.place_exists("857359").await.unwrap());
        assert!(registry.place_exists("857359").await.unwrap());
    }

    #[tokio::test]
    async fn test_slug_exists_is_scoped_by_pid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/857359/trapezus/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "trapezus",
                "title": "Trapezus"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/places/123/trapezus/json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry = HttpPlaceRegistry::new(reqwest::Client::new(), server.uri());
        assert!(registry.slug_exists("857359", "trapezus").await.unwrap());
        assert!(!registry.slug_exists("123", "trapezus").await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_place_returns_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/857359/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "857359",
                "title": "Trapezus",
                "description": "ignored"
            })))
            .mount(&server)
            .await;

        let registry = HttpPlaceRegistry::new(reqwest::Client::new(), server.uri());
        let place = registry.fetch_place("857359").await.unwrap();
        assert_eq!(place.title, "Trapezus");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/857359/json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut registry = HttpPlaceRegistry::new(reqwest::Client::new(), server.uri());
        registry.retry = RetryConfig::new(1, std::time::Duration::from_millis(1));
        let err = registry.place_exists("857359").await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_retries_on_503_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/places/857359/json"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/places/857359/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "857359",
                "title": "Trapezus"
            })))
            .mount(&server)
            .await;

        let mut registry = HttpPlaceRegistry::new(reqwest::Client::new(), server.uri());
        registry.retry = RetryConfig::new(3, std::time::Duration::from_millis(1));
        assert!(registry.place_exists("857359").await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_registry() {
        let registry = InMemoryPlaceRegistry::new()
            .with_place("857359", "Trapezus")
            .with_slug("857359", "trapezus");

        assert!(registry.place_exists("857359").await.unwrap());
        assert!(!registry.place_exists("1").await.unwrap());
        assert!(registry.slug_exists("857359", "trapezus").await.unwrap());
        assert!(!registry.slug_exists("857359", "moontown").await.unwrap());
        assert_eq!(
            registry.fetch_place("857359").await.unwrap().title,
            "Trapezus"
        );
        assert!(registry.fetch_place("1").await.is_err());
    }
}
