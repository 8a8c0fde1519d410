//! Transliteration collaborator: convert text from a source script to a
//! Latin-script approximation.

use crate::error::RemoteError;
use crate::retry::{with_retry_if, RetryConfig};
use serde::{Deserialize, Serialize};

/// Converts text from a source language/script to a target language's
/// script (Latin, for our purposes).
pub trait Transliterator {
    fn transliterate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> impl std::future::Future<Output = Result<String, RemoteError>> + Send;
}

#[derive(Debug, Serialize)]
struct TransliterationRequest<'a> {
    text: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Debug, Deserialize)]
struct TransliterationResponse {
    result: String,
}

/// Transliterator backed by an HTTP service.
pub struct HttpTransliterator {
    client: reqwest::Client,
    url: String,
    retry: RetryConfig,
}

impl HttpTransliterator {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            retry: RetryConfig::remote_lookup(),
        }
    }
}

impl Transliterator for HttpTransliterator {
    async fn transliterate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, RemoteError> {
        let request = TransliterationRequest {
            text,
            source: source_lang,
            target: target_lang,
        };

        let response = with_retry_if(
            &self.retry,
            "transliteration",
            || async {
                let response = self
                    .client
                    .post(&self.url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|source| RemoteError::Transport {
                        url: self.url.clone(),
                        source,
                    })?;
                let status = response.status().as_u16();
                if status != 200 {
                    return Err(RemoteError::Status {
                        url: self.url.clone(),
                        status,
                    });
                }
                response
                    .json::<TransliterationResponse>()
                    .await
                    .map_err(|source| RemoteError::Decode {
                        url: self.url.clone(),
                        source,
                    })
            },
            |error| match error {
                RemoteError::Transport { .. } => true,
                RemoteError::Status { status, .. } => *status == 429 || *status >= 500,
                RemoteError::Decode { .. } => false,
            },
        )
        .await?;

        Ok(response.result)
    }
}
