use crate::config::Config;
use crate::error::{ApiError, ConfigError, GENERIC_FAILURE_MESSAGE};
use crate::models::{CreateListingRequest, CreatedListing, ListingDraft};
use crate::services::traits::ListingApi;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Listing API client over HTTP
pub struct HttpListingApi {
    client: Client,
    create_url: Url,
    access_token: Option<String>,
}

impl HttpListingApi {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "HOSTEL_HTTP_TIMEOUT_SECS",
                message: e.to_string(),
            })?;

        Self::with_client(client, &config.api_url, config.access_token.clone())
    }

    pub fn with_client(
        client: Client,
        api_url: &Url,
        access_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let create_url = api_url
            .join("listing/create")
            .map_err(|e| ConfigError::Invalid {
                key: "HOSTEL_API_URL",
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            create_url,
            access_token,
        })
    }
}

#[async_trait]
impl ListingApi for HttpListingApi {
    async fn create_listing(
        &self,
        draft: &ListingDraft,
        user_ref: &str,
    ) -> Result<CreatedListing, ApiError> {
        debug!("POST {}", self.create_url);

        let mut request = self
            .client
            .post(self.create_url.clone())
            .json(&CreateListingRequest { draft, user_ref });
        if let Some(token) = &self.access_token {
            request = request.header(COOKIE, format!("access_token={}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let created = parse_create_response(status, &body)?;
        info!("Listing API created listing {}", created.id);
        Ok(created)
    }
}

/// Interpret a `listing/create` response.
///
/// A non-2xx status or `"success": false` in the body is a rejection carrying
/// the body's `message`, or a generic message when there is none.
pub(crate) fn parse_create_response(status: StatusCode, body: &str) -> Result<CreatedListing, ApiError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if status.is_success() => return Err(ApiError::InvalidJson(e)),
        Err(_) => {
            warn!("Listing API returned {} with a non-JSON body", status);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            });
        }
    };

    let explicit_failure = value.get("success").and_then(Value::as_bool) == Some(false);
    if !status.is_success() || explicit_failure {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string();
        warn!("Listing API rejected the draft ({}): {}", status, message);
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_value(value)?)
}
