//! HTTP contract with the filter server.
//!
//! One multipart `POST` carrying the raw image (`image`) and the filter name
//! (`filter`). The server always answers with a JSON object carrying a
//! `success` flag; anything else counts as a transport failure.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, multipart};
use serde::Deserialize;

use crate::catalog::FilterId;

pub const GENERIC_FAILURE: &str = "Processing failed, please try again";
pub const NETWORK_FAILURE: &str = "Network error, please check your connection and try again";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Everything one filter request needs.
pub struct SubmitRequest {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
    pub filter: FilterId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A filtered image as returned by the server.
pub struct FilteredResult {
    /// Embeddable payload: a data URL or bare base64.
    pub image_data: String,
    /// Filter name echoed by the server.
    pub filter_name: String,
}

impl FilteredResult {
    /// Suggested file name for saving the result.
    pub fn download_name(&self) -> String {
        format!("filtered_{}.jpg", self.filter_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The server processed the request and reported a failure.
    #[error("server rejected the image: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Success response whose image could not be decoded.
    #[error("unreadable image payload: {0}")]
    Payload(String),
}

impl SubmitError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Rejected(Some(msg)) if !msg.trim().is_empty() => msg.clone(),
            SubmitError::Rejected(_) => GENERIC_FAILURE.to_string(),
            SubmitError::Transport(_) | SubmitError::Malformed(_) => NETWORK_FAILURE.to_string(),
            SubmitError::Payload(_) => {
                "The filtered image could not be displayed, please try again".to_string()
            }
        }
    }
}

/// Something that can run a filter on an image.
pub trait FilterService: Send + Sync {
    fn apply(&self, request: &SubmitRequest) -> Result<FilteredResult, SubmitError>;
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    success: bool,
    #[serde(default)]
    filtered_image: Option<String>,
    #[serde(default)]
    filter_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Interprets a response body. `requested` fills in a missing `filter_name`.
pub fn parse_response(body: &str, requested: FilterId) -> Result<FilteredResult, SubmitError> {
    let parsed: ResponseBody =
        serde_json::from_str(body).map_err(|e| SubmitError::Malformed(e.to_string()))?;
    if !parsed.success {
        return Err(SubmitError::Rejected(parsed.error));
    }
    let image_data = parsed
        .filtered_image
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SubmitError::Malformed("success without filtered_image".to_string()))?;
    let filter_name = parsed
        .filter_name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| requested.as_str().to_string());
    Ok(FilteredResult {
        image_data,
        filter_name,
    })
}

/// Filter service reached over HTTP.
pub struct HttpFilterService {
    client: Client,
    endpoint: reqwest::Url,
}

impl HttpFilterService {
    pub fn new(endpoint: reqwest::Url, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("retrofilter/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, endpoint))
    }

    pub fn with_client(client: Client, endpoint: reqwest::Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    fn build_form(request: &SubmitRequest) -> Result<multipart::Form, SubmitError> {
        let image = multipart::Part::bytes(request.bytes.to_vec())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime)
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        Ok(multipart::Form::new()
            .part("image", image)
            .text("filter", request.filter.as_str()))
    }
}

impl FilterService for HttpFilterService {
    fn apply(&self, request: &SubmitRequest) -> Result<FilteredResult, SubmitError> {
        let form = Self::build_form(request)?;
        tracing::info!(
            endpoint = %self.endpoint,
            filter = %request.filter,
            bytes = request.bytes.len(),
            "submitting image"
        );
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        tracing::debug!(%status, len = body.len(), "filter response");
        // Failure bodies may come with an error status; the JSON decides.
        parse_response(&body, request.filter)
    }
}
