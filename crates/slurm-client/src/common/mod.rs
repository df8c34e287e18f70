//! Common utilities for the Slurm API client
//!
//! Provides the authenticated HTTP wrapper shared by all list endpoints.

use crate::error::SlurmError;
use crate::models::ApiError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// HTTP client wrapper with Slurm token authentication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_version: String,
    token: Option<String>,
    user_name: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(
        client: Client,
        base_url: String,
        api_version: String,
        token: Option<String>,
        user_name: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
            token,
            user_name,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the REST API version segment (e.g. `v0.0.44`)
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Build a full URL for an endpoint under `/slurm/<version>/`
    pub fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/slurm/{}/{}",
            self.base_url,
            self.api_version,
            endpoint.trim_start_matches('/')
        )
    }

    /// Make an authenticated GET request and decode the JSON body
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T, SlurmError> {
        let url = self.build_url(endpoint);
        debug!("GET {}", url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("X-SLURM-USER-TOKEN", token);
        }
        if let Some(user) = &self.user_name {
            request = request.header("X-SLURM-USER-NAME", user);
        }

        let response = request.send().await.map_err(SlurmError::Http)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(SlurmError::Authentication(format!(
                "GET {} rejected: {} - {}",
                endpoint, status, body
            )));
        }

        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(SlurmError::NotFound(format!(
                "Endpoint not found: {} - {}",
                endpoint, body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlurmError::Api(format!(
                "GET {} failed: {} - {}",
                endpoint, status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            SlurmError::Api(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                response_text.chars().take(500).collect::<String>()
            ))
        })
    }
}

/// Turn a non-empty `errors` array from a response envelope into an error
pub fn check_api_errors(endpoint: &str, errors: &[ApiError]) -> Result<(), SlurmError> {
    if errors.is_empty() {
        return Ok(());
    }
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(SlurmError::Api(format!("{} returned errors: {}", endpoint, joined)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(base: &str) -> HttpClient {
        HttpClient::new(Client::new(), base.to_string(), "v0.0.44".to_string(), None, None)
    }

    #[test]
    fn test_build_url_trims_slashes() {
        let client = http("http://slurm:6820/");
        assert_eq!(client.base_url(), "http://slurm:6820");
        assert_eq!(client.build_url("jobs"), "http://slurm:6820/slurm/v0.0.44/jobs");
        assert_eq!(client.build_url("/nodes"), "http://slurm:6820/slurm/v0.0.44/nodes");
    }

    #[test]
    fn test_check_api_errors() {
        assert!(check_api_errors("jobs", &[]).is_ok());

        let errors = vec![
            ApiError { description: Some("first".to_string()), ..Default::default() },
            ApiError { error: Some("second".to_string()), error_number: Some(9), ..Default::default() },
        ];
        match check_api_errors("jobs", &errors) {
            Err(SlurmError::Api(msg)) => assert_eq!(msg, "jobs returned errors: first; second (error 9)"),
            other => panic!("expected Api error, got {:?}", other),
        }
    }
}
