//! reqwest-backed transport for the GitHub REST API.

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use url::Url;

use crate::{
    application::enrichment::{HttpResponse, Transport, TransportError},
    config::GithubSettings,
};

use super::error::InfraError;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ReqwestTransport {
    /// Build a transport whose requests are each bounded by `settings.timeout`.
    pub fn new(settings: &GithubSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            base: directory_base(&settings.api_base),
            token: settings.token.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|err| TransportError::Request {
                path: path.to_string(),
                message: format!("invalid URL: {err}"),
            })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.get(self.url(path)?).header(ACCEPT, GITHUB_MEDIA_TYPE);
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| transport_error(path, err))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(path, err))?;

        Ok(HttpResponse { status, body })
    }
}

/// Relative joins only extend a base whose path ends in `/`.
fn directory_base(base: &Url) -> Url {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn transport_error(path: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            path: path.to_string(),
        }
    } else {
        TransportError::Request {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_paths_under_base_path() {
        let base = directory_base(&Url::parse("https://ghe.example.com/api/v3").expect("url"));
        assert_eq!(
            base.join("repos/octo/tool").expect("join").as_str(),
            "https://ghe.example.com/api/v3/repos/octo/tool"
        );

        let root = directory_base(&Url::parse("https://api.github.com").expect("url"));
        assert_eq!(
            root.join("users/octo/events").expect("join").as_str(),
            "https://api.github.com/users/octo/events"
        );
    }
}
