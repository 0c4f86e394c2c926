use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::COOKIE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::header::ORIGIN;
use reqwest::header::REFERER;
use reqwest::header::USER_AGENT;
use tracing::debug;
use tracing::trace;

use crate::config::Config;
use crate::error::RelayErr;
use crate::error::Result;
use crate::request::ConversationRequest;

const CONVERSATION_PATH: &str = "/backend-api/conversation";

/// Posts conversation turns and returns the raw event-stream body.
#[derive(Clone, Debug)]
pub struct ConversationClient {
    url: String,
    http: reqwest::Client,
}

impl ConversationClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(default_headers(config)?)
            .build()?;
        Ok(Self {
            url: format!("{}{CONVERSATION_PATH}", config.base_url),
            http,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one turn and read the full response body. Only `200 OK` counts
    /// as success.
    pub async fn send(&self, request: &ConversationRequest) -> Result<String> {
        let payload = serde_json::to_string(request)?;
        trace!("POST to {}: {payload}", self.url);

        let res = self.http.post(&self.url).body(payload).send().await?;
        let status = res.status();
        let body = res.text().await?;
        debug!("{} answered {status} with {} bytes", self.url, body.len());

        if status != StatusCode::OK {
            return Err(RelayErr::UnexpectedStatus { status, body });
        }
        Ok(body)
    }
}

fn default_headers(config: &Config) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = &config.user_token {
        h.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
    }
    if let Some(cookie) = &config.cookie {
        h.insert(COOKIE, header_value(cookie)?);
    }
    h.insert(ORIGIN, header_value(&config.base_url)?);
    h.insert(REFERER, header_value(&format!("{}/", config.base_url))?);
    h.insert(USER_AGENT, header_value(&config.user_agent)?);

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RelayErr::InvalidHeader(name.clone()))?;
        h.insert(name, header_value(value)?);
    }
    Ok(h)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| RelayErr::InvalidHeader(value.to_string()))
}
