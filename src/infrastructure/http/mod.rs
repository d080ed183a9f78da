//! Outbound HTTP clients for platform APIs

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde_json::Value;

use crate::application::errors::BotError;
use crate::domain::traits::{HttpClient, HttpResponse};

/// Default request timeout
const TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking reqwest client
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| BotError::send("http", e.to_string()))?;
        Ok(Self { client })
    }

    fn read(response: Response) -> Result<HttpResponse, BotError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| BotError::send("http", e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for ReqwestClient {
    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<HttpResponse, BotError> {
        let response = self.client
            .post(url)
            .form(fields)
            .send()
            .map_err(|e| BotError::send("http", e.to_string()))?;
        Self::read(response)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, BotError> {
        let response = self.client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| BotError::send("http", e.to_string()))?;
        Self::read(response)
    }
}

/// Logs outbound calls instead of performing them
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunClient;

impl HttpClient for DryRunClient {
    fn post_form(&self, url: &str, fields: &[(&str, String)]) -> Result<HttpResponse, BotError> {
        let rendered: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        tracing::info!("[dry-run] POST {} {}", url, rendered.join(" "));
        Ok(HttpResponse::ok("{}"))
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse, BotError> {
        tracing::info!("[dry-run] POST {} {}", url, body);
        Ok(HttpResponse::ok("{}"))
    }
}
