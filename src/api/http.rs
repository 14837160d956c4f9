use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::api::Backend;
use crate::state::Config;

pub struct HttpBackend {
    client: Client,
    cfg: Config,
}

impl HttpBackend {
    pub fn new(cfg: Config) -> Result<Self> {
        let mut builder = Client::builder();
        if cfg.http_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(cfg.http_timeout_ms));
        }
        Ok(Self { client: builder.build()?, cfg })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    async fn send(&self, method: &str, path: &str, req: RequestBuilder) -> Result<Value> {
        let resp = req
            .send()
            .await
            .map_err(|e| anyhow!("{} {} failed: {}", method, path, e))?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(anyhow!(
                "{} {} failed: {} - {}",
                method,
                path,
                status.as_u16(),
                server_message(&body, status.canonical_reason().unwrap_or("error"))
            ));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        // Some endpoints answer mutations with plain text.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }

    /// Fetch a server-generated file (CSV/Excel report) into `dest`.
    pub async fn download(&self, url: Url, dest: &Path) -> Result<u64> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| anyhow!("GET {} failed: {}", url, e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "GET {} failed: {} - {}",
                url,
                status.as_u16(),
                server_message(&body, status.canonical_reason().unwrap_or("error"))
            ));
        }
        let bytes = resp.bytes().await?;
        std::fs::write(dest, &bytes)?;
        Ok(bytes.len() as u64)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.cfg.resource_url(path)?;
        self.send("GET", path, self.client.get(url)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.cfg.resource_url(path)?;
        self.send("POST", path, self.client.post(url).json(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let url = self.cfg.resource_url(path)?;
        self.send("PUT", path, self.client.put(url).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.cfg.resource_url(path)?;
        self.send("DELETE", path, self.client.delete(url)).await.map(|_| ())
    }
}

/// Human message from an error body: `message`/`error` of a JSON object,
/// else the raw text, else the status reason.
fn server_message(body: &str, reason: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(Value::String(s)) = map.get(key) {
                return s.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.to_string()
    } else {
        trimmed.to_string()
    }
}
