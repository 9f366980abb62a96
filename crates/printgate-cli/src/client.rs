use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use url::Url;

pub struct PrintgateClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl PrintgateClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid server URL \"{base_url}\""))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid server URL \"{base_url}\"");
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    /// Builds `<base>/<segments...>`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, self.url(segments));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req.header("Accept", "application/json")
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value> {
        let resp = req.send().await.context("Failed to connect to server")?;
        handle_response(resp).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Value> {
        let req = self
            .request(Method::POST, &["api", "login"])
            .json(&json!({ "username": username, "password": password }));
        self.send(req).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.send(self.request(Method::POST, &["api", "logout"]))
            .await
            .map(|_| ())
    }

    pub async fn submit(&self, printer: &str, filename: &str) -> Result<Value> {
        let req = self
            .request(Method::POST, &["api", "printers", printer, "jobs"])
            .json(&json!({ "filename": filename }));
        self.send(req).await
    }

    pub async fn list_queue(&self, printer: &str) -> Result<Value> {
        self.send(self.request(Method::GET, &["api", "printers", printer, "jobs"]))
            .await
    }

    pub async fn promote(&self, printer: &str, job: u64) -> Result<()> {
        let job = job.to_string();
        let req = self.request(
            Method::POST,
            &["api", "printers", printer, "jobs", &job, "promote"],
        );
        self.send(req).await.map(|_| ())
    }

    pub async fn status(&self, printer: &str) -> Result<Value> {
        self.send(self.request(Method::GET, &["api", "printers", printer, "status"]))
            .await
    }

    pub async fn service(&self, action: &str) -> Result<Value> {
        self.send(self.request(Method::POST, &["api", "service", action]))
            .await
    }

    pub async fn read_config(&self, key: &str) -> Result<Value> {
        self.send(self.request(Method::GET, &["api", "config", key]))
            .await
    }

    pub async fn set_config(&self, key: &str, value: &str) -> Result<Value> {
        let req = self
            .request(Method::PUT, &["api", "config", key])
            .json(&json!({ "value": value }));
        self.send(req).await
    }

    pub async fn health(&self) -> Result<(u16, String)> {
        let resp = self
            .http
            .get(self.url(&["healthz"]))
            .send()
            .await
            .context("Failed to connect to server")?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }
}

async fn handle_response(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        anyhow::bail!("{}", describe_error(status, &body));
    }

    if body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).context("Failed to parse response JSON")
}

/// Renders a `{"error", "message"}` body, falling back to the raw text.
fn describe_error(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(code) = json.get("error").and_then(Value::as_str)
    {
        let message = json.get("message").and_then(Value::as_str).unwrap_or(code);
        let hint = match code {
            "invalid_or_expired_session" => " Run `printgate login` again.",
            _ => "",
        };
        return format!("{message} ({code}, HTTP {}).{hint}", status.as_u16());
    }
    format!("HTTP {status}: {body}")
}
