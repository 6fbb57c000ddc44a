use crate::core::{ConfigProvider, Scalar};
use crate::utils::error::{DcubeError, Result};
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Narrows a scenario, queue or metric request.
///
/// Both fields are optional on purpose: `Some(0)` days is a real (empty) time
/// window, not "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub days: Option<u32>,
    pub name: Option<String>,
}

impl JobFilter {
    pub fn is_empty(&self) -> bool {
        self.days.is_none() && self.name.is_none()
    }

    /// Query parameters for this filter relative to `now`, in the order the
    /// API documents them: `stop`, `start`, `name`.
    pub fn query_pairs(&self, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(days) = self.days {
            let start = now - chrono::Duration::days(i64::from(days));
            pairs.push(("stop", now.timestamp().to_string()));
            pairs.push(("start", start.timestamp().to_string()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        pairs
    }
}

/// Which slice of the metric listing to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricQuery {
    pub filter: JobFilter,
    /// Only the most recent N jobs.
    pub last: Option<u32>,
}

impl MetricQuery {
    pub fn resource(&self) -> String {
        match self.last {
            Some(last) => format!("metric/adv/{}", last),
            None if !self.filter.is_empty() => "metric/adv".to_string(),
            None => "metric".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.delta.is_none()
    }
}

/// Body of `POST queue/create_job`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    pub protocol: i64,
    pub layout: String,
    pub periodicity: i64,
    pub message_length: i64,
    pub patching: i64,
    pub name: String,
    pub description: String,
    pub duration: i64,
    pub logs: i64,
    pub jamming: i64,
    pub priority: bool,
    /// Firmware image, base64 encoded.
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_overrides: Option<ConfigOverrides>,
}

pub fn encode_firmware(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Thin client for the DCUBE REST API. Every request carries the API key as
/// the `key` query parameter.
#[derive(Debug, Clone)]
pub struct DcubeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DcubeClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key: config.api_key().to_string(),
        })
    }

    /// `<base>/api/<resource>?key=<key>[&stop=..&start=..][&name=..]`
    pub fn resource_url(&self, resource: &str, filter: &JobFilter, now: DateTime<Utc>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/api/{}", self.base_url, resource))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.api_key);
            for (name, value) in filter.query_pairs(now) {
                query.append_pair(name, &value);
            }
        }
        Ok(url)
    }

    /// The URL with the API key masked, safe to log.
    pub fn redact(&self, url: &Url) -> String {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(name, value)| {
                let value = if name == "key" {
                    "***".to_string()
                } else {
                    value.into_owned()
                };
                (name.into_owned(), value)
            })
            .collect();

        let mut redacted = url.clone();
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
        redacted.to_string()
    }

    pub async fn fetch_scenario(&self, job_id: u64, filter: &JobFilter) -> Result<Value> {
        self.get(&format!("scenario/{}", job_id), filter).await
    }

    pub async fn fetch_queue(&self, job_id: u64, filter: &JobFilter) -> Result<Value> {
        self.get(&format!("queue/{}", job_id), filter).await
    }

    pub async fn fetch_metrics(&self, query: &MetricQuery) -> Result<Value> {
        self.get(&query.resource(), &query.filter).await
    }

    /// The job's description with commas removed, ready to be embedded in a
    /// CSV line by a shell script.
    pub async fn fetch_description(&self, job_id: u64) -> Result<String> {
        let queue = self.fetch_queue(job_id, &JobFilter::default()).await?;
        let description = queue
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(description.replace(',', ""))
    }

    /// Queues a job and returns the id the server assigned.
    pub async fn create_job(&self, job: &JobRequest) -> Result<Scalar> {
        let url = self.resource_url("queue/create_job", &JobFilter::default(), Utc::now())?;
        tracing::info!("📡 POST {} ({})", self.redact(&url), job.name);
        let request = self.client.request(Method::POST, url).json(job);
        let response = self.send(request, "queue/create_job").await?;
        Ok(Self::id_of(response))
    }

    /// Deletes a queued job and returns the id the server confirmed.
    pub async fn delete_job(&self, job_id: u64) -> Result<Scalar> {
        let resource = format!("queue/{}", job_id);
        let url = self.resource_url(&resource, &JobFilter::default(), Utc::now())?;
        tracing::info!("📡 DELETE {}", self.redact(&url));
        let request = self
            .client
            .request(Method::DELETE, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let response = self.send(request, &resource).await?;
        Ok(Self::id_of(response))
    }

    async fn get(&self, resource: &str, filter: &JobFilter) -> Result<Value> {
        let url = self.resource_url(resource, filter, Utc::now())?;
        tracing::debug!("📡 GET {}", self.redact(&url));
        let request = self
            .client
            .request(Method::GET, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.send(request, resource).await
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<Value> {
        // The request URL carries the API key, keep it out of error messages.
        let response = request.send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        tracing::debug!("API response status for {}: {}", resource, status);

        if !status.is_success() {
            return Err(DcubeError::ApiStatus {
                status: status.as_u16(),
                resource: resource.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| e.without_url())?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn id_of(response: Value) -> Scalar {
        response
            .get("id")
            .cloned()
            .map(Scalar::from)
            .unwrap_or_default()
    }
}
