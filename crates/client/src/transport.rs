//! HTTP access to one cluster's admin API.

use crate::envelope::{self, Item};
use crate::error::{Error, Result};
use crate::metrics;
use gwadmin_core::{AdminApiVersion, ClusterOptions, ResourceKind};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Instant;

const ADMIN_KEY_HEADER: &str = "X-API-Key";

/// Thin wrapper over a `reqwest::Client` bound to one admin API base URL.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    admin_key: Option<String>,
    version: AdminApiVersion,
    cluster: String,
}

impl Transport {
    pub fn new(opts: &ClusterOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(opts.connect_timeout())
            .timeout(opts.timeout())
            .danger_accept_invalid_certs(opts.skip_tls_verify)
            .build()?;
        Ok(Self {
            http,
            base_url: opts.base_url.trim_end_matches('/').to_string(),
            admin_key: opts.admin_key.clone(),
            version: opts.admin_api_version,
            cluster: opts.name.clone(),
        })
    }

    pub fn version(&self) -> AdminApiVersion {
        self.version
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn item_url(&self, kind: ResourceKind, id: &str) -> String {
        self.url(&format!("{}/{id}", kind.path(self.version)))
    }

    /// `GET {base}/{kind}/{id}`; a 404 becomes [`Error::NotFound`].
    pub async fn get_item(&self, kind: ResourceKind, id: &str) -> Result<Item> {
        let url = self.item_url(kind, id);
        let (status, body) = self.send(kind, "get", self.request(Method::GET, &url)).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                kind,
                id: id.to_string(),
            });
        }
        check_status(status, &url, &body)?;
        envelope::decode_item(self.version, &body)
    }

    /// `GET {base}/{kind}`: the full remote collection.
    pub async fn list_items(&self, kind: ResourceKind) -> Result<Vec<Item>> {
        let url = self.url(kind.path(self.version));
        let (status, body) = self.send(kind, "list", self.request(Method::GET, &url)).await?;
        check_status(status, &url, &body)?;
        envelope::decode_list(self.version, &body)
    }

    /// `PUT {base}/{kind}/{id}` with a JSON body; returns the stored item.
    pub async fn put_item(&self, kind: ResourceKind, id: &str, body: &Value) -> Result<Item> {
        let url = self.item_url(kind, id);
        tracing::debug!(cluster = %self.cluster, %kind, %id, %url, body = %body, "admin api put");
        let req = self.request(Method::PUT, &url).json(body);
        let (status, body) = self.send(kind, "put", req).await?;
        check_status(status, &url, &body)?;
        envelope::decode_item(self.version, &body)
    }

    /// `DELETE {base}/{kind}/{id}`; a 404 counts as deleted.
    pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let url = self.item_url(kind, id);
        let (status, body) = self
            .send(kind, "delete", self.request(Method::DELETE, &url))
            .await?;
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(cluster = %self.cluster, %kind, %id, "already absent on remote");
            return Ok(());
        }
        check_status(status, &url, &body)
    }

    /// `GET {base}/{path}` returning the raw JSON body, for endpoints without an envelope.
    pub async fn get_json(&self, kind: ResourceKind, path: &str) -> Result<Value> {
        let url = self.url(path);
        let (status, body) = self.send(kind, "get", self.request(Method::GET, &url)).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                kind,
                id: path.to_string(),
            });
        }
        check_status(status, &url, &body)?;
        serde_json::from_str(&body).map_err(|e| Error::Decode(format!("{e}: {body}")))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.admin_key {
            Some(key) => req.header(ADMIN_KEY_HEADER, key),
            None => req,
        }
    }

    /// Send `req` and read the whole body.
    ///
    /// Error bodies reporting a disabled feature are mapped before status
    /// handling. Success bodies are never inspected for the marker.
    async fn send(
        &self,
        kind: ResourceKind,
        operation: &'static str,
        req: RequestBuilder,
    ) -> Result<(StatusCode, String)> {
        let start = Instant::now();
        let response = req.send().await;
        metrics::record_latency(&self.cluster, operation, start.elapsed());

        let response = response.inspect_err(|e| {
            tracing::error!(cluster = %self.cluster, %kind, operation, error = %e, "admin api request failed");
        })?;
        let status = response.status();
        metrics::record_status(&self.cluster, kind, status.as_u16());

        let body = response.text().await?;
        if !status.is_success() && envelope::is_function_disabled(&body) {
            tracing::warn!(cluster = %self.cluster, %kind, operation, "gateway reports function disabled");
            return Err(Error::FunctionDisabled);
        }
        Ok((status, body))
    }
}

fn check_status(status: StatusCode, url: &str, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(Error::Status {
        status: status.as_u16(),
        url: url.to_string(),
        body: body.to_string(),
    })
}
