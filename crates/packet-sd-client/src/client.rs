//! HTTP client for the Packet API.
//!
//! Issues authenticated GET requests over hyper with rustls, follows
//! `meta.next.href` pagination links, and decodes JSON list pages.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, USER_AGENT};
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Empty};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::logger::ApiLogger;
use crate::model::{Device, DevicesPage, Page, Project, ProjectsPage};

/// Boxed future alias for inventory API results.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Read-only inventory operations, injected into the fetcher for testability.
///
/// Implementations return fully materialized lists and must be safe to call
/// repeatedly and from several tasks at once.
pub trait InventoryApi: Send + Sync {
    /// List every project visible to the credentials.
    fn list_projects(&self) -> ApiFuture<'_, Vec<Project>>;

    /// List every device in one project.
    fn list_devices<'a>(&'a self, project_id: &'a str) -> ApiFuture<'a, Vec<Device>>;
}

/// Sent as `X-Consumer-Token` so the API can attribute traffic.
const CONSUMER_TOKEN: &str = "prometheus_sd";
const USER_AGENT_VALUE: &str = concat!("packet-sd/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// [`InventoryApi`] implementation talking to the real Packet API.
pub struct PacketClient {
    http: HttpsClient,
    /// API root without a trailing slash.
    base_url: String,
    auth_token: String,
    logger: Arc<dyn ApiLogger>,
}

impl PacketClient {
    /// Create a client rooted at `base_url` (e.g. `https://api.packet.net/`).
    ///
    /// Plain `http://` roots are accepted as well, which tests rely on.
    pub fn new(base_url: &str, auth_token: &str, logger: Arc<dyn ApiLogger>) -> Self {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let http = Client::builder(TokioExecutor::new()).build(https);

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
            logger,
        }
    }

    /// Turn an href into a request URI.
    ///
    /// Absolute URLs are used as-is. An href starting with `/` replaces the
    /// base path, so pagination links work behind a path prefix; anything
    /// else is relative to the base path.
    fn resolve(&self, href: &str) -> ApiResult<Uri> {
        let url = if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            let base: Uri = self.base_url.parse()?;
            match (base.scheme_str(), base.authority()) {
                (Some(scheme), Some(authority)) => format!("{scheme}://{authority}{href}"),
                _ => format!("{}{href}", self.base_url),
            }
        } else {
            format!("{}/{href}", self.base_url)
        };
        Ok(url.parse()?)
    }

    async fn get<T: DeserializeOwned>(&self, uri: Uri) -> ApiResult<T> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header("X-Auth-Token", self.auth_token.as_str())
            .header("X-Consumer-Token", CONSUMER_TOKEN)
            .body(Empty::<Bytes>::new())?;

        self.logger.log_http(req.method(), req.uri());

        let resp = self.http.request(req).await?;
        let status = resp.status();
        let body = resp.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch `path` and every page linked from it.
    async fn get_all<P: Page>(&self, path: &str) -> ApiResult<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut next = Some(path.to_string());

        while let Some(href) = next.take() {
            let page: P = self.get(self.resolve(&href)?).await?;
            let (mut page_items, next_href) = page.into_parts();
            items.append(&mut page_items);

            // A page linking to itself would loop forever.
            next = next_href.filter(|n| *n != href);
            if let Some(n) = &next {
                self.logger.debug(&format!("following pagination link {n}"));
            }
        }

        Ok(items)
    }
}

impl InventoryApi for PacketClient {
    fn list_projects(&self) -> ApiFuture<'_, Vec<Project>> {
        let path = format!("projects?per_page={PER_PAGE}");
        Box::pin(async move { self.get_all::<ProjectsPage>(&path).await })
    }

    fn list_devices<'a>(&'a self, project_id: &'a str) -> ApiFuture<'a, Vec<Device>> {
        let path = format!("projects/{project_id}/devices?include=facility,plan&per_page={PER_PAGE}");
        Box::pin(async move { self.get_all::<DevicesPage>(&path).await })
    }
}
