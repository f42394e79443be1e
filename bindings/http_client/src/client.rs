use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use squall_core::prelude::AgentBailError;
use squall_instruments::{OperationRecord, Reporter};
use squall_instruments_derive::squall_instrument;
use url::Url;

use crate::error::{handle_request_err, HttpStatusError};
use crate::response::HttpResponse;

/// The HTTP operations that scenario actions depend on.
///
/// Failures are returned rather than handled, so the runner sees and counts every one of them.
pub trait HttpClient: std::fmt::Debug + Send + Sync + 'static {
    /// Issue a GET for `path`, relative to the client's base URL.
    fn get(&self, path: &str) -> impl Future<Output = anyhow::Result<HttpResponse>> + Send;
}

/// A `reqwest` client bound to one base URL that reports every request it makes.
#[derive(Debug, Clone)]
pub struct HttpClientInstrumented {
    client: reqwest::Client,
    base_url: Url,
    reporter: Arc<Reporter>,
}

impl HttpClientInstrumented {
    pub fn new(base_url: &str, reporter: Arc<Reporter>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Self::with_client(base_url, client, reporter)
    }

    /// Use a preconfigured `reqwest` client, for example one with timeouts or default headers.
    pub fn with_client(
        base_url: &str,
        client: reqwest::Client,
        reporter: Arc<Reporter>,
    ) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("Base URL must use http or https, got: {base_url}");
        }

        Ok(Self {
            client,
            base_url,
            reporter,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Work out the full URL for `path`.
    ///
    /// The path is appended to the base URL as written, so a base of `http://host/shop` and a
    /// path of `/` gives `http://host/shop/`. A path without a leading `/` is joined with one, so
    /// it can never change the host. A path that is already an absolute http(s) URL is used
    /// unchanged.
    pub fn resolve(&self, path: &str) -> anyhow::Result<Url> {
        if let Ok(absolute) = Url::parse(path) {
            if matches!(absolute.scheme(), "http" | "https") {
                return Ok(absolute);
            }
        }

        let separator = if path.starts_with('/') { "" } else { "/" };
        let joined = format!(
            "{}{separator}{path}",
            self.base_url.as_str().trim_end_matches('/')
        );
        Url::parse(&joined).with_context(|| format!("Cannot form a URL from path: {path}"))
    }

    #[squall_instrument(prefix = "http_", pre_hook = pre_get)]
    pub async fn get(&self, path: &str) -> anyhow::Result<HttpResponse> {
        let url = self
            .resolve(path)
            .map_err(|e| AgentBailError::new(format!("{e:#}")))?;

        log::trace!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(handle_request_err)?;
        let status = response.status();
        let body = response.bytes().await.map_err(handle_request_err)?;

        if !status.is_success() {
            return Err(HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        Ok(HttpResponse::new(status.as_u16(), body))
    }
}

fn pre_get(operation_record: &mut OperationRecord, path: &str) {
    operation_record.add_attr("path", path);
}

impl HttpClient for HttpClientInstrumented {
    async fn get(&self, path: &str) -> anyhow::Result<HttpResponse> {
        HttpClientInstrumented::get(self, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use squall_instruments::{ReportCollector, ReportConfig};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    #[derive(Default)]
    struct Capture {
        records: Arc<Mutex<Vec<OperationRecord>>>,
    }

    impl ReportCollector for Capture {
        fn add_operation(&mut self, operation_record: &OperationRecord) {
            self.records.lock().push(operation_record.clone());
        }

        fn finalize(&self) {}
    }

    fn capturing_reporter() -> (Arc<Reporter>, Arc<Mutex<Vec<OperationRecord>>>) {
        let capture = Capture::default();
        let records = capture.records.clone();
        (
            Arc::new(ReportConfig::default().with_collector(capture).init()),
            records,
        )
    }

    /// Accept a single connection, answer it and hand back the request head that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            String::from_utf8(request).unwrap()
        });

        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn get_root_targets_configured_host() {
        let (base_url, server) = serve_once("200 OK", "ok").await;
        let (reporter, records) = capturing_reporter();
        let client = HttpClientInstrumented::new(&base_url, reporter).unwrap();

        let response = client.get("/").await.unwrap();

        assert_eq!(200, response.status());
        assert_eq!(&b"ok"[..], &response.body()[..]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET / HTTP/1.1\r\n"), "{request}");
        let host = base_url.trim_start_matches("http://");
        assert!(
            request.to_lowercase().contains(&format!("host: {host}")),
            "{request}"
        );

        let records = records.lock();
        assert_eq!(1, records.len());
        assert_eq!("http_get", records[0].operation_id);
        assert_eq!(Some(&"/".to_string()), records[0].attr.get("path"));
        assert!(!records[0].is_error);
    }

    #[tokio::test]
    async fn non_success_status_is_reported_as_failure() {
        let (base_url, server) = serve_once("503 Service Unavailable", "busy").await;
        let (reporter, records) = capturing_reporter();
        let client = HttpClientInstrumented::new(&base_url, reporter).unwrap();

        let err = client.get("/").await.unwrap_err();
        server.await.unwrap();

        let status_err = err.downcast_ref::<HttpStatusError>().unwrap();
        assert_eq!(503, status_err.status);
        assert!(records.lock()[0].is_error);
    }

    #[tokio::test]
    async fn refused_connection_is_reported_as_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (reporter, records) = capturing_reporter();
        let client = HttpClientInstrumented::new(&format!("http://{addr}"), reporter).unwrap();

        let err = client.get("/").await.unwrap_err();

        // Refused connections are counted, not a reason to stop the agent.
        assert!(!err.is::<AgentBailError>());
        let records = records.lock();
        assert_eq!(1, records.len());
        assert!(records[0].is_error);
    }

    #[test]
    fn resolve_appends_path_to_base_url() {
        let (reporter, _) = capturing_reporter();

        let client = HttpClientInstrumented::new("http://localhost:4000", reporter.clone()).unwrap();
        assert_eq!("http://localhost:4000/", client.resolve("/").unwrap().as_str());
        assert_eq!(
            "http://localhost:4000/products?page=2",
            client.resolve("/products?page=2").unwrap().as_str()
        );
        assert_eq!(
            "http://localhost:4000/health",
            client.resolve("health").unwrap().as_str()
        );

        let client = HttpClientInstrumented::new("https://example.com/shop", reporter).unwrap();
        assert_eq!("https://example.com/shop/", client.resolve("/").unwrap().as_str());
        assert_eq!(
            "example.com",
            client.resolve("health").unwrap().host_str().unwrap()
        );
        assert_eq!("https://example.com/shop/", client.resolve("").unwrap().as_str());
        assert_eq!(
            "http://other.example.com/health",
            client
                .resolve("http://other.example.com/health")
                .unwrap()
                .as_str()
        );
    }

    #[test]
    fn reject_unusable_base_url() {
        let (reporter, _) = capturing_reporter();

        assert!(HttpClientInstrumented::new("not a url", reporter.clone()).is_err());
        assert!(HttpClientInstrumented::new("ftp://example.com", reporter).is_err());
    }
}
