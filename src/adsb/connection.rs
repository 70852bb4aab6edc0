use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

/// Path of the aircraft list on a dump1090-fa web server
pub const DUMP1090_PATH: &str = "/dump1090-fa/data/aircraft.json";

/// Port lighttpd serves dump1090-fa on in a stock PiAware install
pub const DUMP1090_PORT: u16 = 8080;

/// Timeout applied to every request unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Why a single HTTP GET produced no data.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} returned an empty body")]
    Empty { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// True when the request never got an answer within its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

/// One bounded HTTP GET, returning the body as bytes.
///
/// Holds a pooled `reqwest::Client`; clones share the pool.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, timeout })
    }

    pub async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_owned(), status });
        }

        let body = response.bytes().await.map_err(|e| self.classify(url, e))?;
        if body.is_empty() {
            return Err(FetchError::Empty { url: url.to_owned() });
        }

        debug!("GET {} -> {} bytes", url, body.len());
        Ok(body.to_vec())
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout { url: url.to_owned(), after: self.timeout }
        } else {
            FetchError::Transport { url: url.to_owned(), source: error }
        }
    }
}

/// Something that can produce one raw aircraft feed payload.
pub trait FeedSource {
    fn fetch_feed(&self) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Client for the dump1090 `aircraft.json` endpoint.
#[derive(Clone, Debug)]
pub struct FeedClient {
    fetcher: HttpFetcher,
    url: String,
}

impl FeedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: HttpFetcher::new(timeout)?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl FeedSource for FeedClient {
    async fn fetch_feed(&self) -> Result<Vec<u8>, FetchError> {
        self.fetcher.get(&self.url).await
    }
}

/// Build the aircraft list URL for a dump1090 host.
pub fn feed_url(host: &str, port: u16, path: &str) -> String {
    let path = if path.starts_with('/') { path.to_owned() } else { format!("/{path}") };
    format!("http://{}:{}{}", host.trim(), port, path)
}

/// Minimal HTTP/1.1 responders for exercising the clients without a network.
#[cfg(test)]
pub(crate) mod test_server {
    use std::net::SocketAddr;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer every connection with `status` and `body`. Returns the bound address.
    pub async fn respond_with(status: &'static str, body: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else { return };
                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        addr
    }

    /// Accept connections but never answer.
    pub async fn never_respond() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                let Ok((stream, _)) = listener.accept().await else { return };
                held.push(stream);
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        });
        addr
    }

    /// An address nothing is listening on.
    pub async fn closed_port() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::*;
    use super::*;

    const SHORT: Duration = Duration::from_millis(300);

    #[test]
    fn test_feed_url_layout() {
        assert_eq!(
            feed_url("192.168.1.20", DUMP1090_PORT, DUMP1090_PATH),
            "http://192.168.1.20:8080/dump1090-fa/data/aircraft.json"
        );
        assert_eq!(feed_url(" piaware ", 80, "data/aircraft.json"), "http://piaware:80/data/aircraft.json");
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let addr = respond_with("200 OK", r#"{"aircraft": []}"#).await;
        let client = FeedClient::new(format!("http://{addr}/aircraft.json"), SHORT).unwrap();
        let body = client.fetch_feed().await.unwrap();
        assert_eq!(body, br#"{"aircraft": []}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_a_failure() {
        let addr = respond_with("503 Service Unavailable", "busy").await;
        let client = FeedClient::new(format!("http://{addr}/aircraft.json"), SHORT).unwrap();
        match client.fetch_feed().await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_a_failure() {
        let addr = respond_with("200 OK", "").await;
        let client = FeedClient::new(format!("http://{addr}/aircraft.json"), SHORT).unwrap();
        assert!(matches!(client.fetch_feed().await, Err(FetchError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let addr = never_respond().await;
        let client = FeedClient::new(format!("http://{addr}/aircraft.json"), SHORT).unwrap();
        let started = std::time::Instant::now();
        let err = client.fetch_feed().await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let addr = closed_port().await;
        let client = FeedClient::new(format!("http://{addr}/aircraft.json"), SHORT).unwrap();
        let err = client.fetch_feed().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. } | FetchError::Timeout { .. }), "got {err:?}");
    }
}
