use std::future::Future;
use std::time::Duration;

use crate::adsb::{FetchError, HttpFetcher};

/// Public adsb.lol endpoint for lookups by ICAO hex address
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://api.adsb.lol/v2/hex";

/// Something that can fetch the raw metadata record for an ICAO hex address.
pub trait MetadataSource {
    fn fetch_metadata(&self, hex: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Client for the remote aircraft database.
#[derive(Clone, Debug)]
pub struct LookupClient {
    fetcher: HttpFetcher,
    base_url: String,
}

impl LookupClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: HttpFetcher::new(timeout)?,
            base_url: base_url.into(),
        })
    }

    /// URL queried for `hex`.
    pub fn url_for(&self, hex: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), hex.trim().to_ascii_lowercase())
    }
}

impl MetadataSource for LookupClient {
    async fn fetch_metadata(&self, hex: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(hex);
        self.fetcher.get(&url).await
    }
}
