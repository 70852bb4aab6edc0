pub mod resolver;
pub mod state;
pub mod worker;

pub use resolver::*;
pub use state::*;
pub use worker::*;

/// Scripted feed and lookup sources for driving the resolver without a network.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde_json::{json, Value};

    use crate::adsb::{FeedSource, FetchError};
    use crate::aircraft::MetadataSource;

    #[derive(Clone, Debug)]
    pub enum Reply {
        Body(String),
        Timeout,
        /// Never completes
        Hang,
    }

    impl Reply {
        async fn into_result(self, url: &str) -> Result<Vec<u8>, FetchError> {
            match self {
                Reply::Body(body) => Ok(body.into_bytes()),
                Reply::Timeout => Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: Duration::from_secs(10),
                }),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    /// Plays back replies in order, repeating the last one.
    pub struct ScriptedFeed {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
    }

    impl ScriptedFeed {
        pub fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next_reply(&self) -> Reply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap_or(Reply::Timeout)
            }
        }
    }

    impl FeedSource for Arc<ScriptedFeed> {
        async fn fetch_feed(&self) -> Result<Vec<u8>, FetchError> {
            let reply = self.next_reply();
            reply.into_result("scripted://feed").await
        }
    }

    /// Answers every lookup with the same reply and remembers what was asked.
    pub struct ScriptedLookup {
        reply: Reply,
        calls: AtomicUsize,
        last_hex: Mutex<Option<String>>,
    }

    impl ScriptedLookup {
        pub fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last_hex: Mutex::new(None),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_hex(&self) -> Option<String> {
            self.last_hex.lock().unwrap().clone()
        }
    }

    impl MetadataSource for Arc<ScriptedLookup> {
        async fn fetch_metadata(&self, hex: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_hex.lock().unwrap() = Some(hex.to_string());
            self.reply.clone().into_result("scripted://lookup").await
        }
    }

    /// One feed entry with a position.
    pub fn entry(hex: &str, lat: f64, lon: f64) -> Value {
        json!({ "hex": hex, "lat": lat, "lon": lon, "alt_baro": 12000, "gs": 240.0, "track": 180.0 })
    }

    /// A complete `aircraft.json` body.
    pub fn feed_json(entries: &[Value]) -> String {
        json!({ "now": 1718000000.0, "aircraft": entries }).to_string()
    }
}
