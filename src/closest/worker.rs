use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::adsb::FeedSource;
use crate::aircraft::MetadataSource;

use super::resolver::Resolver;
use super::state::SharedClosest;

/// How often a refresh cycle starts
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

const THREAD_NAME: &str = "closest-aircraft-refresh";

/// Background thread that runs a [`Resolver`] cycle on a fixed period and
/// publishes into a [`SharedClosest`].
///
/// The thread owns a single-threaded tokio runtime, so the presentation
/// side never waits on network I/O. Dropping the worker stops it; an
/// in-flight cycle is abandoned at its next await point.
pub struct Worker {
    stop: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn start<F, M>(
        resolver: Resolver<F, M>,
        cell: SharedClosest,
        interval: Duration,
    ) -> std::io::Result<Worker>
    where
        F: FeedSource + Send + 'static,
        M: MetadataSource + Send + 'static,
    {
        let (stop, stop_rx) = watch::channel(false);
        let thread = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || refresh_thread(resolver, cell, interval, stop_rx))?;

        info!("refresh worker started, interval {:?}", interval);
        Ok(Worker { stop, thread: Some(thread) })
    }

    /// Ask the worker to stop and wait for its thread to exit.
    pub fn stop(&mut self) {
        self.stop.send_replace(true);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("refresh worker panicked");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn refresh_thread<F, M>(
    resolver: Resolver<F, M>,
    cell: SharedClosest,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) where
    F: FeedSource,
    M: MetadataSource,
{
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to create tokio runtime for refresh worker: {}", e);
            return;
        }
    };

    rt.block_on(async move {
        let mut ticker = tokio::time::interval(interval);
        // a cycle that overruns the period drops the ticks it missed
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = stop.wait_for(|stopped| *stopped) => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = stop.wait_for(|stopped| *stopped) => {
                    debug!("abandoning in-flight refresh cycle");
                    break;
                }
                result = resolver.refresh(&cell) => {
                    match result {
                        Err(e) if e.is_timeout() => warn!("feed timed out, keeping previous state: {}", e),
                        Err(e) => warn!("refresh skipped, keeping previous state: {}", e),
                        Ok(()) => {}
                    }
                }
            }
        }
    });

    info!("refresh worker stopped");
}
