use std::{collections::HashMap, sync::Arc};

use crossbeam::atomic::AtomicCell;
use dashmap::DashMap;
use futures_util::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::Config;

use super::{last_non_empty_line, BoxedToolRunner, ResolveError, ToolRunner};

/// A resolution that callers for the same media identifier wait on together.
type Flight = Shared<BoxFuture<'static, Result<String, ResolveError>>>;

/// A direct URL obtained from the resolution tool.
#[derive(Debug, Clone)]
pub struct ResolvedStreamEntry {
    pub url: String,
    pub expires_at: Instant,
    /// Consecutive upstream failures observed while streaming from `url`
    failures: u32,
}

impl ResolvedStreamEntry {
    fn new(url: String, expires_at: Instant) -> Self {
        Self {
            url,
            expires_at,
            failures: 0,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Maps media identifiers to short-lived direct URLs.
///
/// On a miss the external tool is invoked once, no matter how many callers are asking
/// for the same identifier at the same time. Successful results are kept for the
/// configured TTL, failures are never cached.
pub struct ResolverCache {
    config: Config,
    tool: BoxedToolRunner,
    entries: Arc<DashMap<String, ResolvedStreamEntry>>,
    in_flight: Arc<Mutex<HashMap<String, Flight>>>,
    available: AtomicCell<bool>,
}

impl ResolverCache {
    pub fn new(config: &Config, tool: BoxedToolRunner) -> Self {
        Self {
            config: config.clone(),
            tool,
            entries: Default::default(),
            in_flight: Default::default(),
            available: AtomicCell::new(false),
        }
    }

    /// Probes the tool and marks the cache as available if it can be executed.
    pub async fn warm_up(&self) -> bool {
        let available = self.tool.probe().await;
        self.available.store(available);

        if available {
            info!("Resolution tool is ready");
        } else {
            warn!(
                "Resolution tool {} could not be executed, streams are unavailable",
                self.config.tool_path.display()
            );
        }

        available
    }

    /// Returns true once [ResolverCache::warm_up] has succeeded.
    pub fn is_available(&self) -> bool {
        self.available.load()
    }

    /// Returns the direct URL for a media identifier, resolving it if needed.
    pub async fn resolve(&self, media_id: &str) -> Result<String, ResolveError> {
        if !self.is_available() {
            return Err(ResolveError::Unavailable);
        }

        if let Some(url) = self.lookup(media_id) {
            debug!("Direct URL cache hit for {}", media_id);
            return Ok(url);
        }

        let flight = {
            let mut in_flight = self.in_flight.lock();

            // A flight may have landed between the lookup and taking the lock.
            if let Some(url) = self.lookup(media_id) {
                return Ok(url);
            }

            in_flight
                .entry(media_id.to_string())
                .or_insert_with(|| self.launch(media_id))
                .clone()
        };

        flight.await
    }

    /// Returns the cached direct URL if it has not expired.
    /// Expired entries are dropped when they are encountered.
    pub fn lookup(&self, media_id: &str) -> Option<String> {
        let now = Instant::now();

        let expired = match self.entries.get(media_id) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.url.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(media_id, |_, entry| entry.is_expired(now));
        }

        None
    }

    /// Removes the entry for a media identifier, returning true if one existed.
    pub fn evict(&self, media_id: &str) -> bool {
        let removed = self.entries.remove(media_id).is_some();

        if removed {
            info!("Evicted direct URL for {}", media_id);
        }

        removed
    }

    /// Records that streaming from the cached URL failed.
    /// The entry is evicted once the configured threshold is reached.
    pub fn report_upstream_failure(&self, media_id: &str) {
        let should_evict = match self.entries.get_mut(media_id) {
            Some(mut entry) => {
                entry.failures += 1;
                entry.failures >= self.config.upstream_failure_threshold
            }
            None => false,
        };

        if should_evict {
            self.evict(media_id);
        }
    }

    /// Records that streaming from the cached URL worked.
    pub fn report_upstream_success(&self, media_id: &str) {
        if let Some(mut entry) = self.entries.get_mut(media_id) {
            entry.failures = 0;
        }
    }

    /// Returns the amount of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawns the resolution on its own task so it completes even if every waiter goes away.
    /// The tool is given [Config::tool_timeout] to answer.
    /// Must be called with the in-flight table locked.
    fn launch(&self, media_id: &str) -> Flight {
        let media_id = media_id.to_string();
        let args = self.config.resolution_args(&media_id);
        let ttl = self.config.direct_url_ttl;
        let timeout = self.config.tool_timeout;

        let tool = self.tool.clone();
        let entries = self.entries.clone();
        let in_flight = self.in_flight.clone();

        info!("Resolving direct URL for {}", media_id);

        let task_media_id = media_id.clone();
        let task = tokio::spawn(async move {
            let media_id = task_media_id;
            // Dropping the run on expiry kills the child process.
            let run = run_resolution(tool.as_ref(), &args, &media_id);
            let result = tokio::time::timeout(timeout, run)
                .await
                .unwrap_or_else(|_| Err(ResolveError::TimedOut(media_id.clone())));

            match &result {
                Ok(url) => {
                    let entry = ResolvedStreamEntry::new(url.clone(), Instant::now() + ttl);
                    entries.insert(media_id.clone(), entry);
                }
                Err(e) => warn!("Could not resolve {}: {}", media_id, e),
            }

            // The entry is inserted before the flight is removed, so a caller always sees one of them.
            in_flight.lock().remove(&media_id);
            result
        });

        task.map(move |joined| joined.unwrap_or_else(|_| Err(ResolveError::Aborted(media_id))))
            .boxed()
            .shared()
    }
}

async fn run_resolution(
    tool: &dyn ToolRunner,
    args: &[String],
    media_id: &str,
) -> Result<String, ResolveError> {
    let output = tool.run(args).await?;

    last_non_empty_line(&output)
        .map(str::to_string)
        .ok_or_else(|| ResolveError::NoDirectUrl(media_id.to_string()))
}
