//! Explicit response cache
//!
//! A bounded cache the caller constructs and hands to the client; never a
//! process-wide global. Eviction is explicit: oldest entry out when the
//! cache is full, plus optional age-based staleness.

use crate::client::executor::Response;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// A cached response with its storage timestamp
#[derive(Debug, Clone)]
struct CachedResponse {
    response: Response,
    stored_at: Instant,
}

/// Bounded URL-keyed response cache with insertion-order eviction
#[derive(Debug)]
pub struct ResponseCache {
    capacity: usize,
    max_age: Option<Duration>,
    entries: HashMap<String, CachedResponse>,
    order: VecDeque<String>,
}

impl ResponseCache {
    /// Creates a cache holding at most `capacity` responses
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            max_age: None,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Treats entries older than `max_age` as absent
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Looks up a fresh cached response for the URL
    ///
    /// A stale entry is removed on lookup rather than returned.
    pub fn get(&mut self, url: &str) -> Option<&Response> {
        if let Some(max_age) = self.max_age {
            let stale = self
                .entries
                .get(url)
                .map(|entry| entry.stored_at.elapsed() > max_age)
                .unwrap_or(false);
            if stale {
                self.remove(url);
                return None;
            }
        }

        self.entries.get(url).map(|entry| &entry.response)
    }

    /// Stores a response, evicting the oldest entry when full
    pub fn insert(&mut self, url: String, response: Response) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.contains_key(&url) {
            self.order.retain(|u| u != &url);
        } else if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.order.push_back(url.clone());
        self.entries.insert(
            url,
            CachedResponse {
                response,
                stored_at: Instant::now(),
            },
        );
    }

    fn remove(&mut self, url: &str) {
        self.entries.remove(url);
        self.order.retain(|u| u != url);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
