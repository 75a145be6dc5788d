//! RC-041: Page cache — route key to rendered body with an explicit TTL.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

struct Entry {
    body: String,
    expires: Instant,
}

#[derive(Default)]
struct Pages {
    entries: FxHashMap<String, Entry>,
    /// Bumped by every `clear`; a render that started before a clear is not stored.
    generation: u64,
}

/// Rendered pages keyed by route. A zero TTL disables caching.
pub struct PageCache {
    ttl: Duration,
    pages: Mutex<Pages>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pages: Mutex::new(Pages::default()),
        }
    }

    /// Cached body for `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut pages = self.pages.lock();
        match pages.entries.get(key) {
            Some(entry) if now < entry.expires => Some(entry.body.clone()),
            Some(_) => {
                pages.entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: &str, body: String) {
        self.insert_at(key, body, Instant::now());
    }

    fn insert_at(&self, key: &str, body: String, now: Instant) {
        let generation = self.pages.lock().generation;
        self.insert_if_current(key, body, now, generation);
    }

    /// Store `body` only if no `clear` happened since `generation` was read.
    fn insert_if_current(&self, key: &str, body: String, now: Instant, generation: u64) {
        if self.ttl.is_zero() {
            return;
        }
        let mut pages = self.pages.lock();
        if pages.generation != generation {
            return;
        }
        pages.entries.insert(
            key.to_string(),
            Entry {
                body,
                expires: now + self.ttl,
            },
        );
    }

    /// Cached body, or render, store, and return a fresh one. A body whose
    /// render overlapped a `clear` is returned but not stored.
    pub fn get_or_insert_with<F>(&self, key: &str, render: F) -> String
    where
        F: FnOnce() -> String,
    {
        let generation = self.pages.lock().generation;
        if let Some(body) = self.get(key) {
            return body;
        }
        let body = render();
        self.insert_if_current(key, body.clone(), Instant::now(), generation);
        body
    }

    /// Drop every entry (after the table changes).
    pub fn clear(&self) {
        let mut pages = self.pages.lock();
        pages.entries.clear();
        pages.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.pages.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
