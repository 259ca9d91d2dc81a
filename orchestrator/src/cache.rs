// orchestrator/src/cache.rs

use gate_core::{ChatMessage, MemoryDecision};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

pub const CACHE_CAPACITY: usize = 50;
pub const CACHE_TTL: Duration = Duration::from_millis(60_000);

const KEY_MESSAGE_CHARS: usize = 50;
const KEY_CONTEXT_MESSAGES: usize = 2;
const KEY_CONTEXT_CHARS: usize = 20;

#[derive(Debug, Clone)]
struct CacheEntry {
    decision: MemoryDecision,
    timestamp: Instant,
}

/// Bounded, time-expiring decision store.
///
/// Eviction is FIFO over insertion order, not LRU: reads never refresh an entry.
/// Overwriting an existing key keeps its original position in the queue.
#[derive(Debug)]
pub struct DecisionCache {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    capacity: usize,
    ttl: Duration,
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::with_limits(CACHE_CAPACITY, CACHE_TTL)
    }

    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<MemoryDecision> {
        let expired = {
            let entry = self.entries.get(key)?;
            entry.timestamp.elapsed() > self.ttl
        };
        if expired {
            self.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.decision.clone())
    }

    pub fn put(&mut self, key: String, decision: MemoryDecision) {
        let entry = CacheEntry { decision, timestamp: Instant::now() };
        if self.entries.insert(key.clone(), entry).is_none() {
            self.order.push_back(key);
        }
        if self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

/// Lossy key: the first 50 chars of the message plus a short fingerprint of the last two turns.
pub fn cache_key(message: &str, recent_messages: &[ChatMessage]) -> String {
    let start = recent_messages.len().saturating_sub(KEY_CONTEXT_MESSAGES);
    let context: Vec<String> = recent_messages[start..]
        .iter()
        .map(|m| truncate_chars(&m.content, KEY_CONTEXT_CHARS))
        .collect();
    format!("{}|{}", truncate_chars(message, KEY_MESSAGE_CHARS), context.join("|"))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
