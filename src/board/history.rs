//! # Guess History
//!
//! A fixed-capacity, most-recent-first list of past guesses. Pushing onto a full
//! history evicts the oldest entry, so memory stays bounded however long a session
//! runs. History lives only as long as its owner; nothing is persisted.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Number of guesses kept for display.
pub const HISTORY_CAPACITY: usize = 10;

/// One displayed outcome of a relay call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessResult {
    pub guess: String,
    pub timestamp: DateTime<Local>,
    /// Display name of the profile that produced the guess, when the relay reported one
    pub model: Option<String>,
}

impl GuessResult {
    pub fn new(guess: impl Into<String>, model: Option<String>) -> Self {
        Self {
            guess: guess.into(),
            timestamp: Local::now(),
            model,
        }
    }
}

/// Bounded, insertion-ordered guess list.
#[derive(Debug, Clone)]
pub struct GuessHistory {
    entries: VecDeque<GuessResult>,
    capacity: usize,
}

impl Default for GuessHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl GuessHistory {
    /// Creates an empty history holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds `result` as the most recent entry, evicting the oldest when full.
    ///
    /// Time complexity: O(1).
    pub fn push(&mut self, result: GuessResult) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(result);
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &GuessResult> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&GuessResult> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
