//! Record identifier generation
//!
//! Identifiers join a report row to its downloaded image, so they must be
//! unique within a run. The generator is injected into the engine so tests
//! can use predictable values.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Alphabet without visually ambiguous characters (no 0, 1, I, O, l)
const ALPHABET: &[u8; 57] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of a 128-bit value encoded in base 57
const SHORT_ID_LEN: usize = 22;

/// Source of fresh record identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random identifiers: a v4 UUID encoded as 22 base57 characters
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortUuidGenerator;

impl ShortUuidGenerator {
    /// Encode a 128-bit value, most significant digit first, zero padded
    pub fn encode(value: u128) -> String {
        let base = ALPHABET.len() as u128;
        let mut digits = [ALPHABET[0]; SHORT_ID_LEN];
        let mut n = value;

        for slot in digits.iter_mut().rev() {
            *slot = ALPHABET[(n % base) as usize];
            n /= base;
        }

        digits.iter().map(|&b| b as char).collect()
    }
}

impl IdGenerator for ShortUuidGenerator {
    fn next_id(&self) -> String {
        Self::encode(Uuid::new_v4().as_u128())
    }
}

/// Predictable identifiers: `{prefix}{n}` counting up from 1
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{n}", self.prefix)
    }
}
