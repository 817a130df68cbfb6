//! Compiled regex patterns.
//!
//! Compiled once on first use and reused for every incoming event.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical 8-4-4-4-12 UUID layout, any hex case.
pub static RE_SESSION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});
