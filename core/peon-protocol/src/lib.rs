//! Event record and state-file types for peon-pet.
//!
//! This crate is shared by the poller and the core to prevent schema drift.
//! Hooks own the on-disk file; the poller only reads it, and anything it cannot
//! parse becomes "no new record this tick" rather than a half-built record.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_STATE_BYTES: usize = 1024 * 1024; // 1MB
pub const MAX_EVENT_NAME_LEN: usize = 128;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// The most recent hook event, as written by the hook script.
///
/// `session_id` is not validated here: a record with a bogus id still drives
/// an animation, it just never reaches the session roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

impl EventRecord {
    pub fn new(timestamp: u64, event: &str, session_id: Option<&str>) -> Self {
        Self {
            timestamp: Some(timestamp),
            event: event.to_string(),
            session_id: session_id.map(str::to_string),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(cwd.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), ErrorInfo> {
        match self.timestamp {
            None | Some(0) => {
                return Err(ErrorInfo::new(
                    "invalid_timestamp",
                    "timestamp is required",
                ))
            }
            Some(_) => {}
        }

        if self.event.trim().is_empty() {
            return Err(ErrorInfo::new("missing_field", "event is required"));
        }
        if self.event.len() > MAX_EVENT_NAME_LEN {
            return Err(ErrorInfo::new(
                "invalid_event",
                format!("event must be {} characters or fewer", MAX_EVENT_NAME_LEN),
            ));
        }

        Ok(())
    }
}

/// On-disk layout of the hook state file. Unknown keys are ignored so the
/// hook side can grow without breaking the reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default, alias = "last_active")]
    pub last_event: Option<EventRecord>,
}

/// Parses a state-file snapshot into its last event record.
///
/// Empty or whitespace-only input is a file caught mid-write and yields
/// `Ok(None)`.
pub fn parse_state(bytes: &[u8]) -> Result<Option<EventRecord>, ErrorInfo> {
    if bytes.len() > MAX_STATE_BYTES {
        return Err(ErrorInfo::new(
            "state_too_large",
            "state file exceeded maximum size",
        ));
    }

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(None);
    }

    let state: StateFile = serde_json::from_slice(bytes).map_err(|err| {
        ErrorInfo::new(
            "invalid_json",
            format!("state file was not valid JSON: {}", err),
        )
    })?;

    match state.last_event {
        Some(record) => {
            record.validate()?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

/// Parses one line of a JSONL event log (one bare record per line).
pub fn parse_record_line(line: &str) -> Result<EventRecord, ErrorInfo> {
    let record: EventRecord = serde_json::from_str(line).map_err(|err| {
        ErrorInfo::new(
            "invalid_json",
            format!("event line was not valid JSON: {}", err),
        )
    })?;
    record.validate()?;
    Ok(record)
}
