//! The outcome message contract between a sandbox and its hosting view.
//!
//! Exactly one outcome is expected per session. In a browser embed the
//! documents deliver it via `window.parent.postMessage`; in the headless
//! engine the shim writes it as a sentinel line on stdout and this module
//! picks it back out. Both carry the same JSON shape, and the shape is
//! versioned: a sentinel from a different protocol version is dropped, not
//! misparsed.

use serde::{Deserialize, Serialize};

/// Version carried in every sentinel line. Bump when the message shape
/// changes; readers ignore versions they do not understand.
pub const PROTOCOL_VERSION: u32 = 1;

/// Prefix marking an outcome sentinel line in engine stdout.
pub const SENTINEL_PREFIX: &str = "@@preview/";

/// The single message a sandbox reports back to its hosting view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutcomeMessage {
    /// Code executed (or document loaded) without error.
    Success,
    /// Transpilation failed, or the guarded block / global handler caught a
    /// runtime throw.
    Error { error: String },
}

impl OutcomeMessage {
    /// Render this message as a sentinel line for the current protocol
    /// version.
    pub fn to_sentinel(&self) -> String {
        // Serialization of this enum cannot fail: no maps, no non-string keys.
        let json = serde_json::to_string(self).expect("outcome message serializes");
        format!("{}{} {}", SENTINEL_PREFIX, PROTOCOL_VERSION, json)
    }

    /// Parse a single stdout line as a sentinel, if it is one for the
    /// current protocol version.
    pub fn from_sentinel(line: &str) -> Option<OutcomeMessage> {
        let rest = line.trim().strip_prefix(SENTINEL_PREFIX)?;
        let (version, json) = rest.split_once(' ')?;
        if version.parse::<u32>().ok()? != PROTOCOL_VERSION {
            return None;
        }
        serde_json::from_str(json).ok()
    }
}

/// Engine stdout split into the outcome and the console lines around it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// First outcome sentinel found, if any. Later sentinels are dropped;
    /// the first terminal message is authoritative.
    pub outcome: Option<OutcomeMessage>,
    /// Non-sentinel stdout lines, in order. These feed the visible log
    /// panel for script previews.
    pub console: Vec<String>,
}

/// Separate sentinel lines from console output.
pub fn split_run_output(stdout: &str) -> RunOutput {
    let mut out = RunOutput::default();
    for line in stdout.lines() {
        match OutcomeMessage::from_sentinel(line) {
            Some(msg) => {
                if out.outcome.is_none() {
                    out.outcome = Some(msg);
                }
            }
            None => out.console.push(line.to_string()),
        }
    }
    out
}
