//! # Timed script interpreter module
//!
//! Scripts are plain text files where each entry is a timestamp followed by a
//! JSON payload and terminated with a semicolon:
//!
//! ```text
//! 0.0: {"left_y": 0.5, "right_y": 0.5};
//! 1.5: {"buttons": ["L1"]};
//! ```
//!
//! The interpreter is generic over the payload type so the same format can
//! carry controller inputs or any other deserialisable command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A payload which is scripted to occur at a specific time.
struct Entry<T> {
    /// The time the payload is supposed to be released at
    exec_time_s: f64,

    payload: T
}

/// A script interpreter.
///
/// After initialising with the path to the script use `.get_pending` to
/// acquire the payloads which are due.
pub struct ScriptInterpreter<T> {
    script_path: PathBuf,
    entries: VecDeque<Entry<T>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    NonMonotonicTimestamp(f64, f64),

    #[error("Script contains an invalid payload at {0} s: {1}")]
    InvalidPayload(f64, serde_json::Error)
}

/// Payloads released by a call to `get_pending`.
#[derive(Debug, PartialEq)]
pub enum Pending<T> {
    /// Nothing is due yet.
    None,
    /// These payloads are due, in script order.
    Some(Vec<T>),
    /// Every payload has been released.
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());
        
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::parse(&script)?;
        interp.script_path = path;

        Ok(interp)
    }

    /// Create a new interpreter from the text of a script.
    pub fn parse(script: &str) -> Result<Self, ScriptError> {
        let mut entries: VecDeque<Entry<T>> = VecDeque::new();

        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("script regex is valid");

        for cap in re.captures_iter(script) {
            let exec_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(prev) = entries.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::NonMonotonicTimestamp(
                        prev.exec_time_s, exec_time_s
                    ));
                }
            }

            let payload = serde_json::from_str(&cap[3])
                .map_err(|e| ScriptError::InvalidPayload(exec_time_s, e))?;

            entries.push_back(Entry {
                exec_time_s,
                payload
            });
        }

        if entries.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            script_path: PathBuf::new(),
            entries
        })
    }
}

impl<T> ScriptInterpreter<T> {
    /// Return the payloads due at `current_time_s`, measured from the start of
    /// the script's playback.
    pub fn get_pending(&mut self, current_time_s: f64) -> Pending<T> {
        if self.entries.is_empty() {
            return Pending::EndOfScript
        }

        let mut due = vec![];

        while self.entries
            .front()
            .map(|e| e.exec_time_s <= current_time_s)
            .unwrap_or(false)
        {
            if let Some(e) = self.entries.pop_front() {
                due.push(e.payload);
            }
        }

        if due.is_empty() {
            Pending::None
        }
        else {
            Pending::Some(due)
        }
    }

    /// Get the number of payloads still to be released
    pub fn get_num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.entries.back().map(|e| e.exec_time_s).unwrap_or(0f64)
    }

    /// Path the script was loaded from, empty for in-memory scripts.
    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Cmd {
        speed: f64,
    }

    #[test]
    fn test_pending_in_order() {
        let mut si: ScriptInterpreter<Cmd> = ScriptInterpreter::parse(
            "0.0: {\"speed\": 1.0};\n0.5: {\"speed\": 0.5};\n2: {\"speed\": 0.0};"
        ).unwrap();

        assert_eq!(si.get_num_entries(), 3);
        assert_eq!(si.get_duration(), 2.0);

        assert_eq!(si.get_pending(0.0), Pending::Some(vec![Cmd { speed: 1.0 }]));
        assert_eq!(si.get_pending(0.2), Pending::None);
        assert_eq!(
            si.get_pending(5.0),
            Pending::Some(vec![Cmd { speed: 0.5 }, Cmd { speed: 0.0 }])
        );
        assert_eq!(si.get_pending(6.0), Pending::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::<Cmd>::parse("nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::<Cmd>::parse("1.0: {\"speed\": \"fast\"};"),
            Err(ScriptError::InvalidPayload(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<Cmd>::parse(
                "1.0: {\"speed\": 1.0};\n0.5: {\"speed\": 1.0};"
            ),
            Err(ScriptError::NonMonotonicTimestamp(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<Cmd>::new("/does/not/exist.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
