//! Call stack capture levels.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Token spelling of [`CaptureLevel::None`].
pub const NO_CALL_STACK: &str = "$nocs";
/// Token spelling of [`CaptureLevel::Caller`].
pub const ONLY_FUNC_INFO: &str = "$onlyfunc";
/// Token spelling of [`CaptureLevel::Full`].
pub const FULL_CALL_STACK: &str = "$fullcs";

/// How much of the call stack an error records when it is first annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CaptureLevel {
    /// Record nothing. The call stack is still marked as resolved.
    None,
    /// Record the single frame that called into the library.
    #[default]
    Caller,
    /// Record every frame from the caller outward.
    Full,
}

impl CaptureLevel {
    /// The token form used in metadata (`$cslevel`) and by
    /// [`parse_tokens`](crate::parse_tokens).
    pub const fn token(self) -> &'static str {
        match self {
            CaptureLevel::None => NO_CALL_STACK,
            CaptureLevel::Caller => ONLY_FUNC_INFO,
            CaptureLevel::Full => FULL_CALL_STACK,
        }
    }

    /// Recognize one of the three level tokens. Anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            NO_CALL_STACK => Some(CaptureLevel::None),
            ONLY_FUNC_INFO => Some(CaptureLevel::Caller),
            FULL_CALL_STACK => Some(CaptureLevel::Full),
            _ => None,
        }
    }
}

impl fmt::Display for CaptureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Failure to read a [`CaptureLevel`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLevelError {
    #[error("empty call stack level")]
    Empty,
    #[error("unknown call stack level `{0}` (expected none, caller or full)")]
    Unknown(String),
}

impl FromStr for CaptureLevel {
    type Err = ParseLevelError;

    /// Accepts the token spellings as well as the friendlier names used in
    /// environment configuration (`none`, `caller`, `full`, and `0`-`2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseLevelError::Empty);
        }
        if let Some(level) = CaptureLevel::from_token(s) {
            return Ok(level);
        }
        match s.to_lowercase().as_str() {
            "none" | "off" | "nocs" | "0" => Ok(CaptureLevel::None),
            "caller" | "func" | "onlyfunc" | "1" => Ok(CaptureLevel::Caller),
            "full" | "stack" | "fullcs" | "2" => Ok(CaptureLevel::Full),
            _ => Err(ParseLevelError::Unknown(s.to_string())),
        }
    }
}
