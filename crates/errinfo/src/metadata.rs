use std::collections::BTreeMap;
use std::fmt;

use log::{trace, warn};

use crate::annotation::Annotation;
use crate::level::CaptureLevel;

/// Keys starting with this character are internal and never rendered as
/// user `key: value` pairs.
pub const RESERVED_PREFIX: char = '$';

/// Requested capture level for this error.
pub const CS_LEVEL: &str = "$cslevel";
/// The captured caller location or stack trace.
pub const CALL_STACK: &str = "$callstack";
/// Free text rendered right after the identity's message.
pub const MORE_INFO: &str = "$moreinfo";

/// Is `key` internal (starts with [`RESERVED_PREFIX`])?
#[inline]
pub fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// The "where" of an error: key/value context plus the three reserved
/// entries, which are kept as typed fields.
///
/// User pairs are kept sorted by key, so rendering is deterministic.
///
/// The call stack is written at most once. After that every attempt to set
/// it, captured or explicit, is ignored.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
    level: Option<CaptureLevel>,
    call_stack: Option<String>,
    more_info: Option<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one annotation.
    pub fn apply(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::Info { key, value } => self.insert(key, value),
            Annotation::Level(level) => self.level = Some(level),
        }
    }

    /// Set `key` to `value`, routing the reserved keys to their fields.
    ///
    /// An unparsable `$cslevel` is logged and dropped.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            CS_LEVEL => match value.parse::<CaptureLevel>() {
                Ok(level) => self.level = Some(level),
                Err(err) => warn!("ignoring {CS_LEVEL} annotation: {err}"),
            },
            MORE_INFO => self.more_info = Some(value),
            CALL_STACK => {
                self.record_call_stack(value);
            }
            _ => {
                self.entries.insert(key, value);
            }
        }
    }

    /// Look up any key, reserved ones included.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            CS_LEVEL => self.level.map(CaptureLevel::token),
            CALL_STACK => self.call_stack.as_deref(),
            MORE_INFO => self.more_info.as_deref(),
            _ => self.entries.get(key).map(String::as_str),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn level(&self) -> Option<CaptureLevel> {
        self.level
    }

    /// The recorded call stack. `Some("")` means "resolved, nothing captured".
    pub fn call_stack(&self) -> Option<&str> {
        self.call_stack.as_deref()
    }

    pub fn more_info(&self) -> Option<&str> {
        self.more_info.as_deref()
    }

    /// Non-reserved pairs, sorted by key.
    pub fn user_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(k, _)| !is_reserved(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every entry, reserved ones first, then the rest sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let reserved = [
            (CS_LEVEL, self.level.map(CaptureLevel::token)),
            (CALL_STACK, self.call_stack.as_deref()),
            (MORE_INFO, self.more_info.as_deref()),
        ];
        reserved
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .chain(self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn set_level(&mut self, level: CaptureLevel) {
        self.level = Some(level);
    }

    /// Store `call_stack` unless one is already recorded. Returns whether
    /// it was stored.
    pub(crate) fn record_call_stack(&mut self, call_stack: String) -> bool {
        if self.call_stack.is_some() {
            trace!("call stack already recorded, keeping the first one");
            return false;
        }
        self.call_stack = Some(call_stack);
        true
    }
}

impl Extend<Annotation> for Metadata {
    fn extend<I: IntoIterator<Item = Annotation>>(&mut self, iter: I) {
        for annotation in iter {
            self.apply(annotation);
        }
    }
}

impl FromIterator<Annotation> for Metadata {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        metadata.extend(iter);
        metadata
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::parse_tokens;

    #[test]
    fn level_token_becomes_cslevel() {
        let meta: Metadata = parse_tokens(&["k1", "v1", "$fullcs", "k2", "v2"])
            .into_iter()
            .collect();
        assert_eq!(meta.get("k1"), Some("v1"));
        assert_eq!(meta.get("k2"), Some("v2"));
        assert_eq!(meta.get(CS_LEVEL), Some("$fullcs"));
        assert_eq!(meta.len(), 3);
    }

    #[test]
    fn dangling_key() {
        let meta: Metadata = parse_tokens(&["onlykey"]).into_iter().collect();
        assert_eq!(meta.get("onlykey"), Some(""));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn last_write_wins() {
        let meta: Metadata = parse_tokens(&["k", "1", "k", "2", "$nocs", "$fullcs"])
            .into_iter()
            .collect();
        assert_eq!(meta.get("k"), Some("2"));
        assert_eq!(meta.level(), Some(CaptureLevel::Full));
    }

    #[test]
    fn call_stack_written_once() {
        let mut meta = Metadata::new();
        assert!(meta.record_call_stack(String::new()));
        assert!(!meta.record_call_stack("main.rs:1:main".to_string()));
        meta.insert(CALL_STACK, "explicit");
        assert_eq!(meta.call_stack(), Some(""));
    }

    #[test]
    fn explicit_call_stack_before_capture() {
        let mut meta = Metadata::new();
        meta.insert(CALL_STACK, "somewhere.rs:9:f");
        assert!(!meta.record_call_stack("captured".to_string()));
        assert_eq!(meta.call_stack(), Some("somewhere.rs:9:f"));
    }

    #[test]
    fn cslevel_as_pair() {
        let mut meta = Metadata::new();
        meta.insert(CS_LEVEL, "$nocs");
        assert_eq!(meta.level(), Some(CaptureLevel::None));
        meta.insert(CS_LEVEL, "loud");
        assert_eq!(meta.level(), Some(CaptureLevel::None));
    }

    #[test]
    fn user_entries_skip_reserved() {
        let mut meta = Metadata::new();
        meta.insert("zeta", "z");
        meta.insert("alpha", "a");
        meta.insert("$private", "hidden");
        meta.insert(MORE_INFO, "detail");
        let user: Vec<_> = meta.user_entries().collect();
        assert_eq!(user, vec![("alpha", "a"), ("zeta", "z")]);
        assert_eq!(meta.get("$private"), Some("hidden"));
        assert_eq!(meta.more_info(), Some("detail"));
    }

    #[test]
    fn debug_lists_everything() {
        let mut meta = Metadata::new();
        meta.insert("k", "v");
        meta.set_level(CaptureLevel::Caller);
        let s = format!("{:?}", meta);
        assert_eq!(s, r#"{"$cslevel": "$onlyfunc", "k": "v"}"#);
    }

    #[test]
    fn empty_by_default() {
        let meta = Metadata::new();
        assert!(meta.is_empty());
        assert!(!meta.contains_key(CALL_STACK));
    }
}
