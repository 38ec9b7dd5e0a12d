use crate::level::CaptureLevel;
use crate::metadata::MORE_INFO;

/// One piece of context attached to an [`AnnotatedError`](crate::AnnotatedError).
///
/// Annotations are applied left to right. A later `Info` for the same key
/// replaces an earlier one; a `Level` replaces any level already recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Info { key: String, value: String },
    Level(CaptureLevel),
}

impl Annotation {
    pub fn info(key: impl Into<String>, value: impl Into<String>) -> Self {
        Annotation::Info {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Free text rendered right after the identity's own message.
    pub fn more_info(value: impl Into<String>) -> Self {
        Annotation::info(MORE_INFO, value)
    }
}

impl From<CaptureLevel> for Annotation {
    fn from(level: CaptureLevel) -> Self {
        Annotation::Level(level)
    }
}

impl<K, V> From<(K, V)> for Annotation
where
    K: Into<String>,
    V: Into<String>,
{
    fn from((key, value): (K, V)) -> Self {
        Annotation::info(key, value)
    }
}

/// Read a flat list of string tokens as annotations.
///
/// Tokens pair up as `key, value`, except the three level tokens (`$nocs`,
/// `$onlyfunc`, `$fullcs`) which stand alone and take a single slot. A key
/// left without a value at the end of the list gets `""`.
///
/// ```
/// use errinfo::{parse_tokens, Annotation, CaptureLevel};
///
/// let parsed = parse_tokens(&["k1", "v1", "$fullcs", "k2", "v2", "last"]);
/// assert_eq!(parsed, vec![
///     Annotation::info("k1", "v1"),
///     Annotation::Level(CaptureLevel::Full),
///     Annotation::info("k2", "v2"),
///     Annotation::info("last", ""),
/// ]);
/// ```
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<Annotation> {
    let mut out = Vec::with_capacity(tokens.len() / 2 + 1);
    let mut iter = tokens.iter().map(AsRef::as_ref);
    while let Some(token) = iter.next() {
        if let Some(level) = CaptureLevel::from_token(token) {
            out.push(Annotation::Level(level));
            continue;
        }
        let value = iter.next().unwrap_or("");
        out.push(Annotation::info(token, value));
    }
    out
}
