use std::error::Error;

/// A named, numbered error value meant to be compared against.
///
/// Sentinels are the usual identity for an [`AnnotatedError`]: code that
/// receives the error asks "is this `ERR_NOT_READY`?" through
/// [`compare_type`] or [`AnnotatedError::is`] without unwrapping anything.
///
/// Equality is by `code` only. The `name` is what gets rendered.
///
/// [`AnnotatedError`]: crate::AnnotatedError
/// [`AnnotatedError::is`]: crate::AnnotatedError::is
/// [`compare_type`]: crate::compare_type
#[derive(Clone, Copy)]
pub struct Sentinel {
    pub name: &'static str,
    pub code: u64,
}

impl Sentinel {
    /// Construct a new sentinel.
    ///
    /// ```
    /// use errinfo::Sentinel;
    /// const ERR_NOT_READY: Sentinel = Sentinel::new("not ready", 1001);
    /// assert_eq!(ERR_NOT_READY.to_string(), "not ready");
    /// ```
    pub const fn new(name: &'static str, code: u64) -> Self {
        Self { name, code }
    }
}

/// Identity used by the assert constructors unless the installed
/// [`Settings`](crate::Settings) name a different one.
pub const ERR_ASSERT: Sentinel = Sentinel::new("assertion failed", 1);

impl PartialEq for Sentinel {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Sentinel {}

impl core::hash::Hash for Sentinel {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl core::fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({})", self.name, self.code)
    }
}

impl core::fmt::Display for Sentinel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

impl Error for Sentinel {}

#[cfg(test)]
mod tests {
    use super::*;

    const ERR_TIMEOUT: Sentinel = Sentinel::new("timeout", 42);

    #[test]
    fn equality_by_code() {
        let a = Sentinel::new("alpha", 10);
        let b = Sentinel::new("beta", 10);
        assert_eq!(a, b); // same code = equal, names don't matter
    }

    #[test]
    fn inequality() {
        let a = Sentinel::new("alpha", 10);
        let b = Sentinel::new("alpha", 11);
        assert_ne!(a, b);
    }

    #[test]
    fn const_construction() {
        assert_eq!(ERR_TIMEOUT.code, 42);
        assert_eq!(ERR_ASSERT.code, 1);
    }

    #[test]
    fn display_shows_name() {
        assert_eq!(ERR_TIMEOUT.to_string(), "timeout");
        assert_eq!(ERR_ASSERT.to_string(), "assertion failed");
    }

    #[test]
    fn debug_shows_both() {
        assert_eq!(format!("{:?}", ERR_TIMEOUT), "timeout(42)");
    }

    #[test]
    fn boxes_as_error() {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(ERR_TIMEOUT);
        assert_eq!(boxed.downcast_ref::<Sentinel>(), Some(&ERR_TIMEOUT));
    }
}
