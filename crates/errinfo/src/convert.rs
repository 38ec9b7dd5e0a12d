use std::error::Error;
use std::io;

use crate::annotation::Annotation;
use crate::error::{AnnotatedError, AnyError, BoxError};

// ── Classification ────────────────────────────────────────────────

/// Is `err` (or the identity inside it) a `T` equal to `candidate`?
///
/// ```
/// use errinfo::{compare_type, Annotation, AnyError, CaptureLevel, Sentinel};
///
/// const ERR_GONE: Sentinel = Sentinel::new("gone", 404);
/// const ERR_BUSY: Sentinel = Sentinel::new("busy", 503);
///
/// let wrapped = errinfo::new(ERR_GONE, [Annotation::Level(CaptureLevel::None)]);
/// assert!(compare_type(&wrapped.into(), &ERR_GONE));
/// assert!(!compare_type(&AnyError::plain(ERR_BUSY), &ERR_GONE));
/// ```
pub fn compare_type<T>(err: &AnyError, candidate: &T) -> bool
where
    T: Error + PartialEq + 'static,
{
    match err {
        AnyError::Annotated(e) => e.is(candidate),
        AnyError::Plain(e) => e.downcast_ref::<T>().is_some_and(|e| e == candidate),
    }
}

/// The stock not-exist predicate: an `io::Error` of kind `NotFound`, or an
/// [`AnnotatedError`] whose identity is one.
pub fn io_not_found(err: &(dyn Error + 'static)) -> bool {
    if let Some(io_err) = err.downcast_ref::<io::Error>() {
        return io_err.kind() == io::ErrorKind::NotFound;
    }
    if let Some(annotated) = err.downcast_ref::<AnnotatedError>() {
        return annotated.is_not_exist();
    }
    false
}

/// Does `err` mean "not found"? Looks at the identity of an annotated
/// error, or at a plain error directly.
pub fn is_not_exist(err: &AnyError) -> bool {
    is_not_exist_with(err, io_not_found)
}

/// [`is_not_exist`] with a host-supplied predicate.
pub fn is_not_exist_with<P>(err: &AnyError, predicate: P) -> bool
where
    P: Fn(&(dyn Error + 'static)) -> bool,
{
    match err {
        AnyError::Annotated(e) => predicate(e.identity()),
        AnyError::Plain(e) => predicate(&**e),
    }
}

// ── io::Error ─────────────────────────────────────────────────────

impl From<io::Error> for AnyError {
    fn from(err: io::Error) -> Self {
        AnyError::plain(err)
    }
}

impl From<AnnotatedError> for io::Error {
    /// Keeps `NotFound` recognizable; everything else becomes `Other`.
    fn from(err: AnnotatedError) -> Self {
        let kind = if err.is_not_exist() {
            io::ErrorKind::NotFound
        } else {
            io::ErrorKind::Other
        };
        io::Error::new(kind, err)
    }
}

// ── ResultExt ─────────────────────────────────────────────────────

/// Annotate the error of a `Result` while it propagates.
///
/// ```ignore
/// use errinfo::{Annotation, ResultExt};
///
/// let raw = std::fs::read(path).add_info([Annotation::info("path", path)])?;
/// let cfg = parse(&raw).annotate(ERR_CONFIG, [Annotation::info("path", path)])?;
/// ```
pub trait ResultExt<T> {
    /// [`add_info`](crate::add_info) on the error.
    fn add_info<I>(self, annotations: I) -> Result<T, AnnotatedError>
    where
        I: IntoIterator<Item = Annotation>;

    /// Wrap the error under a new identity, keeping it as the inner error.
    fn annotate<Id, I>(self, identity: Id, annotations: I) -> Result<T, AnnotatedError>
    where
        Id: Into<BoxError>,
        I: IntoIterator<Item = Annotation>;
}

// `match` rather than `map_err`: a closure frame from core would sit
// between the caller and the capture.
impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AnyError>,
{
    fn add_info<I>(self, annotations: I) -> Result<T, AnnotatedError>
    where
        I: IntoIterator<Item = Annotation>,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(crate::settings::add_info(e, annotations)),
        }
    }

    fn annotate<Id, I>(self, identity: Id, annotations: I) -> Result<T, AnnotatedError>
    where
        Id: Into<BoxError>,
        I: IntoIterator<Item = Annotation>,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => {
                let inner: AnyError = e.into();
                Err(crate::settings::embed(identity, inner.into_boxed(), annotations))
            }
        }
    }
}
