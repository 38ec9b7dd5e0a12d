use std::error::Error;
use std::fmt;
use std::sync::Arc;

use log::trace;

use crate::annotation::Annotation;
use crate::capture::format_stack;
use crate::level::CaptureLevel;
use crate::metadata::Metadata;
use crate::settings::{current_settings, Settings};

/// Any error, boxed.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error annotated with where it happened.
///
/// Three parts:
///
/// - **identity**: what the error *is*. Classification
///   ([`is`](Self::is), [`compare_type`](crate::compare_type),
///   [`is_not_exist`](crate::is_not_exist)) looks only at this.
/// - **metadata**: key/value context plus the recorded call stack.
/// - **inner**: an optional cause, reported through [`Error::source`] and
///   rendered last. Never used for classification.
///
/// The call stack is captured once, the first time the error is built or
/// annotated. Later annotation adds metadata but leaves the call stack
/// alone, so it always points at the origin.
///
/// `Display` delegates to the renderer of the [`Settings`] the error was
/// created under.
pub struct AnnotatedError {
    identity: BoxError,
    inner: Option<BoxError>,
    metadata: Metadata,
    settings: Arc<Settings>,
}

// ── Constructors ──────────────────────────────────────────────────

impl AnnotatedError {
    pub(crate) fn build(
        settings: Arc<Settings>,
        identity: BoxError,
        inner: Option<BoxError>,
        annotations: impl IntoIterator<Item = Annotation>,
        forced: Option<CaptureLevel>,
    ) -> Self {
        let mut err = Self {
            identity,
            inner,
            metadata: Metadata::new(),
            settings,
        };
        err.metadata.extend(annotations);
        if let Some(level) = forced {
            err.metadata.set_level(level);
        }
        let settings = Arc::clone(&err.settings);
        err.capture(&settings);
        err
    }

    /// Wrap `identity` using the installed settings.
    ///
    /// ```
    /// use errinfo::{AnnotatedError, Annotation, CaptureLevel, Sentinel};
    ///
    /// const ERR_BUSY: Sentinel = Sentinel::new("busy", 1002);
    ///
    /// let err = AnnotatedError::new(ERR_BUSY, [
    ///     Annotation::info("queue", "ingest"),
    ///     CaptureLevel::None.into(),
    /// ]);
    /// assert!(err.is(&ERR_BUSY));
    /// assert_eq!(err.to_string(), "busy, queue: ingest");
    /// ```
    pub fn new<E>(identity: E, annotations: impl IntoIterator<Item = Annotation>) -> Self
    where
        E: Into<BoxError>,
    {
        crate::settings::new(identity, annotations)
    }

    /// An assertion failure with a full call stack.
    pub fn assert(annotations: impl IntoIterator<Item = Annotation>) -> Self {
        crate::settings::new_assert(annotations)
    }

    /// Wrap `identity`, keeping `inner` as the cause.
    pub fn embed<E, I>(identity: E, inner: I, annotations: impl IntoIterator<Item = Annotation>) -> Self
    where
        E: Into<BoxError>,
        I: Into<BoxError>,
    {
        crate::settings::embed(identity, inner, annotations)
    }

    /// An assertion failure caused by `inner`.
    pub fn assert_embed<I>(inner: I, annotations: impl IntoIterator<Item = Annotation>) -> Self
    where
        I: Into<BoxError>,
    {
        crate::settings::assert_embed(inner, annotations)
    }
}

// ── Annotation ────────────────────────────────────────────────────

impl AnnotatedError {
    /// Append annotations. A call stack is captured only if none is
    /// recorded yet, using the installed default level.
    pub fn add_info(&mut self, annotations: impl IntoIterator<Item = Annotation>) -> &mut Self {
        self.annotate(annotations, &current_settings());
        self
    }

    /// Owned form of [`add_info`](Self::add_info), for chaining.
    pub fn info(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.annotate(annotations, &current_settings());
        self
    }

    /// Capture at `level` unless a call stack is already recorded.
    pub fn add_call_stack(&mut self, level: CaptureLevel) -> &mut Self {
        let settings = Arc::clone(&self.settings);
        self.resolve_call_stack(level, &settings);
        self
    }

    pub(crate) fn annotate(&mut self, annotations: impl IntoIterator<Item = Annotation>, settings: &Settings) {
        self.metadata.extend(annotations);
        self.capture(settings);
    }

    fn capture(&mut self, settings: &Settings) {
        let level = self.metadata.level().unwrap_or(settings.default_level());
        self.resolve_call_stack(level, settings);
    }

    fn resolve_call_stack(&mut self, level: CaptureLevel, settings: &Settings) {
        if self.metadata.call_stack().is_some() {
            return;
        }
        let walker = settings.walker();
        let call_stack = match level {
            CaptureLevel::None => String::new(),
            CaptureLevel::Caller => walker
                .caller(settings.skip())
                .map(|frame| frame.to_string())
                .unwrap_or_default(),
            CaptureLevel::Full => format_stack(&walker.stack(settings.skip())),
        };
        trace!("captured call stack at {} ({} bytes)", level, call_stack.len());
        self.metadata.record_call_stack(call_stack);
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl AnnotatedError {
    pub fn identity(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.identity
    }

    pub fn inner(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.inner.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The recorded call stack; `Some("")` when capture was turned off.
    pub fn call_stack(&self) -> Option<&str> {
        self.metadata.call_stack()
    }

    /// Is the identity a `T` equal to `candidate`?
    pub fn is<T>(&self, candidate: &T) -> bool
    where
        T: Error + PartialEq + 'static,
    {
        self.identity
            .downcast_ref::<T>()
            .is_some_and(|identity| identity == candidate)
    }

    /// Does the identity mean "not found"? See [`io_not_found`](crate::io_not_found).
    pub fn is_not_exist(&self) -> bool {
        crate::convert::io_not_found(&*self.identity)
    }

    pub fn into_identity(self) -> BoxError {
        self.identity
    }

    /// Split into `(identity, metadata, inner)`.
    pub fn into_parts(self) -> (BoxError, Metadata, Option<BoxError>) {
        (self.identity, self.metadata, self.inner)
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for AnnotatedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

// ── Display ───────────────────────────────────────────────────────

impl fmt::Display for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static));
        f.write_str(&self.settings.renderer().render(&*self.identity, &self.metadata, inner))
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedError")
            .field("identity", &self.identity)
            .field("metadata", &self.metadata)
            .field("inner", &self.inner)
            .finish()
    }
}

// ── AnyError ──────────────────────────────────────────────────────

/// Either an [`AnnotatedError`] or any other error.
///
/// This is what [`add_info`](crate::add_info), [`compare_type`](crate::compare_type)
/// and [`is_not_exist`](crate::is_not_exist) take, so annotated and plain
/// errors are told apart by matching, not by downcasting.
#[derive(Debug)]
pub enum AnyError {
    Annotated(AnnotatedError),
    Plain(BoxError),
}

impl AnyError {
    pub fn plain<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        AnyError::Plain(Box::new(err))
    }

    pub fn as_annotated(&self) -> Option<&AnnotatedError> {
        match self {
            AnyError::Annotated(e) => Some(e),
            AnyError::Plain(_) => None,
        }
    }

    /// The identity of an annotated error, or the plain error itself.
    pub fn identity(&self) -> &(dyn Error + Send + Sync + 'static) {
        match self {
            AnyError::Annotated(e) => e.identity(),
            AnyError::Plain(e) => &**e,
        }
    }

    pub fn into_boxed(self) -> BoxError {
        match self {
            AnyError::Annotated(e) => Box::new(e),
            AnyError::Plain(e) => e,
        }
    }
}

impl From<AnnotatedError> for AnyError {
    fn from(err: AnnotatedError) -> Self {
        AnyError::Annotated(err)
    }
}

impl From<BoxError> for AnyError {
    fn from(err: BoxError) -> Self {
        AnyError::Plain(err)
    }
}

impl From<crate::Sentinel> for AnyError {
    fn from(err: crate::Sentinel) -> Self {
        AnyError::plain(err)
    }
}

impl From<&str> for AnyError {
    fn from(msg: &str) -> Self {
        AnyError::Plain(msg.into())
    }
}

impl From<String> for AnyError {
    fn from(msg: String) -> Self {
        AnyError::Plain(msg.into())
    }
}

impl fmt::Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyError::Annotated(e) => fmt::Display::fmt(e, f),
            AnyError::Plain(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Error for AnyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AnyError::Annotated(e) => e.source(),
            AnyError::Plain(e) => e.source(),
        }
    }
}
