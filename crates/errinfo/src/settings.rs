//! The error context: which renderer, stack walker and default capture
//! level new errors use.
//!
//! A [`Settings`] value is immutable once built and shared by `Arc`. One of
//! them is installed process-wide; the free constructors ([`new`],
//! [`embed`], ...) use it. An [`Annotator`] carries its own settings for
//! code that wants to stay independent of the installed ones.
//!
//! Every error keeps the settings it was created under and renders with
//! that renderer. Installing new settings affects errors created
//! afterwards. Configure once at startup, before spawning workers.
//!
//! # Environment Variables
//!
//! Read by [`Settings::from_env`] / [`init_from_env`]:
//!
//! - `ERRINFO_CALLSTACK=<level>` - default capture level: `none`, `caller`, `full`
//! - `ERRINFO_SKIP=<n>` - extra caller frames to skip (for host-side wrappers)

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{debug, warn};
use once_cell::sync::Lazy;

use crate::annotation::Annotation;
use crate::capture::{BacktraceWalker, StackWalker};
use crate::env::{env_get, env_get_str_opt};
use crate::error::{AnnotatedError, AnyError, BoxError};
use crate::level::CaptureLevel;
use crate::render::{DefaultRenderer, Renderer};
use crate::sentinel::{Sentinel, ERR_ASSERT};

/// Environment variable holding the default capture level.
pub const ENV_CALLSTACK: &str = "ERRINFO_CALLSTACK";
/// Environment variable holding the extra frame skip count.
pub const ENV_SKIP: &str = "ERRINFO_SKIP";

/// Configuration shared by the errors an [`Annotator`] creates.
#[derive(Clone)]
pub struct Settings {
    renderer: Arc<dyn Renderer>,
    walker: Arc<dyn StackWalker>,
    default_level: CaptureLevel,
    assert_identity: Sentinel,
    skip: usize,
}

impl Settings {
    /// Defaults overridden by `ERRINFO_CALLSTACK` and `ERRINFO_SKIP`.
    ///
    /// Unrecognized values are logged and ignored.
    pub fn from_env() -> Self {
        let mut settings = Settings::default();
        if let Some(raw) = env_get_str_opt(ENV_CALLSTACK) {
            match raw.parse::<CaptureLevel>() {
                Ok(level) => settings.default_level = level,
                Err(err) => warn!("{ENV_CALLSTACK}: {err}, keeping {}", settings.default_level),
            }
        }
        settings.skip = env_get(ENV_SKIP, 0);
        settings
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn with_walker(mut self, walker: impl StackWalker + 'static) -> Self {
        self.walker = Arc::new(walker);
        self
    }

    pub fn with_default_level(mut self, level: CaptureLevel) -> Self {
        self.default_level = level;
        self
    }

    pub fn with_assert_identity(mut self, identity: Sentinel) -> Self {
        self.assert_identity = identity;
        self
    }

    /// Skip `skip` more frames past the library's own when capturing.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn renderer(&self) -> &dyn Renderer {
        &*self.renderer
    }

    pub fn walker(&self) -> &dyn StackWalker {
        &*self.walker
    }

    pub fn default_level(&self) -> CaptureLevel {
        self.default_level
    }

    pub fn assert_identity(&self) -> Sentinel {
        self.assert_identity
    }

    pub fn skip(&self) -> usize {
        self.skip
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            renderer: Arc::new(DefaultRenderer),
            walker: Arc::new(BacktraceWalker),
            default_level: CaptureLevel::default(),
            assert_identity: ERR_ASSERT,
            skip: 0,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("default_level", &self.default_level)
            .field("assert_identity", &self.assert_identity)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

// ── Installed settings ────────────────────────────────────────────

static INSTALLED: Lazy<ArcSwap<Settings>> = Lazy::new(|| ArcSwap::from_pointee(Settings::default()));

/// Replace the process-wide settings.
pub fn install(settings: Settings) {
    debug!("installing error settings: {:?}", settings);
    INSTALLED.store(Arc::new(settings));
}

/// Install [`Settings::from_env`].
pub fn init_from_env() {
    install(Settings::from_env());
}

/// The process-wide settings in effect right now.
pub fn current_settings() -> Arc<Settings> {
    INSTALLED.load_full()
}

/// Swap only the renderer of the installed settings.
pub fn set_renderer(renderer: impl Renderer + 'static) {
    let renderer: Arc<dyn Renderer> = Arc::new(renderer);
    INSTALLED.rcu(|cur| Settings {
        renderer: Arc::clone(&renderer),
        ..Settings::clone(cur)
    });
    debug!("error renderer replaced");
}

/// Change only the default capture level of the installed settings.
pub fn set_default_level(level: CaptureLevel) {
    INSTALLED.rcu(|cur| Settings {
        default_level: level,
        ..Settings::clone(cur)
    });
    debug!("default call stack level set to {}", level);
}

// ── Annotator ─────────────────────────────────────────────────────

/// Creates and annotates errors under one [`Settings`].
///
/// ```
/// use errinfo::{Annotation, Annotator, CaptureLevel, Sentinel, Settings};
///
/// const ERR_CONFIG: Sentinel = Sentinel::new("bad config", 2001);
///
/// let quiet = Annotator::new(Settings::default().with_default_level(CaptureLevel::None));
/// let err = quiet.error(ERR_CONFIG, [Annotation::info("file", "app.toml")]);
/// assert_eq!(err.to_string(), "bad config, file: app.toml");
/// ```
#[derive(Clone, Debug)]
pub struct Annotator {
    settings: Arc<Settings>,
}

impl Annotator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// An annotator over the currently installed settings.
    pub fn installed() -> Self {
        Self {
            settings: current_settings(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Wrap `identity`, apply `annotations`, capture the call stack.
    pub fn error<E>(&self, identity: E, annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError
    where
        E: Into<BoxError>,
    {
        AnnotatedError::build(
            Arc::clone(&self.settings),
            identity.into(),
            None,
            annotations,
            None,
        )
    }

    /// An error whose identity is the assertion sentinel, always with a
    /// full call stack.
    pub fn assert(&self, annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError {
        AnnotatedError::build(
            Arc::clone(&self.settings),
            Box::new(self.settings.assert_identity),
            None,
            annotations,
            Some(CaptureLevel::Full),
        )
    }

    /// Like [`error`](Self::error), keeping `inner` as the cause.
    pub fn embed<E, I>(
        &self,
        identity: E,
        inner: I,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> AnnotatedError
    where
        E: Into<BoxError>,
        I: Into<BoxError>,
    {
        AnnotatedError::build(
            Arc::clone(&self.settings),
            identity.into(),
            Some(inner.into()),
            annotations,
            None,
        )
    }

    /// Like [`assert`](Self::assert), keeping `inner` as the cause.
    pub fn assert_embed<I>(&self, inner: I, annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError
    where
        I: Into<BoxError>,
    {
        AnnotatedError::build(
            Arc::clone(&self.settings),
            Box::new(self.settings.assert_identity),
            Some(inner.into()),
            annotations,
            Some(CaptureLevel::Full),
        )
    }

    /// Annotate an error of either kind.
    ///
    /// An [`AnnotatedError`] gets the annotations appended in place; its call
    /// stack is only captured if none was recorded yet. Anything else is
    /// wrapped as by [`error`](Self::error).
    pub fn add_info(
        &self,
        err: impl Into<AnyError>,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> AnnotatedError {
        let err: AnyError = err.into();
        match err {
            AnyError::Annotated(mut annotated) => {
                annotated.annotate(annotations, &self.settings);
                annotated
            }
            AnyError::Plain(plain) => self.error(plain, annotations),
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::installed()
    }
}

// ── Free constructors over the installed settings ─────────────────

/// [`Annotator::error`] with the installed settings.
pub fn new<E>(identity: E, annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError
where
    E: Into<BoxError>,
{
    Annotator::installed().error(identity, annotations)
}

/// [`Annotator::assert`] with the installed settings.
pub fn new_assert(annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError {
    Annotator::installed().assert(annotations)
}

/// [`Annotator::embed`] with the installed settings.
pub fn embed<E, I>(identity: E, inner: I, annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError
where
    E: Into<BoxError>,
    I: Into<BoxError>,
{
    Annotator::installed().embed(identity, inner, annotations)
}

/// [`Annotator::assert_embed`] with the installed settings.
pub fn assert_embed<I>(inner: I, annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError
where
    I: Into<BoxError>,
{
    Annotator::installed().assert_embed(inner, annotations)
}

/// [`Annotator::add_info`] with the installed settings.
pub fn add_info(err: impl Into<AnyError>, annotations: impl IntoIterator<Item = Annotation>) -> AnnotatedError {
    Annotator::installed().add_info(err, annotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Frame;
    use crate::testing::FixedWalker;
    use serial_test::serial;
    use std::error::Error;

    const ERR_TEST: Sentinel = Sentinel::new("test failure", 9001);

    fn quiet() -> Settings {
        Settings::default().with_default_level(CaptureLevel::None)
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.default_level(), CaptureLevel::Caller);
        assert_eq!(s.assert_identity(), ERR_ASSERT);
        assert_eq!(s.skip(), 0);
    }

    #[test]
    fn builder_overrides() {
        const ERR_BUG: Sentinel = Sentinel::new("bug", 77);
        let s = Settings::default()
            .with_default_level(CaptureLevel::Full)
            .with_assert_identity(ERR_BUG)
            .with_skip(2);
        assert_eq!(s.default_level(), CaptureLevel::Full);
        assert_eq!(s.assert_identity(), ERR_BUG);
        assert_eq!(s.skip(), 2);
        let dbg = format!("{:?}", s);
        assert!(dbg.contains("Full"), "got: {}", dbg);
    }

    #[test]
    fn custom_renderer_is_used() {
        fn upper(id: &(dyn Error + 'static), _: &crate::Metadata, _: Option<&(dyn Error + 'static)>) -> String {
            id.to_string().to_uppercase()
        }
        let annotator = Annotator::new(quiet().with_renderer(upper));
        assert_eq!(annotator.error(ERR_TEST, []).to_string(), "TEST FAILURE");
    }

    #[test]
    fn skip_is_passed_to_walker() {
        let walker = FixedWalker::new(vec![
            Frame::new("helper", "h.rs", 1),
            Frame::new("app", "a.rs", 2),
        ]);
        let annotator = Annotator::new(Settings::default().with_walker(walker).with_skip(1));
        let err = annotator.error(ERR_TEST, []);
        assert_eq!(err.call_stack(), Some("a.rs:2:app"));
    }

    #[test]
    fn assert_uses_configured_identity() {
        const ERR_INVARIANT: Sentinel = Sentinel::new("invariant broken", 3);
        let annotator = Annotator::new(
            quiet()
                .with_assert_identity(ERR_INVARIANT)
                .with_walker(FixedWalker::single("f", "f.rs", 1)),
        );
        let err = annotator.assert([]);
        assert!(err.is(&ERR_INVARIANT));
    }

    #[test]
    #[serial]
    fn install_and_swap() {
        install(quiet().with_walker(FixedWalker::single("f", "f.rs", 1)));
        assert_eq!(current_settings().default_level(), CaptureLevel::None);
        assert_eq!(new(ERR_TEST, []).to_string(), "test failure");

        set_default_level(CaptureLevel::Caller);
        assert_eq!(current_settings().default_level(), CaptureLevel::Caller);
        assert_eq!(new(ERR_TEST, []).to_string(), "test failure, f.rs:1:f");

        fn tagged(id: &(dyn Error + 'static), _: &crate::Metadata, _: Option<&(dyn Error + 'static)>) -> String {
            format!("[{}]", id)
        }
        let before = new(ERR_TEST, []);
        set_renderer(tagged);
        assert_eq!(new(ERR_TEST, []).to_string(), "[test failure]");
        // Errors keep the settings they were created under.
        assert_eq!(before.to_string(), "test failure, f.rs:1:f");

        install(Settings::default());
    }

    #[test]
    #[serial]
    fn from_env_reads_level_and_skip() {
        std::env::set_var(ENV_CALLSTACK, "full");
        std::env::set_var(ENV_SKIP, "3");
        let s = Settings::from_env();
        assert_eq!(s.default_level(), CaptureLevel::Full);
        assert_eq!(s.skip(), 3);

        std::env::set_var(ENV_CALLSTACK, "$nocs");
        assert_eq!(Settings::from_env().default_level(), CaptureLevel::None);

        std::env::set_var(ENV_CALLSTACK, "very-loud");
        std::env::set_var(ENV_SKIP, "many");
        let s = Settings::from_env();
        assert_eq!(s.default_level(), CaptureLevel::Caller);
        assert_eq!(s.skip(), 0);

        std::env::remove_var(ENV_CALLSTACK);
        std::env::remove_var(ENV_SKIP);
    }

    #[test]
    #[serial]
    fn init_from_env_installs() {
        std::env::set_var(ENV_CALLSTACK, "none");
        init_from_env();
        assert_eq!(current_settings().default_level(), CaptureLevel::None);
        std::env::remove_var(ENV_CALLSTACK);
        install(Settings::default());
    }
}
