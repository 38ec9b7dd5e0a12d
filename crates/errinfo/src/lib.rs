//! # errinfo: errors that remember where they happened
//!
//! Wrap any error with key/value context and a capture of the caller (or
//! the whole call stack) without losing what the error *is*.
//!
//! ## Design
//!
//! An [`AnnotatedError`] has three parts:
//!
//! - **identity**: the error callers classify on (`is`, [`compare_type`],
//!   [`is_not_exist`]). Usually a [`Sentinel`].
//! - **metadata**: sorted key/value pairs, a free-text "more info", the
//!   requested [`CaptureLevel`] and the captured call stack.
//! - **inner**: an optional cause, rendered last as `inner error: ...`.
//!
//! The call stack is captured exactly once, when the error is first built.
//! Annotating the error again as it travels up adds context but keeps the
//! original location.
//!
//! Rendering is delegated to a [`Renderer`] held by the error's
//! [`Settings`]; the [`DefaultRenderer`] produces
//! `identity, call stack, more info, key: value, ..., inner error: inner`.
//!
//! ## Quick Start
//!
//! ```rust
//! use errinfo::{Annotation, AnyError, CaptureLevel, Sentinel, compare_type};
//!
//! const ERR_NO_CONFIG: Sentinel = Sentinel::new("config missing", 100_001);
//!
//! fn load() -> errinfo::Result<()> {
//!     Err(errinfo::new(ERR_NO_CONFIG, [
//!         Annotation::info("path", "/etc/app.toml"),
//!         Annotation::Level(CaptureLevel::None),
//!     ]))
//! }
//!
//! fn start() -> errinfo::Result<()> {
//!     load().map_err(|e| errinfo::add_info(e, [Annotation::info("phase", "startup")]))
//! }
//!
//! let err = start().unwrap_err();
//! assert_eq!(err.to_string(), "config missing, path: /etc/app.toml, phase: startup");
//! assert!(compare_type(&AnyError::from(err), &ERR_NO_CONFIG));
//! ```
//!
//! ## Configuration
//!
//! One [`Settings`] is installed process-wide ([`install`],
//! [`set_renderer`], [`set_default_level`], [`init_from_env`]). Install at
//! startup. Code that wants its own configuration uses an [`Annotator`].
//!
//! ## Logging
//!
//! Diagnostics go through the `log` facade: capture details at `trace`,
//! settings changes at `debug`, ignored configuration at `warn`.

mod annotation;
mod capture;
mod convert;
mod env;
mod error;
mod level;
#[macro_use]
mod macros;
mod metadata;
mod render;
mod sentinel;
mod settings;

#[cfg(test)]
mod testing;

// ── Public API ────────────────────────────────────────────────────

pub use annotation::{parse_tokens, Annotation};
pub use capture::{format_stack, BacktraceWalker, Frame, StackWalker, FRAME_SEPARATOR};
pub use convert::{compare_type, io_not_found, is_not_exist, is_not_exist_with, ResultExt};
pub use error::{AnnotatedError, AnyError, BoxError};
pub use level::{CaptureLevel, ParseLevelError, FULL_CALL_STACK, NO_CALL_STACK, ONLY_FUNC_INFO};
pub use metadata::{is_reserved, Metadata, CALL_STACK, CS_LEVEL, MORE_INFO, RESERVED_PREFIX};
pub use render::{DefaultRenderer, Renderer, INNER_PREFIX, SEPARATOR};
pub use sentinel::{Sentinel, ERR_ASSERT};
pub use settings::{
    add_info, assert_embed, current_settings, embed, init_from_env, install, new, new_assert,
    set_default_level, set_renderer, Annotator, Settings, ENV_CALLSTACK, ENV_SKIP,
};

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, AnnotatedError>;
