//! Call stack capture.
//!
//! The frame walk itself sits behind [`StackWalker`] so hosts can plug in
//! their own (or a deterministic one in tests). [`BacktraceWalker`] is the
//! default and uses the `backtrace` crate.
//!
//! Frames are innermost first. Frames belonging to the walker and to this
//! crate's construction paths are dropped before `skip` is applied, so
//! `skip = 0` always starts at the code that called into the library.

use std::fmt;

/// Joins frames of a full-stack capture.
pub const FRAME_SEPARATOR: &str = " <== ";

const UNKNOWN: &str = "<unknown>";

/// Symbol prefixes that belong to the capture machinery, not to the caller.
const INTERNAL_PREFIXES: &[&str] = &[
    "backtrace::",
    "std::backtrace",
    "std::sys::backtrace",
    "_Unwind_",
    "errinfo::",
];

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Frame {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    fn from_symbol(symbol: &backtrace::Symbol) -> Self {
        Self {
            // `{:#}` drops the trailing symbol hash.
            function: symbol
                .name()
                .map(|name| format!("{:#}", name))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            file: symbol
                .filename()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            line: symbol.lineno().unwrap_or(0),
        }
    }

    /// Does this frame belong to the capture machinery?
    fn is_internal(&self) -> bool {
        if self.function == UNKNOWN {
            return true;
        }
        // Test functions live under `errinfo::*::tests` and are callers.
        if self.function.contains("::tests::") {
            return false;
        }
        let name = self.function.trim_start_matches('<');
        INTERNAL_PREFIXES.iter().any(|p| name.starts_with(p)) || name.contains(" as errinfo::")
    }
}

impl fmt::Display for Frame {
    /// `file:line:function`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.function)
    }
}

/// Render frames innermost first, joined with [`FRAME_SEPARATOR`].
pub fn format_stack(frames: &[Frame]) -> String {
    let mut out = String::new();
    for (i, frame) in frames.iter().enumerate() {
        if i > 0 {
            out.push_str(FRAME_SEPARATOR);
        }
        out.push_str(&frame.to_string());
    }
    out
}

/// Source of caller locations.
///
/// `skip` counts frames to drop after the library's own frames.
pub trait StackWalker: Send + Sync {
    /// The single frame that called into the library.
    fn caller(&self, skip: usize) -> Option<Frame> {
        self.stack(skip).into_iter().next()
    }

    /// Every frame from the caller outward.
    fn stack(&self, skip: usize) -> Vec<Frame>;
}

/// [`StackWalker`] backed by `backtrace::trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceWalker;

impl BacktraceWalker {
    #[inline(never)]
    fn walk(skip: usize, limit: usize) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut leading = true;
        let mut skipped = 0;
        backtrace::trace(|raw| {
            // Inlined calls resolve to several symbols for one raw frame.
            let mut resolved = Vec::new();
            backtrace::resolve_frame(raw, |symbol| resolved.push(Frame::from_symbol(symbol)));
            for frame in resolved {
                if leading && frame.is_internal() {
                    continue;
                }
                leading = false;
                if skipped < skip {
                    skipped += 1;
                    continue;
                }
                frames.push(frame);
            }
            frames.len() < limit
        });
        frames.truncate(limit);
        frames
    }
}

impl StackWalker for BacktraceWalker {
    fn caller(&self, skip: usize) -> Option<Frame> {
        Self::walk(skip, 1).pop()
    }

    fn stack(&self, skip: usize) -> Vec<Frame> {
        Self::walk(skip, usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Frame>);

    impl StackWalker for Fixed {
        fn stack(&self, skip: usize) -> Vec<Frame> {
            self.0.iter().skip(skip).cloned().collect()
        }
    }

    fn frames() -> Vec<Frame> {
        vec![
            Frame::new("app::load", "src/load.rs", 12),
            Frame::new("app::main", "src/main.rs", 3),
        ]
    }

    #[test]
    fn frame_display() {
        let frame = Frame::new("app::load", "src/load.rs", 12);
        assert_eq!(frame.to_string(), "src/load.rs:12:app::load");
    }

    #[test]
    fn stack_is_joined_innermost_first() {
        assert_eq!(
            format_stack(&frames()),
            "src/load.rs:12:app::load <== src/main.rs:3:app::main"
        );
        assert_eq!(format_stack(&[]), "");
    }

    #[test]
    fn default_caller_is_first_frame() {
        let walker = Fixed(frames());
        assert_eq!(walker.caller(0), Some(frames()[0].clone()));
        assert_eq!(walker.caller(1), Some(frames()[1].clone()));
        assert_eq!(walker.caller(2), None);
    }

    #[test]
    fn internal_frames() {
        assert!(Frame::new("backtrace::backtrace::trace", "x.rs", 1).is_internal());
        assert!(Frame::new("errinfo::error::AnnotatedError::capture", "x.rs", 1).is_internal());
        assert!(Frame::new(
            "<core::result::Result<T,E> as errinfo::convert::ResultExt<T>>::add_info",
            "x.rs",
            1
        )
        .is_internal());
        assert!(!Frame::new("errinfo::error::tests::caller", "x.rs", 1).is_internal());
        assert!(!Frame::new("app::main", "x.rs", 1).is_internal());
    }

    #[test]
    fn backtrace_caller_is_this_test() {
        let frame = BacktraceWalker.caller(0).expect("a caller frame");
        assert!(
            frame.function.contains("backtrace_caller_is_this_test"),
            "unexpected caller: {}",
            frame
        );
        assert!(frame.file.ends_with("capture.rs"), "unexpected file: {}", frame.file);
    }

    #[test]
    fn backtrace_stack_starts_at_caller() {
        let stack = BacktraceWalker.stack(0);
        assert!(stack.len() > 1);
        assert!(stack[0].function.contains("backtrace_stack_starts_at_caller"));
    }
}
