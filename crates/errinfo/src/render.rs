//! Turning an error's parts into its display string.

use std::error::Error;

use crate::metadata::Metadata;

/// Placed between every rendered section.
pub const SEPARATOR: &str = ", ";

/// Precedes the inner error's message.
pub const INNER_PREFIX: &str = "inner error: ";

/// Produces the display string of an [`AnnotatedError`](crate::AnnotatedError).
///
/// Any `Fn(identity, metadata, inner) -> String` that is `Send + Sync` is a
/// renderer:
///
/// ```
/// use std::error::Error;
/// use errinfo::{Metadata, Settings};
///
/// fn terse(id: &(dyn Error + 'static), _: &Metadata, _: Option<&(dyn Error + 'static)>) -> String {
///     format!("E: {}", id)
/// }
///
/// let settings = Settings::default().with_renderer(terse);
/// ```
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        identity: &(dyn Error + 'static),
        metadata: &Metadata,
        inner: Option<&(dyn Error + 'static)>,
    ) -> String;
}

impl<F> Renderer for F
where
    F: Fn(&(dyn Error + 'static), &Metadata, Option<&(dyn Error + 'static)>) -> String
        + Send
        + Sync,
{
    fn render(
        &self,
        identity: &(dyn Error + 'static),
        metadata: &Metadata,
        inner: Option<&(dyn Error + 'static)>,
    ) -> String {
        self(identity, metadata, inner)
    }
}

/// The stock layout:
///
/// ```text
/// identity[, call stack][, more info][, key: value]...[, inner error: inner]
/// ```
///
/// User pairs come out sorted by key. An empty call stack is left out.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRenderer;

impl Renderer for DefaultRenderer {
    fn render(
        &self,
        identity: &(dyn Error + 'static),
        metadata: &Metadata,
        inner: Option<&(dyn Error + 'static)>,
    ) -> String {
        let mut out = identity.to_string();

        if let Some(call_stack) = metadata.call_stack().filter(|cs| !cs.is_empty()) {
            out.push_str(SEPARATOR);
            out.push_str(call_stack);
        }

        if let Some(more) = metadata.more_info() {
            out.push_str(SEPARATOR);
            out.push_str(more);
        }

        for (key, value) in metadata.user_entries() {
            out.push_str(SEPARATOR);
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
        }

        if let Some(inner) = inner {
            out.push_str(SEPARATOR);
            out.push_str(INNER_PREFIX);
            out.push_str(&inner.to_string());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::sentinel::Sentinel;

    const ERR_LOAD: Sentinel = Sentinel::new("load failed", 500);

    fn render(meta: &Metadata, inner: Option<&(dyn Error + 'static)>) -> String {
        DefaultRenderer.render(&ERR_LOAD, meta, inner)
    }

    #[test]
    fn identity_only() {
        assert_eq!(render(&Metadata::new(), None), "load failed");
    }

    #[test]
    fn section_order() {
        let mut meta: Metadata = [
            Annotation::info("who", "me"),
            Annotation::more_info("detail comes first"),
            Annotation::info("attempt", "3"),
        ]
        .into_iter()
        .collect();
        meta.record_call_stack("src/main.rs:7:app::main".to_string());

        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        assert_eq!(
            render(&meta, Some(&inner)),
            "load failed, src/main.rs:7:app::main, detail comes first, \
             attempt: 3, who: me, inner error: disk gone"
        );
    }

    #[test]
    fn empty_call_stack_is_skipped() {
        let mut meta = Metadata::new();
        meta.record_call_stack(String::new());
        meta.insert("k", "v");
        assert_eq!(render(&meta, None), "load failed, k: v");
    }

    #[test]
    fn reserved_keys_hidden() {
        let mut meta = Metadata::new();
        meta.insert("$internal", "x");
        meta.insert("$cslevel", "$fullcs");
        assert_eq!(render(&meta, None), "load failed");
    }

    #[test]
    fn closure_renderer() {
        let r = |id: &(dyn Error + 'static), m: &Metadata, _: Option<&(dyn Error + 'static)>| {
            format!("{} ({} entries)", id, m.len())
        };
        let meta: Metadata = [Annotation::info("a", "b")].into_iter().collect();
        assert_eq!(r.render(&ERR_LOAD, &meta, None), "load failed (1 entries)");
    }
}
