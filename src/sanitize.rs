//! Free-text sanitization boundary.
//!
//! User bios arrive as untrusted free text. The persistence layer passes them
//! through a [`Sanitizer`] exactly once before writing; the actual cleaning
//! strategy lives outside this crate. [`NoopSanitizer`] is the default wiring.

/// Cleans a piece of free text before it is persisted.
///
/// Implementations must be total: every input maps to some output string,
/// never an error.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, text: &str) -> String;
}

/// Passes text through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSanitizer;

impl Sanitizer for NoopSanitizer {
    fn sanitize(&self, text: &str) -> String {
        text.to_string()
    }
}
