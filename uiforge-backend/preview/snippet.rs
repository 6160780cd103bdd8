use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Name mounted when the source declares no recognizable export.
pub const FALLBACK_COMPONENT_NAME: &str = "GeneratedComponent";

/// JavaScript identifier, as a regex fragment valid in both Rust and
/// JavaScript (`u` flag) syntax. Both engines read the Unicode classes the
/// same way, so a non-ASCII name resolves identically on either side.
macro_rules! identifier {
    () => {
        r"[\p{L}\p{Nl}_$][\p{L}\p{Nl}\p{Mn}\p{Mc}\p{Nd}\p{Pc}$\u200C\u200D]*"
    };
}

/// A whole string that is one identifier.
pub const IDENTIFIER_PATTERN: &str = concat!("^", identifier!(), "$");

/// Export declaration pattern, written in the common subset of Rust and
/// JavaScript regex syntax so the bootstrap script can embed it verbatim
/// (JavaScript compiles it with the `mu` flags).
///
/// Group 1 captures `export [default] <kind> Name`, group 2 captures a bare
/// `export default Name;` statement. Evaluated in multi-line mode.
pub const EXPORT_PATTERN: &str = concat!(
    r"export\s+(?:default\s+)?(?:(?:async\s+)?function\*?|const|let|var|class)\s+(",
    identifier!(),
    r")|export\s+default\s+(",
    identifier!(),
    r")\s*(?:;|$)"
);

static EXPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(EXPORT_PATTERN)
        .multi_line(true)
        .build()
        .expect("EXPORT_PATTERN is a valid regex")
});

/// Normalized component source handed to the preview core.
///
/// Immutable once built; a new preview means a new snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnippet {
    text: String,
}

impl SourceSnippet {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// First exported identifier in the source, if any.
    ///
    /// Only the first match counts; later exports are ignored.
    pub fn export_name(&self) -> Option<&str> {
        let caps = EXPORT_RE.captures(&self.text)?;
        caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
    }

    /// Identifier the bootstrap script will try to mount.
    pub fn mount_target(&self) -> &str {
        self.export_name().unwrap_or(FALLBACK_COMPONENT_NAME)
    }
}
