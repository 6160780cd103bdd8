use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::bootstrap::{BOOTSTRAP_BLOCK_MARKER, DEFAULT_MOUNT_DELAY, SOURCE_BLOCK_MARKER, bootstrap_script};
use super::containment::{ROOT_ELEMENT_ID, containment_script};
use super::snippet::SourceSnippet;

/// Rendering runtime (React) loaded by every sandbox document.
pub const REACT_URL: &str = "https://unpkg.com/react@18.3.1/umd/react.production.min.js";
pub const REACT_DOM_URL: &str = "https://unpkg.com/react-dom@18.3.1/umd/react-dom.production.min.js";
/// In-browser transpiler for JSX/TSX.
pub const BABEL_URL: &str = "https://unpkg.com/@babel/standalone@7.26.4/babel.min.js";
/// Utility-first styling engine.
pub const TAILWIND_URL: &str = "https://cdn.tailwindcss.com/3.4.16";

/// Runtime scripts in load order.
pub const RUNTIME_SCRIPTS: [&str; 4] = [REACT_URL, REACT_DOM_URL, BABEL_URL, TAILWIND_URL];

static SCRIPT_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)").expect("valid script-close regex"));

/// Knobs for document synthesis. Everything here must be deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    pub mount_delay: Duration,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            mount_delay: DEFAULT_MOUNT_DELAY,
        }
    }
}

/// A fully self-contained HTML document for one preview attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxDocument {
    html: String,
    mount_target: String,
}

impl SandboxDocument {
    /// Render `snippet` into a standalone document.
    ///
    /// Pure templating: the same snippet and options always produce the same
    /// bytes. Broken source still yields a document; the failure shows up
    /// inside the frame as a diagnostic panel.
    pub fn build(snippet: &SourceSnippet, options: &DocumentOptions) -> Self {
        let runtime_tags = RUNTIME_SCRIPTS
            .iter()
            .map(|src| format!(r#"    <script src="{src}"></script>"#))
            .collect::<Vec<_>>()
            .join("\n");

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="referrer" content="no-referrer">
    <title>Component preview</title>
{runtime_tags}
    <style>html, body {{ margin: 0; min-height: 100%; }} body {{ padding: 16px; box-sizing: border-box; }}</style>
  </head>
  <body>
    <div id="{root_id}"></div>
    <script>
{containment}
    </script>
    <script type="text/plain" data-uiforge="{source_marker}">
{source}
    </script>
    <script data-uiforge="{bootstrap_marker}">
{bootstrap}
    </script>
  </body>
</html>
"#,
            runtime_tags = runtime_tags,
            root_id = ROOT_ELEMENT_ID,
            containment = containment_script(),
            source_marker = SOURCE_BLOCK_MARKER,
            source = embed_source(snippet.as_str()),
            bootstrap_marker = BOOTSTRAP_BLOCK_MARKER,
            bootstrap = bootstrap_script(options.mount_delay),
        );

        Self {
            html,
            mount_target: snippet.mount_target().to_string(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    /// Identifier the bootstrap will try to mount.
    pub fn mount_target(&self) -> &str {
        &self.mount_target
    }

    /// Size of the document in bytes.
    pub fn byte_len(&self) -> usize {
        self.html.len()
    }
}

/// Keep source text from terminating its script element early.
///
/// `</script` becomes `<\/script`, which means the same thing inside JS strings
/// and template literals.
fn embed_source(source: &str) -> std::borrow::Cow<'_, str> {
    SCRIPT_CLOSE_RE.replace_all(source, r"<\/$1")
}
