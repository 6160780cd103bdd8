//! Sandboxed live preview of generated component source.
//!
//! Raw model output flows through these stages:
//!
//! 1. [`normalize`] strips code-fence artifacts.
//! 2. [`document`] wraps the source in a self-contained HTML document. That
//!    document carries the [`containment`] handlers and the [`bootstrap`]
//!    mount script.
//! 3. [`host`] keeps the current document per preview and defines the
//!    isolation policy it is served and embedded under.
//! 4. [`viewport`] constrains the width of the embedding.
//!
//! Nothing the previewed code does can flow back out. A broken snippet shows
//! up as a diagnostic panel inside the frame, never as an error on this side.

pub mod bootstrap;
pub mod containment;
pub mod document;
pub mod error;
pub mod host;
pub mod normalize;
pub mod registry;
pub mod session;
pub mod snippet;
#[cfg(test)]
mod test_frame;
pub mod viewport;

pub use document::{DocumentOptions, SandboxDocument};
pub use error::PreviewError;
pub use host::IsolationPolicy;
pub use normalize::normalize_source;
pub use registry::{PreviewRegistry, PreviewSummary};
pub use snippet::SourceSnippet;
pub use viewport::ViewportMode;
