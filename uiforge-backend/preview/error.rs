use uuid::Uuid;

/// Errors from preview bookkeeping on the server side.
///
/// Failures of the previewed code itself never show up here; they are
/// contained inside the sandbox frame.
#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    #[error("preview not found: {0}")]
    NotFound(Uuid),

    #[error("source snippet is empty")]
    EmptySnippet,
}
