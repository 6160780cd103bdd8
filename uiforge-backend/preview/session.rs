use super::document::{DocumentOptions, SandboxDocument};
use super::error::PreviewError;
use super::host::{HostedDocument, IsolationPolicy, PreviewHost};
use super::normalize::normalize_source;
use super::snippet::SourceSnippet;
use super::viewport::{ViewportController, ViewportMode};

/// One preview surface: a host plus the viewport wrapped around it.
#[derive(Debug)]
pub struct PreviewSession {
    host: PreviewHost,
    viewport: ViewportController,
    options: DocumentOptions,
}

impl PreviewSession {
    pub fn new(options: DocumentOptions, viewport: ViewportMode) -> Self {
        Self {
            host: PreviewHost::new(),
            viewport: ViewportController::new(viewport),
            options,
        }
    }

    /// Normalize `raw`, build a fresh document and load it into the host.
    ///
    /// A blank snippet is rejected and leaves the current document in place.
    pub fn show(&mut self, raw: &str) -> Result<&HostedDocument, PreviewError> {
        let snippet = SourceSnippet::new(normalize_source(raw));
        if snippet.is_blank() {
            return Err(PreviewError::EmptySnippet);
        }
        let document = SandboxDocument::build(&snippet, &self.options);
        Ok(self.host.load(document))
    }

    /// Change only the width constraint; the hosted document is untouched.
    pub fn set_viewport(&mut self, mode: ViewportMode) {
        self.viewport.set(mode);
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn host(&self) -> &PreviewHost {
        &self.host
    }

    pub fn close(&mut self) -> bool {
        self.host.teardown()
    }

    /// Viewport wrapper around a sandboxed frame pointing at `document_url`.
    ///
    /// The current generation is appended to the URL so each reload gets a
    /// brand-new frame.
    pub fn embed(&self, document_url: &str) -> Option<String> {
        let hosted = self.host.current()?;
        let separator = if document_url.contains('?') { '&' } else { '?' };
        let src = format!("{document_url}{separator}g={}", hosted.generation);
        Some(
            self.viewport
                .wrap(&IsolationPolicy::frame_markup(&src, hosted.generation)),
        )
    }
}
