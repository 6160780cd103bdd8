use super::document::{RUNTIME_SCRIPTS, SandboxDocument};

/// `sandbox` tokens granted to the preview frame: scripts only. No
/// same-origin, top navigation, popups, forms or modals.
pub const IFRAME_SANDBOX: &str = "allow-scripts";

/// A document currently loaded into a host, tagged with its load generation.
#[derive(Debug, Clone)]
pub struct HostedDocument {
    pub generation: u64,
    pub document: SandboxDocument,
}

/// The isolated surface one preview renders into.
///
/// Documents are never patched in place: every [`load`](Self::load) drops the
/// previous document and installs the new one under a fresh generation, which
/// also changes the frame URL so the browser discards the old frame entirely.
#[derive(Debug, Default)]
pub struct PreviewHost {
    current: Option<HostedDocument>,
    generation: u64,
}

impl PreviewHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down whatever is hosted and install `document`.
    pub fn load(&mut self, document: SandboxDocument) -> &HostedDocument {
        self.generation += 1;
        if let Some(previous) = self.current.take() {
            tracing::debug!(
                previous_generation = previous.generation,
                generation = self.generation,
                "replacing hosted preview document"
            );
        }
        self.current.insert(HostedDocument {
            generation: self.generation,
            document,
        })
    }

    /// Drop the hosted document. Returns whether anything was hosted.
    pub fn teardown(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&HostedDocument> {
        self.current.as_ref()
    }

    /// Generation of the last load; 0 before the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Isolation rules applied when a sandbox document is served or embedded.
pub struct IsolationPolicy;

impl IsolationPolicy {
    /// `Content-Security-Policy` for sandbox documents.
    ///
    /// The `sandbox` directive gives the document an opaque origin even when it
    /// is opened outside the iframe, so it cannot read host cookies or storage.
    pub fn content_security_policy() -> String {
        let script_origins = runtime_origins().join(" ");
        format!(
            "sandbox {IFRAME_SANDBOX}; default-src 'none'; script-src 'unsafe-inline' 'unsafe-eval' {script_origins}; style-src 'unsafe-inline'; img-src data: https:; font-src data: https:; connect-src 'none'; form-action 'none'; base-uri 'none'; frame-ancestors 'self'"
        )
    }

    /// Response headers for the sandbox document endpoint.
    pub fn response_headers() -> [(&'static str, String); 5] {
        [
            ("content-type", "text/html; charset=utf-8".to_string()),
            ("content-security-policy", Self::content_security_policy()),
            ("x-content-type-options", "nosniff".to_string()),
            ("referrer-policy", "no-referrer".to_string()),
            ("cache-control", "no-store".to_string()),
        ]
    }

    /// `<iframe>` markup that loads a hosted document from `src`.
    pub fn frame_markup(src: &str, generation: u64) -> String {
        format!(
            r#"<iframe src="{src}" sandbox="{IFRAME_SANDBOX}" referrerpolicy="no-referrer" loading="eager" title="Component preview" data-generation="{generation}" style="width:100%;min-height:300px;border:0;background:#fff;"></iframe>"#,
            src = escape_attr(src),
        )
    }
}

/// Distinct `scheme://host` origins of the runtime scripts.
fn runtime_origins() -> Vec<&'static str> {
    let mut origins: Vec<&'static str> = Vec::new();
    for url in RUNTIME_SCRIPTS {
        let origin = url
            .find("://")
            .and_then(|scheme_end| {
                let host_start = scheme_end + 3;
                url[host_start..]
                    .find('/')
                    .map(|path_start| &url[..host_start + path_start])
            })
            .unwrap_or(url);
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
