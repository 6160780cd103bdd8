//! Payloads for the copy / download / share affordances.
//!
//! The browser performs the actual clipboard and share calls; the service only
//! prepares the file names, MIME types and fallback share text.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::preview::snippet::FALLBACK_COMPONENT_NAME;

/// File extensions offered for download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeExtension {
    #[default]
    Tsx,
    Jsx,
    Ts,
    Js,
}

impl CodeExtension {
    pub fn as_str(self) -> &'static str {
        match self {
            CodeExtension::Tsx => "tsx",
            CodeExtension::Jsx => "jsx",
            CodeExtension::Ts => "ts",
            CodeExtension::Js => "js",
        }
    }
}

/// Download file name for a component: alphanumerics only, no leading digit,
/// first letter uppercased.
pub fn component_filename(component_name: &str, ext: CodeExtension) -> String {
    let mut sanitized: String = component_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.remove(0);
    }
    if let Some(first) = sanitized.get(0..1) {
        sanitized.replace_range(0..1, &first.to_ascii_uppercase());
    }
    if sanitized.is_empty() {
        sanitized = FALLBACK_COMPONENT_NAME.to_string();
    }
    format!("{sanitized}.{}", ext.as_str())
}

pub fn mime_type(file_type: &str) -> &'static str {
    match file_type {
        "tsx" | "jsx" | "ts" | "js" => "text/plain",
        "json" => "application/json",
        "css" => "text/css",
        "html" => "text/html",
        "md" => "text/markdown",
        _ => "text/plain",
    }
}

#[derive(Debug, Clone)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: Option<String>,
    pub code: Option<String>,
}

/// Plain-text rendering used when native sharing is unavailable.
pub fn format_share_text(share: &ShareData, generated_at: DateTime<Utc>) -> String {
    let mut text = format!("{}\n\n", share.title);
    if !share.text.is_empty() {
        text.push_str(&share.text);
        text.push_str("\n\n");
    }
    if let Some(code) = share.code.as_deref().filter(|c| !c.is_empty()) {
        text.push_str("Code:\n");
        text.push_str(code);
        text.push_str("\n\n");
    }
    if let Some(url) = share.url.as_deref().filter(|u| !u.is_empty()) {
        text.push_str("URL: ");
        text.push_str(url);
        text.push_str("\n\n");
    }
    text.push_str(&format!(
        "Generated at: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    text
}
