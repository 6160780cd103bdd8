pub mod groq;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::preview::normalize_source;
use crate::preview::snippet::FALLBACK_COMPONENT_NAME;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    #[default]
    React,
    Vue,
    Svelte,
}

impl Framework {
    pub fn as_str(self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Vue => "vue",
            Framework::Svelte => "svelte",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Styling {
    #[default]
    Tailwind,
    CssModules,
    StyledComponents,
}

impl Styling {
    pub fn as_str(self) -> &'static str {
        match self {
            Styling::Tailwind => "tailwind",
            Styling::CssModules => "css-modules",
            Styling::StyledComponents => "styled-components",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default)]
    pub framework: Framework,
    #[serde(default)]
    pub styling: Styling,
    #[serde(default = "default_true")]
    pub typescript: bool,
    #[serde(default = "default_true")]
    pub accessibility: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            framework: Framework::React,
            styling: Styling::Tailwind,
            typescript: true,
            accessibility: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_name: Option<String>,
    #[serde(default)]
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// Requested component name, or the fallback when absent or not a valid identifier.
    pub fn component_name(&self) -> &str {
        self.component_name
            .as_deref()
            .map(str::trim)
            .filter(|name| is_identifier(name))
            .unwrap_or(FALLBACK_COMPONENT_NAME)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("generation API key is not configured")]
    MissingApiKey,

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("generation API returned no content")]
    EmptyResponse,
}

/// The hosted text-generation service that turns prompts into component source.
#[async_trait]
pub trait ComponentGenerator: Send + Sync {
    /// Raw model output for `request`, before normalization.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Normalized source returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedCode {
    pub code: String,
    /// True when the provider failed and the canned placeholder was used.
    pub fallback: bool,
}

/// Generate and normalize; on any provider failure log it and return the
/// placeholder snippet instead.
pub async fn generate_or_fallback(
    generator: &dyn ComponentGenerator,
    request: &GenerationRequest,
) -> GeneratedCode {
    match generator.generate(request).await {
        Ok(raw) => {
            let code = normalize_source(&raw);
            if code.trim().is_empty() {
                tracing::warn!("generation returned only fences, using fallback component");
                return GeneratedCode {
                    code: fallback_snippet(request),
                    fallback: true,
                };
            }
            GeneratedCode {
                code,
                fallback: false,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "component generation failed, using fallback component");
            GeneratedCode {
                code: fallback_snippet(request),
                fallback: true,
            }
        }
    }
}

/// System prompt sent with every generation request.
pub fn system_prompt(request: &GenerationRequest) -> String {
    let options = &request.options;
    let typescript = if options.typescript { "Yes" } else { "No" };
    let accessibility = if options.accessibility {
        "Include ARIA attributes and semantic HTML"
    } else {
        "Basic implementation"
    };
    format!(
        "You are an expert React developer who creates high-quality, production-ready components. \
Generate a complete React component based on the user's description.

Requirements:
- Framework: {framework}
- Styling: {styling}
- TypeScript: {typescript}
- Accessibility: {accessibility}
- Component name: {name}

Guidelines:
- Use modern React patterns (functional components, hooks)
- Include proper TypeScript types if requested
- Use Tailwind CSS classes for styling
- Make components responsive and accessible
- Export the component with `export const {name} = ...`
- Do not import anything other than React
- Add meaningful prop interfaces and give every prop a default value

Return ONLY the component code, no explanations or markdown formatting.",
        framework = options.framework.as_str(),
        styling = options.styling.as_str(),
        name = request.component_name(),
    )
}

pub fn user_prompt(request: &GenerationRequest) -> String {
    format!(
        "Create a {} component: {}",
        request.options.framework.as_str(),
        request.prompt.trim()
    )
}

/// Placeholder shown when generation fails. Self-contained so it always previews.
/// The prompt is echoed in a trailing comment, after the export.
pub fn fallback_snippet(request: &GenerationRequest) -> String {
    let name = request.component_name();
    let prompt = request
        .prompt
        .trim()
        .replace(['\n', '\r', '\u{2028}', '\u{2029}'], " ");
    format!(
        r#"import React from 'react'

export const {name} = () => {{
  return (
    <div className="w-full max-w-md mx-auto rounded-lg border bg-white p-6 shadow-sm">
      <h3 className="text-lg font-semibold mb-2">Generated Component</h3>
      <p className="text-gray-500 mb-4">
        This is a fallback component. Please try generating again.
      </p>
      <button type="button" className="w-full rounded-md bg-gray-900 px-4 py-2 text-white">
        Primary Action
      </button>
    </div>
  )
}}

// Error generating component. Please try again.
// Generated {name} based on: "{prompt}"
"#
    )
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
