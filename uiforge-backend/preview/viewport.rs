use serde::{Deserialize, Serialize};

/// Device class the preview is sized for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportMode {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl ViewportMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewportMode::Desktop => "Desktop",
            ViewportMode::Tablet => "Tablet",
            ViewportMode::Mobile => "Mobile",
        }
    }

    pub fn constraint(self) -> WidthConstraint {
        match self {
            ViewportMode::Desktop => WidthConstraint::Full,
            ViewportMode::Tablet => WidthConstraint::Medium,
            ViewportMode::Mobile => WidthConstraint::Narrow,
        }
    }
}

/// Maximum width applied around the preview frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthConstraint {
    Full,
    Medium,
    Narrow,
}

impl WidthConstraint {
    pub fn max_width(self) -> &'static str {
        match self {
            WidthConstraint::Full => "100%",
            WidthConstraint::Medium => "28rem",
            WidthConstraint::Narrow => "24rem",
        }
    }
}

/// Holds the current viewport and wraps the preview embedding in it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportController {
    mode: ViewportMode,
}

impl ViewportController {
    pub fn new(mode: ViewportMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    pub fn set(&mut self, mode: ViewportMode) {
        self.mode = mode;
    }

    pub fn constraint(&self) -> WidthConstraint {
        self.mode.constraint()
    }

    /// Wrap `inner` (the frame markup) in a width-constrained container.
    pub fn wrap(&self, inner: &str) -> String {
        let constraint = self.constraint();
        format!(
            r#"<div class="uiforge-viewport" aria-label="{label} preview" data-viewport="{mode}" data-constraint="{constraint}" style="width:100%;max-width:{max_width};margin:0 auto;transition:max-width 300ms ease;">{inner}</div>"#,
            label = self.mode.label(),
            mode = serde_plain(self.mode),
            constraint = serde_plain(constraint),
            max_width = constraint.max_width(),
        )
    }
}

fn serde_plain<T: Serialize>(value: T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
