//! Failure containment inside the isolated preview frame.
//!
//! The script produced here runs before the bootstrap. It installs:
//!
//! - a `report()` hook the bootstrap calls from its own `try/catch` blocks
//!   around transpiling, evaluating and mounting;
//! - a React error boundary wrapped around the component for throws that
//!   happen during rendering;
//! - window `error` / `unhandledrejection` listeners for anything thrown
//!   asynchronously once the component is running.
//!
//! Every failure replaces the mount container with a diagnostic panel. The
//! panel text is inserted with `textContent`, and nothing is ever posted to the
//! parent frame.

use super::snippet::FALLBACK_COMPONENT_NAME;

/// Id of the mount container in the sandbox document.
pub const ROOT_ELEMENT_ID: &str = "root";

/// Result of one mount attempt, as recorded on `<body data-outcome>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    ParseFailed,
    MountFailed,
}

impl RenderOutcome {
    /// Value written to the `data-outcome` attribute.
    pub fn tag(&self) -> &'static str {
        match self {
            RenderOutcome::Rendered => "rendered",
            RenderOutcome::ParseFailed => "parse-failed",
            RenderOutcome::MountFailed => "mount-failed",
        }
    }
}

/// The three ways a preview can fail inside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The transpiler rejected the source.
    Transpile,
    /// Neither the exported name nor the fallback name resolved to a value.
    Resolution,
    /// The resolved value is not renderable, or it threw while mounting.
    Mount,
}

impl FailureKind {
    pub const ALL: [FailureKind; 3] = [
        FailureKind::Transpile,
        FailureKind::Resolution,
        FailureKind::Mount,
    ];

    /// Key used by the bootstrap when reporting this failure.
    pub fn key(self) -> &'static str {
        match self {
            FailureKind::Transpile => "transpile",
            FailureKind::Resolution => "resolution",
            FailureKind::Mount => "mount",
        }
    }

    /// Heading of the diagnostic panel.
    pub fn title(self) -> &'static str {
        match self {
            FailureKind::Transpile => "Failed to compile component",
            FailureKind::Resolution => "Component not found",
            FailureKind::Mount => "Failed to render component",
        }
    }

    /// Parse failures come from the transpiler; the rest are mount failures.
    pub fn outcome(self) -> RenderOutcome {
        match self {
            FailureKind::Transpile => RenderOutcome::ParseFailed,
            FailureKind::Resolution | FailureKind::Mount => RenderOutcome::MountFailed,
        }
    }
}

/// Human-readable text shown when no component could be resolved.
pub fn resolution_message(name: &str) -> String {
    if name == FALLBACK_COMPONENT_NAME {
        format!(
            "The component could not be found. Export it (for example `export const MyComponent = () => ...`) or name it {FALLBACK_COMPONENT_NAME}."
        )
    } else {
        format!("The component could not be found: `{name}` is exported but was not defined when the preview mounted.")
    }
}

/// JavaScript string literal for `value`.
pub(crate) fn js_string(value: &str) -> String {
    // JSON string syntax is valid JS. `<` is escaped so the literal can never
    // close the surrounding script element.
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace('<', "\\u003c")
}

/// Script that installs the containment handlers and prepares the transpiler.
///
/// It also registers the `uiforge` Babel preset (TSX + React) and a plugin that
/// drops `import` declarations and unwraps `export` so the component binding
/// lands in the frame's global scope.
pub fn containment_script() -> String {
    let titles = FailureKind::ALL
        .iter()
        .map(|kind| format!("{}: {}", js_string(kind.key()), js_string(kind.title())))
        .collect::<Vec<_>>()
        .join(", ");

    let outcome_for = |kind: FailureKind| kind.outcome().tag();

    format!(
        r#"(function () {{
  var TITLES = {{ {titles} }};
  var OUTCOMES = {{ {transpile_key}: {parse_failed}, {resolution_key}: {mount_failed}, {mount_key}: {mount_failed} }};
  var RENDERED = {rendered};
  var outcome = null;
  var activeRoot = null;

  function describe(detail) {{
    if (detail == null) return "";
    if (typeof detail === "string") return detail;
    if (detail.message) return String(detail.message);
    try {{ return String(detail); }} catch (_) {{ return "Unknown error"; }}
  }}

  function resolutionMessage(name) {{
    if (name === {fallback_name}) return {fallback_message};
    return {named_prefix} + name + {named_suffix};
  }}

  function report(kind, detail) {{
    if (outcome !== null && outcome !== RENDERED) return;
    outcome = OUTCOMES[kind] || OUTCOMES.mount;
    document.body.setAttribute("data-outcome", outcome);
    if (activeRoot) {{
      try {{ activeRoot.unmount(); }} catch (_) {{}}
      activeRoot = null;
    }}
    var message = kind === "resolution" ? resolutionMessage(detail) : describe(detail);
    var panel = document.createElement("div");
    panel.setAttribute("data-diagnostic", kind);
    panel.setAttribute("role", "alert");
    panel.style.cssText = "margin:16px;padding:16px;border:1px solid #fca5a5;border-radius:8px;background:#fef2f2;color:#991b1b;font-family:ui-sans-serif,system-ui,sans-serif;";
    var heading = document.createElement("strong");
    heading.style.cssText = "display:block;margin-bottom:8px;font-size:15px;";
    heading.textContent = TITLES[kind] || TITLES.mount;
    var body = document.createElement("pre");
    body.style.cssText = "margin:0;white-space:pre-wrap;word-break:break-word;font:12px/1.5 ui-monospace,monospace;";
    body.textContent = message;
    panel.appendChild(heading);
    panel.appendChild(body);
    var container = document.getElementById({root_id});
    container.replaceChildren(panel);
  }}

  window.addEventListener("error", function (event) {{
    event.preventDefault();
    report("mount", event.error || event.message);
  }});
  window.addEventListener("unhandledrejection", function (event) {{
    event.preventDefault();
    report("mount", event.reason);
  }});

  function Boundary(props) {{
    React.Component.call(this, props);
    this.state = {{ failed: false }};
  }}

  if (typeof React === "undefined" || typeof ReactDOM === "undefined" || typeof Babel === "undefined") {{
    window.addEventListener("load", function () {{
      report("mount", "The preview runtime failed to load.");
    }});
    return;
  }}

  Boundary.prototype = Object.create(React.Component.prototype);
  Boundary.prototype.constructor = Boundary;
  Boundary.getDerivedStateFromError = function () {{ return {{ failed: true }}; }};
  Boundary.prototype.componentDidCatch = function (error) {{
    setTimeout(function () {{ report("mount", error); }}, 0);
  }};
  Boundary.prototype.render = function () {{
    return this.state.failed ? null : this.props.children;
  }};

  ["useState", "useEffect", "useRef", "useMemo", "useCallback", "useReducer", "useContext", "useLayoutEffect", "useId", "Fragment"].forEach(function (name) {{
    window[name] = React[name];
  }});

  Babel.registerPlugin("uiforge-strip-modules", function (babel) {{
    var t = babel.types;
    return {{
      visitor: {{
        ImportDeclaration: function (path) {{ path.remove(); }},
        ExportAllDeclaration: function (path) {{ path.remove(); }},
        ExportNamedDeclaration: function (path) {{
          if (path.node.declaration) path.replaceWith(path.node.declaration);
          else path.remove();
        }},
        ExportDefaultDeclaration: function (path) {{
          var decl = path.node.declaration;
          if ((t.isFunctionDeclaration(decl) || t.isClassDeclaration(decl)) && decl.id) path.replaceWith(decl);
          else if (t.isIdentifier(decl)) path.remove();
          else path.replaceWith(t.expressionStatement(t.toExpression(decl)));
        }}
      }}
    }};
  }});
  Babel.registerPreset("uiforge", {{
    presets: [
      [Babel.availablePresets["typescript"], {{ isTSX: true, allExtensions: true, onlyRemoveTypeImports: false }}],
      [Babel.availablePresets["react"]]
    ],
    plugins: [Babel.availablePlugins["uiforge-strip-modules"]]
  }});

  window.__uiforge = {{
    settled: function () {{ return outcome !== null && outcome !== RENDERED; }},
    report: report,
    adopt: function (root) {{
      activeRoot = root;
      if (outcome === null) {{
        outcome = RENDERED;
        document.body.setAttribute("data-outcome", RENDERED);
      }}
    }},
    Boundary: Boundary
  }};
}})();"#,
        titles = titles,
        transpile_key = FailureKind::Transpile.key(),
        resolution_key = FailureKind::Resolution.key(),
        mount_key = FailureKind::Mount.key(),
        parse_failed = js_string(outcome_for(FailureKind::Transpile)),
        mount_failed = js_string(outcome_for(FailureKind::Mount)),
        rendered = js_string(RenderOutcome::Rendered.tag()),
        fallback_name = js_string(FALLBACK_COMPONENT_NAME),
        fallback_message = js_string(&resolution_message(FALLBACK_COMPONENT_NAME)),
        named_prefix = js_string("The component could not be found: `"),
        named_suffix = js_string("` is exported but was not defined when the preview mounted."),
        root_id = js_string(ROOT_ELEMENT_ID),
    )
}
