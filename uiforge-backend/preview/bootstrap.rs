use std::time::Duration;

use super::containment::{FailureKind, ROOT_ELEMENT_ID, js_string};
use super::snippet::{EXPORT_PATTERN, FALLBACK_COMPONENT_NAME, IDENTIFIER_PATTERN};

/// Attribute value marking the component source block.
pub const SOURCE_BLOCK_MARKER: &str = "source";
/// Attribute value marking the bootstrap block.
pub const BOOTSTRAP_BLOCK_MARKER: &str = "bootstrap";

/// Default pause between the frame's `load` event and the mount attempt.
pub const DEFAULT_MOUNT_DELAY: Duration = Duration::from_millis(100);
/// Upper bound for a configured mount delay.
pub const MAX_MOUNT_DELAY: Duration = Duration::from_millis(2000);

/// Bootstrap script that transpiles, resolves and mounts the component.
///
/// The source block is inert text. Once the frame's `load` event has fired
/// and one fixed `mount_delay` has passed, the script:
///
/// 1. applies [`EXPORT_PATTERN`] to the raw source (first match wins, else the
///    fallback name) and records the name on `<body data-mount-target>`;
/// 2. transpiles with the `uiforge` preset inside its own `try/catch`, so
///    syntax errors surface with the transpiler's message;
/// 3. evaluates the output in a function scope and reads the resolved name
///    back out of it; a throw here is a mount failure;
/// 4. renders the component inside the error boundary.
///
/// There is no retry: a runtime that is still not ready surfaces as a mount
/// failure.
pub fn bootstrap_script(mount_delay: Duration) -> String {
    let delay_ms = mount_delay.min(MAX_MOUNT_DELAY).as_millis();

    format!(
        r#"(function () {{
  var FALLBACK_NAME = {fallback};
  var MOUNT_DELAY_MS = {delay_ms};
  var EXPORT_PATTERN = new RegExp({pattern}, "mu");
  var IDENTIFIER = new RegExp({identifier}, "u");
  var guard = window.__uiforge;
  if (!guard) return;

  function resolveName(source) {{
    var match = EXPORT_PATTERN.exec(source);
    if (!match) return FALLBACK_NAME;
    return match[1] || match[2] || FALLBACK_NAME;
  }}

  function evaluate(compiled, name) {{
    if (!IDENTIFIER.test(name)) return undefined;
    var body = compiled + "\n;return typeof " + name + " === 'undefined' ? undefined : " + name + ";";
    return new Function(body)();
  }}

  function isRenderable(value) {{
    return typeof value === "function" || (value !== null && typeof value === "object" && typeof value.$$typeof !== "undefined");
  }}

  function mount() {{
    if (guard.settled()) return;
    var block = document.querySelector('script[data-uiforge={source_marker}]');
    var source = block ? block.textContent : "";
    var name = resolveName(source);
    document.body.setAttribute("data-mount-target", name);

    var compiled;
    try {{
      compiled = Babel.transform(source, {{ presets: ["uiforge"], filename: "component.tsx" }}).code;
    }} catch (error) {{
      guard.report({transpile}, error);
      return;
    }}

    var Component;
    try {{
      Component = evaluate(compiled, name);
    }} catch (error) {{
      guard.report({mount}, error);
      return;
    }}
    if (typeof Component === "undefined") {{
      guard.report({resolution}, name);
      return;
    }}

    try {{
      if (!isRenderable(Component)) {{
        throw new TypeError("`" + name + "` is not a renderable component (got " + typeof Component + ").");
      }}
      var root = ReactDOM.createRoot(document.getElementById({root_id}));
      guard.adopt(root);
      root.render(React.createElement(guard.Boundary, null, React.createElement(Component)));
    }} catch (error) {{
      guard.report({mount}, error);
    }}
  }}

  function schedule() {{
    setTimeout(mount, MOUNT_DELAY_MS);
  }}

  if (document.readyState === "complete") schedule();
  else window.addEventListener("load", schedule, {{ once: true }});
}})();"#,
        fallback = js_string(FALLBACK_COMPONENT_NAME),
        delay_ms = delay_ms,
        pattern = js_string(EXPORT_PATTERN),
        identifier = js_string(IDENTIFIER_PATTERN),
        source_marker = js_string(SOURCE_BLOCK_MARKER),
        transpile = js_string(FailureKind::Transpile.key()),
        resolution = js_string(FailureKind::Resolution.key()),
        mount = js_string(FailureKind::Mount.key()),
        root_id = js_string(ROOT_ELEMENT_ID),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_the_shared_export_pattern() {
        let script = bootstrap_script(DEFAULT_MOUNT_DELAY);
        assert!(script.contains(&js_string(EXPORT_PATTERN)));
        assert!(script.contains(&js_string(IDENTIFIER_PATTERN)));
        assert!(script.contains(r#"var FALLBACK_NAME = "GeneratedComponent";"#));
    }

    #[test]
    fn waits_for_load_then_a_fixed_delay() {
        let script = bootstrap_script(Duration::from_millis(250));
        assert!(script.contains("var MOUNT_DELAY_MS = 250;"));
        assert!(script.contains(r#"window.addEventListener("load", schedule"#));
        assert_eq!(script.matches("setTimeout(").count(), 1);
        assert!(!script.contains("setInterval"));
    }

    #[test]
    fn delay_is_clamped() {
        let script = bootstrap_script(Duration::from_secs(60));
        assert!(script.contains("var MOUNT_DELAY_MS = 2000;"));
    }

    #[test]
    fn routes_failures_to_containment() {
        let script = bootstrap_script(DEFAULT_MOUNT_DELAY);
        assert!(script.contains(r#"guard.report("transpile", error)"#));
        assert!(script.contains(r#"guard.report("resolution", name)"#));
        assert!(script.contains(r#"guard.report("mount", error)"#));
        assert!(script.contains("ReactDOM.createRoot"));
    }

    #[test]
    fn deterministic_for_same_delay() {
        assert_eq!(
            bootstrap_script(DEFAULT_MOUNT_DELAY),
            bootstrap_script(DEFAULT_MOUNT_DELAY)
        );
    }
}
