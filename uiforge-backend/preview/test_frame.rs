//! Runs the frame scripts of a built [`SandboxDocument`] in V8.
//!
//! The page globals are stand-ins: a DOM with just the calls the scripts make,
//! a React that renders to text and honours error boundaries, and a Babel that
//! strips module syntax and reports syntax errors like the real transpiler.
//! Timers only run when a test flushes them, and a callback that throws is
//! redispatched as a window `error` event.

use deno_core::{JsRuntime, RuntimeOptions, v8};
use serde::Deserialize;

use super::containment::{FailureKind, js_string};
use super::document::{DocumentOptions, SandboxDocument};
use super::normalize::normalize_source;
use super::snippet::SourceSnippet;

const PAGE_GLOBALS: &str = r#"
globalThis.window = globalThis;
(function () {
  var listeners = {};
  var timers = [];
  var delays = [];

  window.addEventListener = function (type, listener, options) {
    (listeners[type] = listeners[type] || []).push({ listener: listener, once: !!(options && options.once) });
  };
  window.setTimeout = function (callback, ms) {
    timers.push(callback);
    delays.push(ms || 0);
    return timers.length;
  };
  window.__dispatch = function (type, init) {
    var event = Object.assign({ type: type, defaultPrevented: false }, init || {});
    event.preventDefault = function () { event.defaultPrevented = true; };
    var current = listeners[type] || [];
    listeners[type] = current.filter(function (entry) { return !entry.once; });
    current.forEach(function (entry) { entry.listener(event); });
    return event.defaultPrevented;
  };
  window.__flush = function () {
    for (var turns = 0; timers.length && turns < 100; turns++) {
      var callback = timers.shift();
      try {
        callback();
      } catch (error) {
        window.__dispatch("error", { error: error, message: String(error && error.message) });
      }
    }
  };
  window.__pendingTimers = function () { return timers.length; };
  window.__timerDelays = function () { return delays.slice(); };

  function Element(tag) {
    this.tagName = String(tag).toUpperCase();
    this.attributes = {};
    this.children = [];
    this.style = {};
    this.text = "";
  }
  Element.prototype.setAttribute = function (name, value) { this.attributes[name] = String(value); };
  Element.prototype.getAttribute = function (name) {
    return Object.prototype.hasOwnProperty.call(this.attributes, name) ? this.attributes[name] : null;
  };
  Element.prototype.appendChild = function (child) { this.children.push(child); return child; };
  Element.prototype.replaceChildren = function () {
    this.text = "";
    this.children = Array.prototype.slice.call(arguments);
  };
  Object.defineProperty(Element.prototype, "textContent", {
    get: function () {
      return this.text + this.children.map(function (child) { return child.textContent; }).join("");
    },
    set: function (value) {
      this.children = [];
      this.text = String(value);
    }
  });

  var root = new Element("div");
  root.setAttribute("id", "root");
  var sourceBlock = new Element("script");
  sourceBlock.setAttribute("type", "text/plain");
  sourceBlock.setAttribute("data-uiforge", "source");

  window.document = {
    readyState: "loading",
    body: new Element("body"),
    createElement: function (tag) { return new Element(tag); },
    getElementById: function (id) { return id === "root" ? root : null; },
    querySelector: function (selector) {
      return selector === 'script[data-uiforge="source"]' ? sourceBlock : null;
    }
  };
  window.__setSource = function (text) { sourceBlock.textContent = text; };

  function Component(props) {
    this.props = props;
    this.state = {};
  }
  var Fragment = { fragment: true };

  function createElement(type, props) {
    var merged = Object.assign({}, props);
    var children = Array.prototype.slice.call(arguments, 2);
    if (children.length === 1) merged.children = children[0];
    else if (children.length > 1) merged.children = children;
    return { $$typeof: "react.element", type: type, props: merged };
  }

  function renderNode(node) {
    if (node === null || node === undefined || typeof node === "boolean") return "";
    if (Array.isArray(node)) return node.map(renderNode).join("");
    if (typeof node !== "object" || !node.$$typeof) return String(node);
    var type = node.type;
    if (type === Fragment || typeof type === "string") return renderNode(node.props.children);
    if (type.prototype instanceof Component) {
      var instance = new type(node.props);
      try {
        return renderNode(instance.render());
      } catch (error) {
        if (!type.getDerivedStateFromError) throw error;
        instance.state = Object.assign({}, instance.state, type.getDerivedStateFromError(error));
        if (instance.componentDidCatch) instance.componentDidCatch(error);
        return renderNode(instance.render());
      }
    }
    return renderNode(type(node.props));
  }

  window.React = {
    Component: Component,
    Fragment: Fragment,
    createElement: createElement,
    useState: function (initial) { return [typeof initial === "function" ? initial() : initial, function () {}]; },
    useEffect: function () {},
    useLayoutEffect: function () {},
    useRef: function (initial) { return { current: initial }; },
    useMemo: function (factory) { return factory(); },
    useCallback: function (callback) { return callback; },
    useReducer: function (_reducer, initial) { return [initial, function () {}]; },
    useContext: function () { return undefined; },
    useId: function () { return ":r0:"; }
  };
  window.ReactDOM = {
    createRoot: function (container) {
      return {
        render: function (element) { container.textContent = renderNode(element); },
        unmount: function () { container.replaceChildren(); }
      };
    }
  };

  var presets = {};
  var plugins = {};
  window.Babel = {
    availablePresets: { typescript: {}, react: {} },
    availablePlugins: plugins,
    registerPlugin: function (name, plugin) { plugins[name] = plugin; },
    registerPreset: function (name, preset) { presets[name] = preset; },
    transform: function (code, options) {
      (options.presets || []).forEach(function (name) {
        if (!presets[name]) throw new Error("Unknown preset: " + name);
      });
      var out = code
        .replace(/^[ \t]*import\s[^\n]*$/gm, "")
        .replace(/^([ \t]*)export\s+default\s+[^\s;(]+[ \t]*;?[ \t]*$/gm, "$1")
        .replace(/^([ \t]*)export\s+(default\s+)?/gm, "$1");
      try {
        new Function(out);
      } catch (error) {
        throw new SyntaxError(options.filename + ": " + error.message);
      }
      return { code: out };
    }
  };
})();
"#;

const READ_FRAME: &str = r#"
(function () {
  var root = document.getElementById("root");
  var first = root.children[0];
  var panel = first && first.getAttribute("data-diagnostic") !== null ? first : null;
  return JSON.stringify({
    outcome: document.body.getAttribute("data-outcome"),
    target: document.body.getAttribute("data-mount-target"),
    diagnostic: panel ? panel.getAttribute("data-diagnostic") : null,
    title: panel ? panel.children[0].textContent : null,
    message: panel ? panel.children[1].textContent : null,
    text: root.textContent,
    pending_timers: __pendingTimers()
  });
})()
"#;

/// What the frame shows after the scripts ran.
#[derive(Debug, Deserialize)]
struct FrameState {
    outcome: Option<String>,
    target: Option<String>,
    diagnostic: Option<String>,
    title: Option<String>,
    message: Option<String>,
    text: String,
    pending_timers: usize,
}

struct Frame {
    runtime: JsRuntime,
}

impl Frame {
    /// Build the document for `raw` and run its inline scripts in order.
    fn open(raw: &str) -> Self {
        Self::open_with(raw, true)
    }

    /// Same as [`Frame::open`], but the CDN runtimes never arrived.
    fn open_offline(raw: &str) -> Self {
        Self::open_with(raw, false)
    }

    fn open_with(raw: &str, runtime_loaded: bool) -> Self {
        let snippet = SourceSnippet::new(normalize_source(raw));
        let document = SandboxDocument::build(&snippet, &DocumentOptions::default());
        let html = document.html();

        let mut frame = Frame {
            runtime: JsRuntime::new(RuntimeOptions::default()),
        };
        frame.run(PAGE_GLOBALS.to_string());
        if !runtime_loaded {
            frame.run("delete window.React; delete window.ReactDOM; delete window.Babel;".to_string());
        }
        frame.run(format!(
            "__setSource({});",
            js_string(inline_block(html, r#"<script type="text/plain" data-uiforge="source">"#))
        ));
        frame.run(inline_block(html, "<script>").to_string());
        frame.run(inline_block(html, r#"<script data-uiforge="bootstrap">"#).to_string());
        frame
    }

    fn run(&mut self, code: String) -> String {
        let value = self
            .runtime
            .execute_script("[uiforge:frame]", code)
            .unwrap_or_else(|e| panic!("frame script threw: {e}"));
        let scope = &mut self.runtime.handle_scope();
        let local = v8::Local::new(scope, &value);
        local.to_rust_string_lossy(scope)
    }

    /// Fire `load` on a complete document, then run every queued timer.
    fn load(&mut self) -> FrameState {
        self.run(r#"document.readyState = "complete"; __dispatch("load");"#.to_string());
        self.flush()
    }

    fn flush(&mut self) -> FrameState {
        self.run("__flush();".to_string());
        self.state()
    }

    /// Dispatch a window event; returns whether a listener called `preventDefault`.
    fn dispatch(&mut self, kind: &str, init: &str) -> bool {
        self.run(format!("__dispatch({}, {init})", js_string(kind))) == "true"
    }

    fn state(&mut self) -> FrameState {
        let json = self.run(READ_FRAME.to_string());
        serde_json::from_str(&json).unwrap_or_else(|e| panic!("bad frame state {json}: {e}"))
    }
}

/// Text between `opening` and the closing tag of the same block.
fn inline_block<'a>(html: &'a str, opening: &str) -> &'a str {
    let start = html
        .find(&format!("{opening}\n"))
        .unwrap_or_else(|| panic!("no {opening} block"))
        + opening.len()
        + 1;
    let len = html[start..]
        .find("\n    </script>")
        .unwrap_or_else(|| panic!("unterminated {opening} block"));
    &html[start..start + len]
}

fn rendered(raw: &str) -> FrameState {
    Frame::open(raw).load()
}

#[test]
fn component_mounts_after_load_and_the_fixed_delay() {
    let mut frame = Frame::open(
        "```tsx\nimport React from 'react'\n\nexport const Greeting = () => React.createElement(\"div\", null, \"Hi\");\n```",
    );
    let before = frame.state();
    assert_eq!(before.target, None);
    assert_eq!(before.pending_timers, 0);

    frame.run(r#"document.readyState = "complete"; __dispatch("load");"#.to_string());
    assert_eq!(frame.state().pending_timers, 1);
    assert_eq!(frame.run("__timerDelays().join()".to_string()), "100");

    let after = frame.flush();
    assert_eq!(after.outcome.as_deref(), Some("rendered"));
    assert_eq!(after.target.as_deref(), Some("Greeting"));
    assert_eq!(after.text, "Hi");
    assert_eq!(after.diagnostic, None);
}

#[test]
fn syntax_error_is_a_parse_failure_with_the_transpiler_message() {
    let state = rendered("export const Broken = () => {\n  return React.createElement(\"div\", null,\n");
    assert_eq!(state.outcome.as_deref(), Some("parse-failed"));
    assert_eq!(state.diagnostic.as_deref(), Some("transpile"));
    assert_eq!(state.title.as_deref(), Some(FailureKind::Transpile.title()));
    let message = state.message.unwrap();
    assert!(message.starts_with("component.tsx:"), "{message}");
    assert_ne!(message, "Script error.");
}

#[test]
fn top_level_throw_is_a_mount_failure() {
    let state = rendered(
        "const theme = useTheme();\nexport const Themed = () => React.createElement(\"p\", null, theme);",
    );
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.diagnostic.as_deref(), Some("mount"));
    assert_eq!(state.title.as_deref(), Some(FailureKind::Mount.title()));
    assert!(state.message.unwrap().contains("useTheme"));
}

#[test]
fn missing_component_shows_not_found() {
    let state = rendered("const Widget = () => React.createElement(\"div\", null, \"w\");");
    assert_eq!(state.target.as_deref(), Some("GeneratedComponent"));
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.diagnostic.as_deref(), Some("resolution"));
    assert_eq!(state.title.as_deref(), Some("Component not found"));
    assert!(state.message.unwrap().contains("could not be found"));
}

#[test]
fn exported_name_that_never_got_defined_shows_not_found() {
    let state = rendered("export default Ghost;");
    assert_eq!(state.target.as_deref(), Some("Ghost"));
    assert_eq!(state.diagnostic.as_deref(), Some("resolution"));
    assert!(state.message.unwrap().contains("`Ghost`"));
}

#[test]
fn non_component_export_is_a_mount_failure() {
    let state = rendered("export const Answer = 42;");
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.diagnostic.as_deref(), Some("mount"));
    assert!(state.message.unwrap().contains("not a renderable component"));
}

#[test]
fn render_throw_is_caught_by_the_boundary() {
    let state = rendered(
        "export function Exploding() {\n  throw new Error(\"kaboom\");\n}",
    );
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.diagnostic.as_deref(), Some("mount"));
    assert_eq!(state.message.as_deref(), Some("kaboom"));
    assert_eq!(state.pending_timers, 0);
}

#[test]
fn class_components_render() {
    let state = rendered(
        "export default class Card extends React.Component {\n  render() { return React.createElement(\"section\", null, \"card\"); }\n}",
    );
    assert_eq!(state.outcome.as_deref(), Some("rendered"));
    assert_eq!(state.text, "card");
}

#[test]
fn errors_after_rendering_replace_the_component() {
    let mut frame = Frame::open("export const Ticker = () => \"tick\";");
    assert_eq!(frame.load().outcome.as_deref(), Some("rendered"));

    let prevented = frame.dispatch("error", r#"{ error: new Error("late failure"), message: "late failure" }"#);
    assert!(prevented);
    let state = frame.state();
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.diagnostic.as_deref(), Some("mount"));
    assert_eq!(state.message.as_deref(), Some("late failure"));
    assert!(!state.text.contains("tick"));
}

#[test]
fn throw_from_a_timer_is_a_mount_failure() {
    let state = rendered(
        "export const Later = () => {\n  setTimeout(() => { throw new Error(\"from timer\"); }, 10);\n  return \"soon\";\n};",
    );
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.message.as_deref(), Some("from timer"));
}

#[test]
fn unhandled_rejection_is_a_mount_failure() {
    let mut frame = Frame::open("export const Fetcher = () => \"loading\";");
    frame.load();
    assert!(frame.dispatch("unhandledrejection", r#"{ reason: new Error("network is off") }"#));
    let state = frame.state();
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.message.as_deref(), Some("network is off"));
}

#[test]
fn first_failure_stays_on_screen() {
    let mut frame = Frame::open("export const Answer = 42;");
    let first = frame.load().message;
    frame.dispatch("error", r#"{ error: new Error("second"), message: "second" }"#);
    assert_eq!(frame.state().message, first);
}

#[test]
fn missing_runtime_is_reported_on_load() {
    let state = Frame::open_offline("export const Foo = () => \"foo\";").load();
    assert_eq!(state.outcome.as_deref(), Some("mount-failed"));
    assert_eq!(state.diagnostic.as_deref(), Some("mount"));
    assert_eq!(state.message.as_deref(), Some("The preview runtime failed to load."));
}

#[test]
fn frame_mounts_the_name_the_service_reports() {
    let sources = [
        "export const Café = () => \"café\";",
        "function Überschrift() { return \"title\"; }\nexport default Überschrift;",
        "export let $dollar_1 = () => \"dollar\";",
        "export const A\u{200C}b = () => \"joiner\";",
        "export const First = () => \"one\";\nexport const Second = () => \"two\";",
        "export default function Named() { return \"named\"; }",
    ];
    for source in sources {
        let expected = SourceSnippet::new(source).mount_target().to_string();
        let state = rendered(source);
        assert_eq!(state.target.as_deref(), Some(expected.as_str()), "{source}");
        assert_eq!(state.outcome.as_deref(), Some("rendered"), "{source}: {state:?}");
    }
}
