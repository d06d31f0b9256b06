//! Injected JavaScript runtime shim for headless engine runs.
//!
//! The browser documents get their runtime from real React; the headless
//! engine gets this stand-in instead. It implements just the conventions
//! the transpiler emits against (`React.createElement`, `React.Fragment`,
//! a `render` global, and the minimal hook primitives typical snippets
//! use), building plain element trees rather than DOM. Outcomes leave the
//! sandbox as sentinel lines on stdout, the headless analogue of
//! `window.parent.postMessage`.

use super::message::{PROTOCOL_VERSION, SENTINEL_PREFIX};

/// Runtime shim prepended to every headless run.
///
/// `print` is the engine's raw stdout primitive; it stays reachable through
/// a closure even if user code clobbers `console` or `print` itself, so the
/// outcome sentinel can always be delivered.
fn runtime_shim() -> String {
    format!(
        r#"var __emit = (function () {{
  var rawPrint = print;
  return function (obj) {{ rawPrint("{prefix}{version} " + JSON.stringify(obj)); }};
}})();
var console = {{
  log: function () {{ print(Array.prototype.map.call(arguments, String).join(" ")); }},
  error: function () {{ print(Array.prototype.map.call(arguments, String).join(" ")); }},
  warn: function () {{ print(Array.prototype.map.call(arguments, String).join(" ")); }},
}};
var React = {{
  Fragment: {{ __fragment: true }},
  createElement: function (type, props) {{
    return {{
      type: type,
      props: props || null,
      children: Array.prototype.slice.call(arguments, 2),
    }};
  }},
}};
var __mounted = null;
function render(element) {{
  if (element === undefined) {{
    throw new Error("render() called with no element");
  }}
  __mounted = element;
}}
function useState(initial) {{
  var boxed = {{ value: initial }};
  return [boxed.value, function (next) {{
    boxed.value = typeof next === "function" ? next(boxed.value) : next;
  }}];
}}
function useEffect(effect) {{
  // One synchronous pass stands in for mount; cleanups never run.
  var cleanup = effect();
  void cleanup;
}}
function useRef(initial) {{
  return {{ current: initial === undefined ? null : initial }};
}}
"#,
        prefix = SENTINEL_PREFIX,
        version = PROTOCOL_VERSION,
    )
}

/// Assemble the full headless program: shim, guarded user code, outcome
/// emission. Mirrors the `try`/`catch` structure of the browser documents.
pub fn headless_program(transpiled: &str) -> String {
    format!(
        r#"{shim}
try {{
{code}
  __emit({{ type: "success" }});
}} catch (e) {{
  __emit({{ type: "error", error: String((e && e.message) || e) }});
}}
"#,
        shim = runtime_shim(),
        code = transpiled,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_guards_user_code() {
        let program = headless_program("render(React.createElement(\"h1\", null, \"Hi\"));");
        assert!(program.contains("try {"));
        assert!(program.contains("catch (e)"));
        assert!(program.contains("render(React.createElement"));
    }

    #[test]
    fn test_shim_defines_factory_conventions() {
        let program = headless_program(";");
        assert!(program.contains("createElement:"));
        assert!(program.contains("Fragment:"));
        assert!(program.contains("function render("));
        assert!(program.contains("function useState("));
        assert!(program.contains("function useEffect("));
    }

    #[test]
    fn test_sentinel_prefix_matches_protocol() {
        let program = headless_program(";");
        assert!(program.contains(&format!("{}{} ", SENTINEL_PREFIX, PROTOCOL_VERSION)));
    }
}
