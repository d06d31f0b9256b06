//! Isolated execution document templates.
//!
//! Each preview kind gets a complete standalone HTML document for a browser
//! host to load into an isolated frame. The documents are a presentation
//! contract as much as a correctness one: dark background, suppressed
//! scrollbars, and a fixed set of demo elements for stylesheets, so a
//! preview reads as a card rather than a page. Every document reports its
//! outcome to the embedding view through `window.parent.postMessage` with
//! the shape defined in [`super::message`].

/// The sandbox attribute a hosting view must put on the embedding frame:
/// default-deny everything, allow script execution only.
pub const FRAME_SANDBOX: &str = "allow-scripts";

/// Base CSS shared by every document: border-box sizing, hidden overflow
/// chrome on both the root and the body.
const BASE_STYLE: &str = "*{box-sizing:border-box;margin:0;padding:0}\n\
html,body{overflow:hidden;scrollbar-width:none;-ms-overflow-style:none}\n\
html::-webkit-scrollbar,body::-webkit-scrollbar{display:none}";

/// Script-side half of the outcome contract, mirrored by the headless shim.
fn post_outcome(kind: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("window.parent.postMessage({{type:'{}'}},'*')", kind)
    } else {
        format!(
            "window.parent.postMessage({{type:'{}',error:{}}},'*')",
            kind, detail
        )
    }
}

/// Document for markup-capable code: loads the runtime globals, installs a
/// global error handler, runs the transpiled body in a guarded block, and
/// posts exactly one outcome.
pub fn react_document(transpiled: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<script src="https://unpkg.com/react@18/umd/react.production.min.js"></script>
<script src="https://unpkg.com/react-dom@18/umd/react-dom.production.min.js"></script>
<style>
{base}
body{{background:#0a0a0a;color:#fff;font-family:system-ui,sans-serif;min-height:100vh;display:flex;align-items:center;justify-content:center;padding:16px}}
#root{{width:100%;overflow:auto;scrollbar-width:none;-ms-overflow-style:none}}
#root::-webkit-scrollbar{{display:none}}
button{{cursor:pointer;border:none;font-family:inherit}}
.error{{background:#1a0000;border:1px solid #7f1d1d;border-radius:8px;padding:16px;color:#fca5a5;font-family:monospace;font-size:12px}}
</style>
</head>
<body>
<div id="root"></div>
<script>
const{{useState,useEffect,useRef,Fragment}}=React;
const{{render:reactRender}}=ReactDOM;
function render(e){{reactRender(e,document.getElementById('root'))}}
window.onerror=function(m){{document.getElementById('root').innerHTML='<div class="error">'+m+'</div>';{post_error_m};return true}};
try{{{code};{post_success}}}catch(e){{document.getElementById('root').innerHTML='<div class="error">'+e.message+'</div>';{post_error_e}}}
</script>
</body>
</html>"#,
        base = BASE_STYLE,
        code = transpiled,
        post_success = post_outcome("success", ""),
        post_error_m = post_outcome("error", "m"),
        post_error_e = post_outcome("error", "e.message"),
    )
}

/// Document whose body is the snippet verbatim. HTML cannot signal failure
/// the way script can, so success is posted unconditionally once it parses.
pub fn html_document(snippet: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
{base}
body{{background:#0a0a0a;color:#fff;font-family:system-ui,sans-serif;padding:16px}}
</style>
</head>
<body>
{body}
<script>{post_success}</script>
</body>
</html>"#,
        base = BASE_STYLE,
        body = snippet,
        post_success = post_outcome("success", ""),
    )
}

/// Document that applies the snippet as a stylesheet over fixed demo
/// markup (a box, a button, a card) so the rules have something to hit.
pub fn css_document(snippet: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
{base}
body{{background:#0a0a0a;color:#fff;font-family:system-ui,sans-serif;min-height:100vh;display:flex;align-items:center;justify-content:center;padding:16px}}
{sheet}
</style>
</head>
<body>
<div class="demo">
  <div class="box">CSS Preview</div>
  <button class="btn">Button</button>
  <div class="card">
    <h2>Card Title</h2>
    <p>Card content goes here.</p>
  </div>
</div>
<script>{post_success}</script>
</body>
</html>"#,
        base = BASE_STYLE,
        sheet = snippet,
        post_success = post_outcome("success", ""),
    )
}

/// Document for plain script: console output is rerouted into a visible log
/// panel so viewers see it without opening devtools, and execution runs in
/// the same guarded block as the markup path.
pub fn script_document(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
{base}
body{{background:#0a0a0a;color:#22c55e;font-family:monospace;padding:16px;font-size:14px}}
.log{{padding:4px 0;border-bottom:1px solid #1a1a1a}}
.error{{color:#ef4444}}
</style>
</head>
<body>
<div id="output"></div>
<script>
const o=document.getElementById('output');
console.log=function(...a){{o.innerHTML+='<div class="log">> '+a.join(' ')+'</div>'}};
console.error=function(...a){{o.innerHTML+='<div class="log error">> '+a.join(' ')+'</div>'}};
try{{{code};{post_success}}}catch(e){{o.innerHTML='<div class="error">Error: '+e.message+'</div>';{post_error_e}}}
</script>
</body>
</html>"#,
        base = BASE_STYLE,
        code = code,
        post_success = post_outcome("success", ""),
        post_error_e = post_outcome("error", "e.message"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_document_wraps_code_in_guard() {
        let doc = react_document("render(React.createElement(\"h1\", null, \"Hi\"));");
        assert!(doc.contains("try{render(React.createElement"));
        assert!(doc.contains("window.onerror"));
        assert!(doc.contains("{type:'success'}"));
        assert!(doc.contains("{type:'error',error:e.message}"));
    }

    #[test]
    fn test_react_document_defines_runtime_globals() {
        let doc = react_document(";");
        assert!(doc.contains("function render(e)"));
        assert!(doc.contains("useState,useEffect,useRef,Fragment"));
    }

    #[test]
    fn test_html_document_body_is_verbatim() {
        let doc = html_document("<marquee>old web</marquee>");
        assert!(doc.contains("<marquee>old web</marquee>"));
        // Parses means success, unconditionally.
        assert!(doc.contains("{type:'success'}"));
        assert!(!doc.contains("try{"));
    }

    #[test]
    fn test_css_document_has_demo_elements() {
        let doc = css_document(".box { color: red }");
        assert!(doc.contains(".box { color: red }"));
        assert!(doc.contains("class=\"box\""));
        assert!(doc.contains("class=\"btn\""));
        assert!(doc.contains("class=\"card\""));
    }

    #[test]
    fn test_script_document_captures_console() {
        let doc = script_document("console.log(1/0)");
        assert!(doc.contains("console.log=function"));
        assert!(doc.contains("console.error=function"));
        assert!(doc.contains("try{console.log(1/0)"));
    }

    #[test]
    fn test_all_documents_suppress_scrollbars() {
        for doc in [
            react_document(";"),
            html_document("<p>x</p>"),
            css_document("p{}"),
            script_document(";"),
        ] {
            assert!(doc.contains("overflow:hidden"));
            assert!(doc.contains("scrollbar-width:none"));
        }
    }

    #[test]
    fn test_every_document_posts_exactly_one_success_path() {
        for doc in [
            html_document("<p>x</p>"),
            css_document("p{}"),
        ] {
            assert_eq!(doc.matches("postMessage").count(), 1);
        }
    }
}
