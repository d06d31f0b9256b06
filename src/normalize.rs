//! Source normalizer: turns a snippet fragment into a self-mounting unit.
//!
//! Raw snippets are typically fragments (a bare markup expression, a
//! component declaration, a default-exported component) rather than programs
//! that already invoke `render`. This pass rewrites them so that, once
//! transpiled, exactly one mount call runs. The detection is deliberately
//! regex-level, not a parse: mis-detections degrade to pass-through and the
//! transpiler catches genuinely malformed input.

use std::sync::LazyLock;

use regex::Regex;

use crate::snippet::Language;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+.*?from\s+['"].*?['"];?"#).expect("import regex")
});

static EXPORT_DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+default\s+").expect("export default regex"));

static DECLARATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:function|const)\s+(\w+)").expect("declaration regex"));

/// Normalize a snippet body for the markup-capable languages.
///
/// Non-markup languages pass through untouched; their documents embed the
/// source verbatim.
/// This function is total: every input yields some output, and inputs no
/// heuristic matches are returned unmodified (the author is assumed to have
/// written an explicit mount call).
pub fn normalize(source: &str, language: &Language) -> String {
    if !language.is_markup_capable() {
        return source.to_string();
    }

    // Dependencies are shimmed globally by the sandbox, never resolved.
    let stripped = IMPORT_RE.replace_all(source, "").into_owned();

    if !(stripped.contains('<') && stripped.contains('>')) {
        return stripped;
    }

    if !stripped.contains("function")
        && !stripped.contains("const")
        && !stripped.contains("class")
    {
        // Bare markup expression: mount it directly.
        return format!("render({});", stripped);
    }

    if EXPORT_DEFAULT_RE.is_match(&stripped) {
        // Conventionally-named default export.
        let without_export = EXPORT_DEFAULT_RE.replace(&stripped, "").into_owned();
        return format!("{}\nrender(<App />);", without_export);
    }

    if let Some(caps) = DECLARATION_RE.captures(&stripped) {
        let name = &caps[1];
        return format!("{}\nrender(<{} />);", stripped, name);
    }

    stripped
}
