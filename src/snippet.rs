//! Snippet data model: source text, declared language, transpiled cache.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The declared language of a snippet.
///
/// Parsed case-insensitively from the author-supplied tag; unknown tags are
/// preserved verbatim in [`Language::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Jsx,
    Tsx,
    React,
    Html,
    Css,
    Python,
    Sql,
    Json,
    Other(String),
}

impl Language {
    /// Parse a language tag. Never fails; unknown tags map to `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" => Language::Javascript,
            "typescript" | "ts" => Language::Typescript,
            "jsx" => Language::Jsx,
            "tsx" => Language::Tsx,
            "react" => Language::React,
            "html" => Language::Html,
            "css" => Language::Css,
            "python" | "py" => Language::Python,
            "sql" => Language::Sql,
            "json" => Language::Json,
            other => Language::Other(other.to_string()),
        }
    }

    /// Whether this language goes through the normalizer + JSX/TS transpiler.
    pub fn is_markup_capable(&self) -> bool {
        matches!(
            self,
            Language::Javascript
                | Language::Typescript
                | Language::Jsx
                | Language::Tsx
                | Language::React
        )
    }

    /// Display label for the hosting chrome.
    pub fn label(&self) -> String {
        match self {
            Language::Javascript => "JAVASCRIPT".to_string(),
            Language::Typescript => "TYPESCRIPT".to_string(),
            Language::Jsx => "JSX".to_string(),
            Language::Tsx => "TSX".to_string(),
            Language::React => "REACT".to_string(),
            Language::Html => "HTML".to_string(),
            Language::Css => "CSS".to_string(),
            Language::Python => "PYTHON".to_string(),
            Language::Sql => "SQL".to_string(),
            Language::Json => "JSON".to_string(),
            Language::Other(tag) => tag.to_ascii_uppercase(),
        }
    }
}

/// Which sandbox document a snippet renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// Markup-capable code mounted through the runtime shim.
    React,
    /// Document body is the snippet verbatim.
    Html,
    /// Stylesheet applied over fixed demo markup.
    Css,
    /// Plain script with console output rerouted to a visible log panel.
    Script,
    /// No execution target exists in the sandbox for this language.
    Unsupported,
}

impl PreviewKind {
    /// Classify a snippet. Mirrors the rules the hosting view applies:
    /// an explicit document prelude wins over the declared tag, plain
    /// js/ts with no markup takes the console path, and anything without
    /// an execution target is unsupported rather than an error.
    pub fn of(language: &Language, source: &str) -> Self {
        let trimmed = source.trim_start();
        if *language == Language::Html
            || trimmed.starts_with("<!")
            || trimmed.starts_with("<html")
        {
            return PreviewKind::Html;
        }
        if *language == Language::Css {
            return PreviewKind::Css;
        }
        if !language.is_markup_capable() {
            return PreviewKind::Unsupported;
        }
        // jsx/tsx/react are always mounted; plain js/ts only when the source
        // actually contains markup delimiters.
        match language {
            Language::Javascript | Language::Typescript
                if !(source.contains('<') && source.contains('>')) =>
            {
                PreviewKind::Script
            }
            _ => PreviewKind::React,
        }
    }

    /// Whether this kind needs the JS engine at all (html/css documents
    /// succeed on parse, unsupported never constructs anything).
    pub fn is_executable(&self) -> bool {
        matches!(self, PreviewKind::React | PreviewKind::Script)
    }
}

/// Cached transpiler output, tagged with the transpiler version that
/// produced it so a transpiler upgrade invalidates stale entries instead of
/// silently serving old lowering semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspiledCode {
    pub code: String,
    pub transpiler_version: u32,
}

impl TranspiledCode {
    /// Whether this cache entry was produced by the current transpiler.
    pub fn is_current(&self) -> bool {
        self.transpiler_version == crate::transpile::VERSION
    }
}

/// A stored unit of author-submitted code.
///
/// `transpiled` is a pure cache of the transpiler applied to `source_text`;
/// it is re-derived on every edit and never hand-edited. `None` means
/// transpilation failed or was not attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub id: Uuid,
    pub source_text: String,
    pub language: Language,
    pub transpiled: Option<TranspiledCode>,
}

impl Snippet {
    /// Create a snippet without a transpiled cache (render-time transpile).
    pub fn new(source_text: impl Into<String>, language: Language) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_text: source_text.into(),
            language,
            transpiled: None,
        }
    }

    /// The cached transpiled code, ignoring entries from older transpiler
    /// versions.
    pub fn current_transpiled(&self) -> Option<&str> {
        self.transpiled
            .as_ref()
            .filter(|t| t.is_current())
            .map(|t| t.code.as_str())
    }

    /// How this snippet will be previewed.
    pub fn preview_kind(&self) -> PreviewKind {
        PreviewKind::of(&self.language, &self.source_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_tag() {
        assert_eq!(Language::from_tag("TSX"), Language::Tsx);
        assert_eq!(Language::from_tag("js"), Language::Javascript);
        assert_eq!(Language::from_tag(" Python "), Language::Python);
        assert_eq!(
            Language::from_tag("ruby"),
            Language::Other("ruby".to_string())
        );
    }

    #[test]
    fn test_markup_capable_set() {
        assert!(Language::Tsx.is_markup_capable());
        assert!(Language::Javascript.is_markup_capable());
        assert!(!Language::Html.is_markup_capable());
        assert!(!Language::Python.is_markup_capable());
    }

    #[test]
    fn test_preview_kind_classification() {
        assert_eq!(
            PreviewKind::of(&Language::Tsx, "<div>Hi</div>"),
            PreviewKind::React
        );
        assert_eq!(
            PreviewKind::of(&Language::Javascript, "console.log(1)"),
            PreviewKind::Script
        );
        assert_eq!(
            PreviewKind::of(&Language::Javascript, "render(<App />)"),
            PreviewKind::React
        );
        assert_eq!(
            PreviewKind::of(&Language::Css, ".box { color: red }"),
            PreviewKind::Css
        );
        assert_eq!(
            PreviewKind::of(&Language::Python, "print(1)"),
            PreviewKind::Unsupported
        );
        assert_eq!(
            PreviewKind::of(&Language::Sql, "SELECT 1"),
            PreviewKind::Unsupported
        );
    }

    #[test]
    fn test_document_prelude_wins_over_tag() {
        assert_eq!(
            PreviewKind::of(&Language::Javascript, "<!DOCTYPE html><p>x</p>"),
            PreviewKind::Html
        );
        assert_eq!(
            PreviewKind::of(&Language::Tsx, "  <html><body></body></html>"),
            PreviewKind::Html
        );
    }

    #[test]
    fn test_stale_transpile_cache_ignored() {
        let mut snippet = Snippet::new("<div />", Language::Tsx);
        snippet.transpiled = Some(TranspiledCode {
            code: "React.createElement(\"div\", null)".to_string(),
            transpiler_version: crate::transpile::VERSION + 1,
        });
        assert!(snippet.current_transpiled().is_none());

        snippet.transpiled = Some(TranspiledCode {
            code: "React.createElement(\"div\", null)".to_string(),
            transpiler_version: crate::transpile::VERSION,
        });
        assert!(snippet.current_transpiled().is_some());
    }
}
