//! Source-to-source transpiler: extended syntax in, plain JavaScript out.
//!
//! Two passes over the text, both built on the same char-level scanner:
//! JSX lowering first ([`jsx`]), then type erasure ([`typescript`]). The
//! order matters: JSX text children are not JavaScript (an apostrophe in
//! `<p>don't</p>` is not a string delimiter), so markup has to be lowered
//! into quoted literals before any pass that reads the text as JS. The
//! whole pipeline is a pure function: identical input always produces
//! identical output, every failure is returned as a [`TranspileError`], and
//! nothing here panics out of its own frame no matter how broken the input.
//!
//! The lowering targets the factory names injected by the sandbox runtime
//! shim (`React.createElement`, `React.Fragment`, and the `render` global,
//! see [`crate::sandbox::shim`] and [`crate::sandbox::document`]). Changing
//! these names breaks every existing sandbox document; bump [`VERSION`] and
//! change the shim in the same commit if you ever have to.

mod jsx;
mod scanner;
mod typescript;

/// Transpiler version tag, stored alongside cached output so a behavior
/// change invalidates stale caches instead of silently serving old lowering
/// semantics.
pub const VERSION: u32 = 1;

/// Factory call emitted for lowered markup elements.
pub const FACTORY: &str = "React.createElement";

/// Expression emitted for fragment tags (`<>...</>`).
pub const FRAGMENT: &str = "React.Fragment";

/// A structured transpile failure.
///
/// This is data, not a fault: arbitrary user text is expected to fail here
/// routinely, and the session surfaces it as an error status rather than
/// propagating anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// 1-based source line the failure was detected on.
    pub line: usize,
}

impl std::fmt::Display for TranspileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (line {})", self.message, self.line)
    }
}

impl std::error::Error for TranspileError {}

/// Transpile extended-syntax source into plain JavaScript.
pub fn transpile(source: &str) -> Result<String, TranspileError> {
    let lowered = jsx::lower(source)?;
    typescript::strip_types(&lowered)
}
