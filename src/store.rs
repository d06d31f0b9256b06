//! Snippet persistence with write-time transpilation.
//!
//! Transpiling at write time moves the cost off the read path: a snippet
//! viewed a thousand times is transpiled once. The cached output carries
//! the transpiler version tag so a pipeline upgrade invalidates it
//! automatically (see [`crate::snippet::TranspiledCode`]).

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;
use uuid::Uuid;

use crate::normalize::normalize;
use crate::snippet::{Language, Snippet, TranspiledCode};
use crate::transpile;

/// Storage backend for snippets.
///
/// Implementations persist the snippet together with its cached transpile.
pub trait SnippetStore {
    /// Create a new snippet from source text, returning its id.
    fn create(&self, source_text: &str, language: Language) -> Uuid;

    /// Replace a snippet's source text, re-deriving the cached transpile.
    ///
    /// Returns `false` if no snippet with that id exists.
    fn update(&self, id: Uuid, source_text: &str, language: Language) -> bool;

    /// Fetch a snippet by id.
    fn get(&self, id: Uuid) -> Option<Snippet>;
}

/// Derive the cached transpile for a snippet, if its language warrants one.
///
/// Non-markup languages get no cache entry: the pipeline would never
/// consult it. A transpile failure also yields no entry; the failure will
/// surface at preview time, where the session can report it.
fn derive_transpiled(source_text: &str, language: &Language) -> Option<TranspiledCode> {
    if !language.is_markup_capable() {
        return None;
    }
    let normalized = normalize(source_text, language);
    match transpile::transpile(&normalized) {
        Ok(code) => Some(TranspiledCode {
            code,
            transpiler_version: transpile::VERSION,
        }),
        Err(e) => {
            debug!(error = %e, "write-time transpile failed, deferring to preview");
            None
        }
    }
}

/// In-memory snippet store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snippets: RwLock<HashMap<Uuid, Snippet>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snippets.
    pub fn len(&self) -> usize {
        self.snippets.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnippetStore for MemoryStore {
    fn create(&self, source_text: &str, language: Language) -> Uuid {
        let mut snippet = Snippet::new(source_text, language);
        snippet.transpiled = derive_transpiled(&snippet.source_text, &snippet.language);
        let id = snippet.id;
        self.snippets.write().unwrap().insert(id, snippet);
        id
    }

    fn update(&self, id: Uuid, source_text: &str, language: Language) -> bool {
        let mut snippets = self.snippets.write().unwrap();
        let Some(snippet) = snippets.get_mut(&id) else {
            return false;
        };
        snippet.source_text = source_text.to_string();
        snippet.language = language;
        snippet.transpiled = derive_transpiled(&snippet.source_text, &snippet.language);
        true
    }

    fn get(&self, id: Uuid) -> Option<Snippet> {
        self.snippets.read().unwrap().get(&id).cloned()
    }
}
