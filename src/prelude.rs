//! Prelude module for convenient imports.

pub use crate::error::{PreviewError, Result};
pub use crate::sandbox::{
    config::PreviewConfig,
    executor::{ExecutionResult, JsSandbox},
    session::{PreviewSession, PreviewStatus},
};
pub use crate::snippet::{Language, PreviewKind, Snippet};
pub use crate::store::{MemoryStore, SnippetStore};
