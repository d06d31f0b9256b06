//! # Snippet Preview
//!
//! A sandboxed live-preview pipeline for user-submitted code snippets.
//!
//! Author text flows through three stages: a normalizer that turns loose
//! fragments into renderable programs, a JSX/TypeScript transpiler that
//! lowers them to plain JavaScript, and a sandbox host that executes them
//! with a tri-state outcome (success, error, or timeout). Execution runs
//! in a QuickJS build compiled to WebAssembly, hosted by Wasmtime, with
//! strict security boundaries:
//!
//! - **Memory limits**: Configurable maximum memory allocation
//! - **Timeout protection**: Epoch-based interruption for infinite loop protection
//! - **Filesystem isolation**: No access to the host filesystem
//! - **Network isolation**: No network access (WASI Preview 1)
//! - **Process isolation**: Cannot spawn subprocesses
//!
//! For browser hosts the same pipeline instead produces a self-contained
//! HTML document per snippet kind (see [`sandbox::document`]); the session
//! machinery is shared between both execution paths.
//!
//! ## Example
//!
//! ```rust,ignore
//! use snippet_preview_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let snippet = Snippet::new(
//!         "const App = () => <h1>Hello</h1>;",
//!         Language::Jsx,
//!     );
//!
//!     let mut session = PreviewSession::new(snippet, PreviewConfig::default());
//!     session.activate();
//!     let status = session.wait_outcome().await;
//!
//!     assert_eq!(status, PreviewStatus::Success);
//! }
//! ```
//!
//! ## Security Model
//!
//! Snippets are untrusted by definition. The sandbox provides
//! defense-in-depth through multiple isolation layers:
//!
//! 1. **WebAssembly sandboxing**: Code runs in Wasm with no direct host access
//! 2. **WASI restrictions**: No preopened directories or network capabilities
//! 3. **Resource limits**: Memory and execution time are bounded
//! 4. **Epoch interruption**: Cooperative timeout even for tight loops

pub mod error;
pub mod normalize;
pub mod prelude;
pub mod sandbox;
pub mod snippet;
pub mod store;
pub mod transpile;

// Re-export main types at crate root for convenience
pub use error::{PreviewError, Result};
pub use sandbox::cache::{global_cache, ModuleCache, SharedEngine};
pub use sandbox::config::{PreviewConfig, PreviewConfigBuilder};
pub use sandbox::executor::{ExecutionResult, JsSandbox, PreviewRun};
pub use sandbox::message::OutcomeMessage;
pub use sandbox::session::{ClipboardSink, PreviewSession, PreviewStatus};
pub use snippet::{Language, PreviewKind, Snippet, TranspiledCode};
pub use store::{MemoryStore, SnippetStore};
