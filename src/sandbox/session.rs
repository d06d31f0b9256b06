//! Preview session lifecycle.
//!
//! A [`PreviewSession`] owns one snippet's journey from idle to a terminal
//! outcome. Sessions start `Idle` and stay that way until activated, so a
//! host can create sessions for a whole feed of snippets and only pay for
//! the ones that actually become visible. Once a terminal status is
//! reached it never changes; outcome messages that arrive afterwards are
//! logged and dropped.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{PreviewError, Result};
use crate::sandbox::config::PreviewConfig;
use crate::sandbox::document::{css_document, html_document, react_document, script_document};
use crate::sandbox::executor::{JsSandbox, PreviewRun};
use crate::sandbox::message::OutcomeMessage;
use crate::snippet::{PreviewKind, Snippet};
use crate::transpile;

/// Where a preview session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    /// Created but not yet activated.
    Idle,
    /// Activated and waiting for the snippet to report its outcome.
    Loading,
    /// The snippet ran and reported success.
    Success,
    /// The snippet failed: transpile error, JS throw, or engine fault.
    Error,
    /// The snippet's language cannot be previewed.
    Unsupported,
    /// The snippet never reported an outcome within the timeout.
    TimedOut,
}

impl PreviewStatus {
    /// Human-readable label, suitable for a status badge.
    pub fn label(&self) -> &'static str {
        match self {
            PreviewStatus::Idle => "idle",
            PreviewStatus::Loading => "loading",
            PreviewStatus::Success => "success",
            PreviewStatus::Error => "error",
            PreviewStatus::Unsupported => "unsupported",
            PreviewStatus::TimedOut => "timed out",
        }
    }

    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PreviewStatus::Success
                | PreviewStatus::Error
                | PreviewStatus::Unsupported
                | PreviewStatus::TimedOut
        )
    }
}

/// Destination for a copy-to-clipboard request.
///
/// The crate is headless, so the actual clipboard belongs to the host;
/// implement this for whatever the host writes to.
pub trait ClipboardSink {
    /// Receive the text. Return `false` if the write failed.
    fn set_text(&mut self, text: &str) -> bool;
}

/// A single snippet's preview lifecycle, from idle to terminal outcome.
pub struct PreviewSession {
    snippet: Snippet,
    config: PreviewConfig,
    status: PreviewStatus,
    error_detail: Option<String>,
    console: Vec<String>,
    document: Option<String>,
    view_height: u32,
    outcome_rx: Option<mpsc::UnboundedReceiver<Result<PreviewRun>>>,
    engine_task: Option<JoinHandle<()>>,
}

impl PreviewSession {
    /// Create a session for a snippet.
    ///
    /// Unsupported languages short-circuit straight to a terminal
    /// `Unsupported` status; no transpile or engine work is ever done for
    /// them. Everything else starts `Idle`.
    pub fn new(snippet: Snippet, config: PreviewConfig) -> Self {
        let status = if snippet.preview_kind() == PreviewKind::Unsupported {
            debug!(language = %snippet.language.label(), "snippet language is not previewable");
            PreviewStatus::Unsupported
        } else {
            PreviewStatus::Idle
        };
        let view_height = config.default_height;

        Self {
            snippet,
            config,
            status,
            error_detail: None,
            console: Vec::new(),
            document: None,
            view_height,
            outcome_rx: None,
            engine_task: None,
        }
    }

    /// Activate the session (the snippet became visible).
    ///
    /// Idempotent: calling this on anything but an `Idle` session does
    /// nothing. Markup and stylesheet snippets complete synchronously;
    /// executable snippets transition to `Loading` and run in the engine
    /// in the background, to be collected with
    /// [`wait_outcome`](Self::wait_outcome).
    pub fn activate(&mut self) {
        if self.status != PreviewStatus::Idle {
            return;
        }

        match self.snippet.preview_kind() {
            PreviewKind::Html => {
                self.document = Some(html_document(&self.snippet.source_text));
                self.transition(PreviewStatus::Success);
            }
            PreviewKind::Css => {
                self.document = Some(css_document(&self.snippet.source_text));
                self.transition(PreviewStatus::Success);
            }
            PreviewKind::React => self.activate_executable(true),
            PreviewKind::Script => self.activate_executable(false),
            // new() already parked unsupported sessions
            PreviewKind::Unsupported => {}
        }
    }

    fn activate_executable(&mut self, mounts_component: bool) {
        // Plain scripts go through the transpiler too: a typed but
        // markup-free snippet still carries annotations to erase.
        let code = match self.transpiled_code() {
            Ok(code) => code,
            Err(detail) => {
                self.error_detail = Some(detail);
                self.transition(PreviewStatus::Error);
                return;
            }
        };

        self.document = Some(if mounts_component {
            react_document(&code)
        } else {
            script_document(&code)
        });

        let sandbox = match JsSandbox::new(self.config.clone()) {
            Ok(sandbox) => sandbox,
            Err(e) => {
                self.error_detail = Some(e.to_string());
                self.transition(PreviewStatus::Error);
                return;
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        self.outcome_rx = Some(rx);
        self.engine_task = Some(tokio::spawn(async move {
            let run = sandbox.run_preview(&code).await;
            let _ = tx.send(run);
        }));
        self.transition(PreviewStatus::Loading);
    }

    /// Resolve the code to execute, using the snippet's cached transpile
    /// when its version tag is current and transpiling fresh otherwise.
    fn transpiled_code(&self) -> std::result::Result<String, String> {
        if let Some(cached) = self.snippet.current_transpiled() {
            return Ok(cached.to_string());
        }
        let normalized = crate::normalize::normalize(&self.snippet.source_text, &self.snippet.language);
        transpile::transpile(&normalized).map_err(|e| e.to_string())
    }

    /// Wait for a `Loading` session to reach a terminal status.
    ///
    /// Returns immediately if the session is already terminal. A session
    /// that produces no outcome within the configured timeout is demoted
    /// to `TimedOut` rather than left loading forever.
    pub async fn wait_outcome(&mut self) -> PreviewStatus {
        if self.status != PreviewStatus::Loading {
            return self.status;
        }

        let timeout = self.config.timeout;
        let Some(rx) = self.outcome_rx.as_mut() else {
            self.error_detail = Some("no engine run attached to session".to_string());
            self.transition(PreviewStatus::Error);
            return self.status;
        };

        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(Ok(run))) => self.record_run(run),
            Ok(Some(Err(PreviewError::Timeout(_)))) => {
                self.transition(PreviewStatus::TimedOut);
            }
            Ok(Some(Err(e))) => {
                self.error_detail = Some(e.to_string());
                self.transition(PreviewStatus::Error);
            }
            Ok(None) => {
                self.error_detail = Some("engine task ended without reporting".to_string());
                self.transition(PreviewStatus::Error);
            }
            Err(_) => {
                self.transition(PreviewStatus::TimedOut);
            }
        }

        self.status
    }

    fn record_run(&mut self, run: PreviewRun) {
        self.console = run.console;
        match run.outcome {
            Ok(()) => self.transition(PreviewStatus::Success),
            Err(detail) => {
                self.error_detail = Some(detail);
                self.transition(PreviewStatus::Error);
            }
        }
    }

    /// Apply an outcome message delivered by a browser host.
    ///
    /// Hosts that render the session's document in a real frame receive
    /// the snippet's outcome as a posted message and feed it back here.
    /// The first terminal outcome wins; later messages are logged and
    /// dropped.
    pub fn apply_outcome(&mut self, message: OutcomeMessage) {
        if self.status.is_terminal() {
            warn!(
                snippet = %self.snippet.id,
                status = self.status.label(),
                "dropping outcome message for settled session"
            );
            return;
        }

        match message {
            OutcomeMessage::Success => self.transition(PreviewStatus::Success),
            OutcomeMessage::Error { error } => {
                self.error_detail = Some(error);
                self.transition(PreviewStatus::Error);
            }
        }
    }

    fn transition(&mut self, next: PreviewStatus) {
        debug!(
            snippet = %self.snippet.id,
            from = self.status.label(),
            to = next.label(),
            "preview status change"
        );
        self.status = next;
    }

    /// Copy the snippet's source text to the given sink.
    ///
    /// Copies the original source, not the transpiled form.
    pub fn copy_source(&self, sink: &mut dyn ClipboardSink) -> bool {
        sink.set_text(&self.snippet.source_text)
    }

    /// Set the preview viewport height, clamped to the configured bounds.
    pub fn set_view_height(&mut self, px: u32) {
        self.view_height = self.config.clamp_height(px);
    }

    /// Current viewport height in pixels.
    pub fn view_height(&self) -> u32 {
        self.view_height
    }

    /// Current session status.
    pub fn status(&self) -> PreviewStatus {
        self.status
    }

    /// Detail string for an `Error` status, if any.
    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    /// Console lines captured from a headless run.
    pub fn console(&self) -> &[String] {
        &self.console
    }

    /// The host document built for this snippet, once activated.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// The snippet this session previews.
    pub fn snippet(&self) -> &Snippet {
        &self.snippet
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        if let Some(task) = self.engine_task.take() {
            task.abort();
        }
    }
}
