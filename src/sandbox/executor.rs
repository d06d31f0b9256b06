//! Core execution engine for headless snippet runs.
//!
//! Runs transpiled snippets inside a QuickJS build compiled to WASI,
//! hosted by Wasmtime with epoch interruption, memory limits, and
//! optional fuel metering. The snippet is wrapped by the runtime shim
//! (see [`super::shim`]) so its outcome comes back as a sentinel line
//! on stdout.

use std::sync::Arc;

use wasmtime::{Engine, Linker, Module, Store};
use wasmtime_wasi::preview1;
use wasmtime_wasi::{I32Exit, WasiCtxBuilder};

use crate::error::{parse_js_exception, PreviewError, Result};
use crate::sandbox::cache::{global_cache, SharedEngine};
use crate::sandbox::config::PreviewConfig;
use crate::sandbox::io::SandboxIo;
use crate::sandbox::limits::{StoreData, StoreLimiterExt};
use crate::sandbox::message::{split_run_output, OutcomeMessage, RunOutput};
use crate::sandbox::shim::headless_program;

/// Result of one engine run.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Captured stdout output.
    pub stdout: String,
    /// Captured stderr output.
    pub stderr: String,
    /// Exit code (0 for success).
    pub exit_code: i32,
}

impl ExecutionResult {
    /// Check if the execution was successful (exit code 0).
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Outcome of a headless preview run, after sentinel parsing.
#[derive(Debug, Clone)]
pub struct PreviewRun {
    /// The tri-state outcome reported by the snippet, mapped to a result.
    pub outcome: std::result::Result<(), String>,
    /// Console lines emitted before the outcome.
    pub console: Vec<String>,
}

/// A sandboxed JavaScript execution environment.
///
/// The engine module is compiled once and shared process-wide through the
/// global module cache, so constructing additional sandboxes is cheap.
pub struct JsSandbox {
    config: PreviewConfig,
    engine: SharedEngine,
    module: Arc<Module>,
}

impl JsSandbox {
    /// Create a new JS sandbox with the given configuration.
    pub fn new(config: PreviewConfig) -> Result<Self> {
        let engine = if config.max_fuel.is_some() {
            SharedEngine::with_fuel()?
        } else {
            SharedEngine::new()?
        };

        let module = global_cache().get_or_compile(engine.engine(), &config.engine_path)?;

        Ok(Self {
            config,
            engine,
            module,
        })
    }

    /// The configuration this sandbox was built with.
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Execute JavaScript source in the sandbox.
    ///
    /// The code must already be transpiled: the engine understands plain
    /// JavaScript only. Returns the raw captured streams and exit code;
    /// use [`run_preview`](Self::run_preview) for outcome parsing.
    pub async fn execute(&self, code: &str) -> Result<ExecutionResult> {
        let code = code.to_string();
        let timeout = self.config.timeout;
        let epoch_interval = self.config.epoch_tick_interval;
        let max_memory = self.config.max_memory;
        let max_fuel = self.config.max_fuel;
        let engine = self.engine.arc();
        let module = Arc::clone(&self.module);

        // Spawn the epoch ticker task
        let ticker_engine = Arc::clone(&engine);
        let ticker_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(epoch_interval);
            loop {
                interval.tick().await;
                ticker_engine.increment_epoch();
            }
        });

        let exec_engine = Arc::clone(&engine);
        let exec_handle = tokio::task::spawn_blocking(move || {
            Self::execute_sync(&exec_engine, &module, &code, max_memory, max_fuel)
        });

        // Race between execution and timeout
        let result = tokio::select! {
            result = exec_handle => {
                ticker_handle.abort();
                match result {
                    Ok(inner_result) => inner_result,
                    Err(e) => Err(PreviewError::ExecutionFailed(format!("task panicked: {}", e))),
                }
            }
            _ = tokio::time::sleep(timeout) => {
                ticker_handle.abort();
                engine.increment_epoch(); // Force interrupt
                Err(PreviewError::Timeout(timeout))
            }
        };

        result
    }

    /// Run a transpiled snippet headlessly and parse its outcome.
    ///
    /// Wraps the snippet in the runtime shim, executes it, and maps the
    /// sentinel / stderr / exit code onto a single outcome:
    ///
    /// 1. A sentinel parsed from stdout wins outright.
    /// 2. Otherwise stderr is scanned for an uncaught JS exception.
    /// 3. Otherwise a nonzero exit code is reported as an execution failure.
    /// 4. A clean exit with no sentinel means the shim never ran, which is
    ///    itself an error.
    pub async fn run_preview(&self, transpiled: &str) -> Result<PreviewRun> {
        let program = headless_program(transpiled);
        let result = self.execute(&program).await?;
        let RunOutput { outcome, console } = split_run_output(&result.stdout);

        let outcome = match outcome {
            Some(OutcomeMessage::Success) => Ok(()),
            Some(OutcomeMessage::Error { error }) => Err(error),
            None => {
                if let Some(exc) = parse_js_exception(&result.stderr) {
                    Err(exc.to_string())
                } else if !result.is_success() {
                    Err(format!("engine exited with code {}", result.exit_code))
                } else {
                    Err("no outcome reported".to_string())
                }
            }
        };

        Ok(PreviewRun { outcome, console })
    }

    /// Synchronous execution (runs in blocking task).
    fn execute_sync(
        engine: &Engine,
        module: &Module,
        code: &str,
        max_memory: u64,
        max_fuel: Option<u64>,
    ) -> Result<ExecutionResult> {
        // Set up I/O capture
        let io = SandboxIo::new();

        // Build WASI context with no filesystem or network access
        let wasi_ctx = WasiCtxBuilder::new()
            // Pass the JS code via command line argument
            .args(&["qjs", "-e", code])
            .stdout(io.stdout_pipe())
            .stderr(io.stderr_pipe())
            // No preopened directories (filesystem isolation)
            // No network access (WASI Preview 1 doesn't have sockets anyway)
            // Inherit nothing from host environment
            .build_p1();

        // Create store with resource limiter
        let store_data = StoreData::new(max_memory, wasi_ctx);
        let mut store = Store::new(engine, store_data);
        store.configure_limiter();

        // Set epoch deadline for timeout
        store.epoch_deadline_trap();
        store.set_epoch_deadline(1);

        // Set fuel limit if configured
        if let Some(fuel) = max_fuel {
            store.set_fuel(fuel).map_err(|e| {
                PreviewError::RuntimeInit(anyhow::anyhow!("failed to set fuel: {}", e))
            })?;
        }

        // Link WASI Preview 1
        let mut linker = Linker::new(engine);
        preview1::add_to_linker_sync(&mut linker, |data: &mut StoreData| &mut data.wasi)
            .map_err(|e| PreviewError::RuntimeInit(anyhow::anyhow!("failed to link WASI: {}", e)))?;

        // Instantiate the module
        let instance = linker.instantiate(&mut store, module).map_err(|e| {
            if store.data().limiter.limit_exceeded() {
                return PreviewError::MemoryLimitExceeded(
                    "memory limit exceeded during instantiation".to_string(),
                );
            }
            PreviewError::EngineLoad(anyhow::anyhow!("failed to instantiate: {}", e))
        })?;

        // Get the _start function (WASI entry point)
        let start = instance
            .get_typed_func::<(), ()>(&mut store, "_start")
            .map_err(|e| {
                PreviewError::EngineLoad(anyhow::anyhow!("failed to get _start function: {}", e))
            })?;

        // Execute
        let exit_code = match start.call(&mut store, ()) {
            Ok(()) => 0,
            Err(e) => {
                if store.data().limiter.limit_exceeded() {
                    return Err(PreviewError::MemoryLimitExceeded(
                        "memory limit exceeded during execution".to_string(),
                    ));
                }

                // Check for epoch interrupt (timeout)
                if e.to_string().contains("epoch") || e.to_string().contains("interrupt") {
                    return Err(PreviewError::Timeout(std::time::Duration::from_secs(0)));
                }

                // Check for fuel exhaustion
                if e.to_string().contains("fuel") {
                    let consumed = max_fuel;
                    return Err(PreviewError::OutOfFuel { consumed });
                }

                // Check for WASI exit code
                if let Some(exit) = e.downcast_ref::<I32Exit>() {
                    exit.0
                } else {
                    return Err(PreviewError::ExecutionFailed(e.to_string()));
                }
            }
        };

        Ok(ExecutionResult {
            stdout: io.stdout_str(),
            stderr: io.stderr_str(),
            exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // These tests require the QuickJS wasm build to be present and are
    // ignored by default.

    #[tokio::test]
    #[ignore = "requires quickjs.wasm"]
    async fn test_simple_execution() {
        let config = PreviewConfig::builder()
            .timeout(Duration::from_secs(5))
            .max_memory(32 * 1024 * 1024)
            .build();

        let sandbox = JsSandbox::new(config).unwrap();
        let result = sandbox.execute("print(1 + 1)").await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.stdout.trim(), "2");
    }

    #[tokio::test]
    #[ignore = "requires quickjs.wasm"]
    async fn test_timeout() {
        let config = PreviewConfig::builder()
            .timeout(Duration::from_millis(100))
            .build();

        let sandbox = JsSandbox::new(config).unwrap();
        let result = sandbox.execute("while (true) {}").await;

        assert!(matches!(result, Err(PreviewError::Timeout(_))));
    }

    #[tokio::test]
    #[ignore = "requires quickjs.wasm"]
    async fn test_preview_success_outcome() {
        let sandbox = JsSandbox::new(PreviewConfig::default()).unwrap();
        let run = sandbox
            .run_preview("render(React.createElement('h1', null, 'hi'));")
            .await
            .unwrap();

        assert!(run.outcome.is_ok());
    }

    #[tokio::test]
    #[ignore = "requires quickjs.wasm"]
    async fn test_preview_error_outcome() {
        let sandbox = JsSandbox::new(PreviewConfig::default()).unwrap();
        let run = sandbox.run_preview("undefinedFn();").await.unwrap();

        let err = run.outcome.unwrap_err();
        assert!(err.contains("undefinedFn"));
    }
}
