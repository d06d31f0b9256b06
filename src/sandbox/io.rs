//! Output capture for engine runs.
//!
//! The sandbox gets no terminal: stdout and stderr are bounded in-memory
//! pipes, read back after the run. Stdout carries both the console lines
//! and the outcome sentinel (see [`super::message`]); stderr carries the
//! engine's own exception reports. Bounding the pipes keeps a snippet that
//! prints in a tight loop from exhausting host memory before the timeout
//! lands.

use wasmtime_wasi::pipe::MemoryOutputPipe;

/// Default per-stream capture limit in bytes.
pub const DEFAULT_CAPTURE_LIMIT: usize = 1024 * 1024;

/// Captured output streams for one engine run.
pub struct SandboxIo {
    stdout: MemoryOutputPipe,
    stderr: MemoryOutputPipe,
}

impl SandboxIo {
    /// Create capture pipes with the default size limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_CAPTURE_LIMIT)
    }

    /// Create capture pipes with an explicit per-stream size limit.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            stdout: MemoryOutputPipe::new(limit),
            stderr: MemoryOutputPipe::new(limit),
        }
    }

    /// Pipe handle to install as the sandbox's stdout.
    pub fn stdout_pipe(&self) -> MemoryOutputPipe {
        self.stdout.clone()
    }

    /// Pipe handle to install as the sandbox's stderr.
    pub fn stderr_pipe(&self) -> MemoryOutputPipe {
        self.stderr.clone()
    }

    /// Captured stdout as a string (lossy on invalid UTF-8).
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout.contents()).to_string()
    }

    /// Captured stderr as a string (lossy on invalid UTF-8).
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr.contents()).to_string()
    }
}

impl Default for SandboxIo {
    fn default() -> Self {
        Self::new()
    }
}
