//! Error types for the preview sandbox.

use thiserror::Error;

/// Errors that can occur while driving the sandboxed preview engine.
///
/// Transpile failures are deliberately *not* represented here: they are an
/// expected outcome of feeding the pipeline arbitrary user text and are
/// carried as data (see [`crate::transpile::TranspileError`]). This enum
/// covers faults of the engine and its host plumbing.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// The execution exceeded the configured timeout.
    #[error("execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The execution exceeded memory limits.
    #[error("memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),

    /// Failed to initialize the Wasm runtime.
    #[error("failed to initialize runtime: {0}")]
    RuntimeInit(#[source] anyhow::Error),

    /// Failed to load or instantiate the JS engine module.
    #[error("failed to load JS engine: {0}")]
    EngineLoad(#[source] anyhow::Error),

    /// The snippet execution failed for a reason other than a JS throw.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A JavaScript exception was raised during execution.
    #[error("{name}: {message}")]
    JsException {
        /// The exception constructor name (e.g., "TypeError", "SyntaxError").
        name: String,
        /// The exception message.
        message: String,
        /// The engine-reported stack trace, if available.
        stack: Option<String>,
    },

    /// I/O error during execution.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The JS engine wasm file was not found.
    #[error("JS engine wasm not found at: {0}")]
    EngineNotFound(String),

    /// Execution ran out of fuel (instruction limit).
    #[error("execution ran out of fuel after {consumed:?} instructions")]
    OutOfFuel {
        /// Number of instructions consumed before running out.
        consumed: Option<u64>,
    },
}

impl PreviewError {
    /// Create a JS exception error from engine stderr output.
    ///
    /// Attempts to parse the stderr to extract exception name, message, and stack.
    pub fn from_engine_stderr(stderr: &str) -> Option<Self> {
        parse_js_exception(stderr)
    }

    /// Check if this error represents a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PreviewError::Timeout(_))
    }

    /// Check if this error represents a memory limit exceeded.
    pub fn is_memory_limit(&self) -> bool {
        matches!(self, PreviewError::MemoryLimitExceeded(_))
    }

    /// Check if this error represents a JS exception.
    pub fn is_js_exception(&self) -> bool {
        matches!(self, PreviewError::JsException { .. })
    }

    /// Check if this error represents an out-of-fuel condition.
    pub fn is_out_of_fuel(&self) -> bool {
        matches!(self, PreviewError::OutOfFuel { .. })
    }
}

/// Result type alias for sandbox operations.
pub type Result<T> = std::result::Result<T, PreviewError>;

/// Parse a JavaScript exception from engine stderr output.
///
/// QuickJS reports uncaught exceptions as `Name: message` followed by
/// indented `at func (file:line)` stack frames. The parse is lenient: the
/// first line that looks like an exception wins, and everything indented
/// below it becomes the stack.
pub fn parse_js_exception(stderr: &str) -> Option<PreviewError> {
    if stderr.trim().is_empty() {
        return None;
    }

    let lines: Vec<&str> = stderr.lines().collect();

    let mut exception_line = None;
    for (i, line) in lines.iter().enumerate() {
        if !line.starts_with(' ') && !line.is_empty() && looks_like_exception(line) {
            exception_line = Some((i, *line));
            break;
        }
    }

    let (line_idx, exception_str) = exception_line?;

    let (name, message) = if let Some(colon_pos) = exception_str.find(':') {
        let name = exception_str[..colon_pos].trim().to_string();
        let msg = exception_str[colon_pos + 1..].trim().to_string();
        (name, msg)
    } else {
        (exception_str.trim().to_string(), String::new())
    };

    // Stack frames are the indented lines immediately following the exception.
    let mut stack_lines = Vec::new();
    for line in &lines[line_idx + 1..] {
        let trimmed = line.trim_start();
        if trimmed.starts_with("at ") {
            stack_lines.push(*line);
        } else {
            break;
        }
    }
    let stack = if stack_lines.is_empty() {
        None
    } else {
        Some(stack_lines.join("\n"))
    };

    Some(PreviewError::JsException {
        name,
        message,
        stack,
    })
}

/// Check if a line looks like a JavaScript exception header.
fn looks_like_exception(line: &str) -> bool {
    let standalone = ["InternalError", "EvalError", "AggregateError"];

    let first_char = line.chars().next();
    if !first_char.map(|c| c.is_ascii_uppercase()).unwrap_or(false) {
        return false;
    }

    if let Some(idx) = line.find("Error") {
        // Name must be a single identifier ending in "Error" followed by a
        // colon, space, or end of line.
        let head = &line[..idx];
        if head.chars().all(|c| c.is_ascii_alphanumeric()) {
            let after_idx = idx + "Error".len();
            let after_ok = after_idx >= line.len()
                || line.as_bytes()[after_idx] == b':'
                || line.as_bytes()[after_idx] == b' ';
            if after_ok {
                return true;
            }
        }
    }

    standalone.iter().any(|exc| {
        line.starts_with(exc) && {
            let after_idx = exc.len();
            after_idx >= line.len()
                || line.as_bytes()[after_idx] == b':'
                || line.as_bytes()[after_idx] == b' '
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_exception() {
        let stderr = "ReferenceError: x is not defined";
        let result = parse_js_exception(stderr);

        assert!(result.is_some());
        if let Some(PreviewError::JsException {
            name,
            message,
            stack,
        }) = result
        {
            assert_eq!(name, "ReferenceError");
            assert_eq!(message, "x is not defined");
            assert!(stack.is_none());
        } else {
            panic!("Expected JsException");
        }
    }

    #[test]
    fn test_parse_exception_with_stack() {
        let stderr =
            "TypeError: not a function\n    at <eval> (<input>:3)\n    at run (<input>:7)";
        let result = parse_js_exception(stderr);

        assert!(result.is_some());
        if let Some(PreviewError::JsException {
            name,
            message,
            stack,
        }) = result
        {
            assert_eq!(name, "TypeError");
            assert_eq!(message, "not a function");
            let stack = stack.expect("stack frames");
            assert!(stack.contains("<eval>"));
            assert!(stack.contains("run"));
        } else {
            panic!("Expected JsException");
        }
    }

    #[test]
    fn test_parse_exception_no_message() {
        let stderr = "InternalError";
        let result = parse_js_exception(stderr);

        assert!(result.is_some());
        if let Some(PreviewError::JsException { name, message, .. }) = result {
            assert_eq!(name, "InternalError");
            assert!(message.is_empty());
        } else {
            panic!("Expected JsException");
        }
    }

    #[test]
    fn test_parse_empty_stderr() {
        assert!(parse_js_exception("").is_none());
        assert!(parse_js_exception("   ").is_none());
    }

    #[test]
    fn test_plain_output_is_not_exception() {
        assert!(parse_js_exception("hello world").is_none());
        assert!(parse_js_exception("error: lowercase tool output").is_none());
    }

    #[test]
    fn test_error_helpers() {
        let timeout = PreviewError::Timeout(std::time::Duration::from_secs(5));
        assert!(timeout.is_timeout());
        assert!(!timeout.is_memory_limit());
        assert!(!timeout.is_js_exception());

        let memory = PreviewError::MemoryLimitExceeded("test".to_string());
        assert!(!memory.is_timeout());
        assert!(memory.is_memory_limit());

        let js_exc = PreviewError::JsException {
            name: "TypeError".to_string(),
            message: "test".to_string(),
            stack: None,
        };
        assert!(js_exc.is_js_exception());
    }
}
