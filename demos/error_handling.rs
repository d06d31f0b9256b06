//! Example demonstrating error handling patterns.
//!
//! This example shows how the pipeline surfaces various failures:
//! - Transpile errors (no engine involved)
//! - JavaScript throws
//! - Timeouts
//! - Unsupported languages
//!
//! Run with: cargo run --example error_handling
//!
//! Note: Requires quickjs.wasm to be present in assets/

use std::time::Duration;
use snippet_preview_rs::error::parse_js_exception;
use snippet_preview_rs::prelude::*;

#[tokio::main]
async fn main() {
    println!("=== Error Handling Example ===\n");

    let config = PreviewConfig::builder()
        .timeout(Duration::from_secs(5))
        .max_memory(64 * 1024 * 1024)
        .engine_path("assets/quickjs.wasm")
        .build();

    // Example 1: transpile failure. An unterminated tag errors before any
    // sandbox is constructed.
    println!("--- Test 1: Transpile error ---");
    {
        let snippet = Snippet::new("const x = <div>", Language::Tsx);
        let mut session = PreviewSession::new(snippet, config.clone());
        session.activate();

        println!("status: {}", session.status().label());
        println!("detail: {}", session.error_detail().unwrap_or("<none>"));
    }

    // Example 2: a runtime throw is caught by the guarded wrapper.
    println!("\n--- Test 2: JavaScript throw ---");
    {
        let snippet = Snippet::new("throw new Error('boom')", Language::Javascript);
        let mut session = PreviewSession::new(snippet, config.clone());
        session.activate();
        let status = session.wait_outcome().await;

        println!("status: {}", status.label());
        if let Some(detail) = session.error_detail() {
            println!("detail: {}", detail);
        }
    }

    // Example 3: direct executor use, parsing the engine's own exception
    // report from stderr.
    println!("\n--- Test 3: Raw engine exception ---");
    {
        match JsSandbox::new(config.clone()) {
            Ok(sandbox) => match sandbox.execute("nope();").await {
                Ok(result) => {
                    println!("exit code: {}", result.exit_code);
                    if let Some(PreviewError::JsException { name, message, .. }) =
                        parse_js_exception(&result.stderr)
                    {
                        println!("exception: {}: {}", name, message);
                    }
                }
                Err(e) => println!("execution error: {}", e),
            },
            Err(e) => {
                eprintln!("Failed to create sandbox: {}", e);
                eprintln!("Make sure quickjs.wasm is present in the assets/ directory.");
            }
        }
    }

    // Example 4: an infinite loop is demoted to timed out.
    println!("\n--- Test 4: Timeout ---");
    {
        let fast = PreviewConfig::builder()
            .timeout(Duration::from_millis(500))
            .engine_path("assets/quickjs.wasm")
            .build();

        let snippet = Snippet::new("while (true) {}", Language::Javascript);
        let mut session = PreviewSession::new(snippet, fast);
        session.activate();
        let status = session.wait_outcome().await;

        println!("status: {}", status.label());
    }

    // Example 5: unsupported language, settled at construction.
    println!("\n--- Test 5: Unsupported language ---");
    {
        let snippet = Snippet::new("print('hello')", Language::Python);
        let session = PreviewSession::new(snippet, config);
        println!("status: {}", session.status().label());
    }
}
