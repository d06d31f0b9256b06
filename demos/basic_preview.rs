//! Basic example of previewing snippets through the pipeline.
//!
//! Run with: cargo run --example basic_preview
//!
//! Note: Requires quickjs.wasm to be present in assets/

use std::time::Duration;
use snippet_preview_rs::prelude::*;

#[tokio::main]
async fn main() {
    let config = PreviewConfig::builder()
        .timeout(Duration::from_secs(5))
        .max_memory(32 * 1024 * 1024) // 32MB
        .engine_path("assets/quickjs.wasm")
        .build();

    println!("Previewing with config: {:?}", config);

    // A JSX component declaration: the normalizer appends the mount call.
    println!("\n=== Test 1: JSX component ===");
    let source = r#"
function Greeting() {
    const [name] = useState("world");
    return <h1>Hello, {name}!</h1>;
}
"#;
    run_one(source, Language::Jsx, &config).await;

    // Bare markup: mounted directly.
    println!("\n=== Test 2: Bare markup ===");
    run_one("<button>Click me</button>", Language::Tsx, &config).await;

    // A plain script: console output is captured.
    println!("\n=== Test 3: Plain script ===");
    run_one(
        "for (let i = 0; i < 3; i++) console.log('count', i);",
        Language::Javascript,
        &config,
    )
    .await;

    // HTML completes without the engine at all.
    println!("\n=== Test 4: HTML snippet ===");
    run_one("<h1>Static markup</h1>", Language::Html, &config).await;

    // Unsupported languages settle immediately.
    println!("\n=== Test 5: Unsupported language ===");
    run_one("SELECT * FROM users;", Language::Sql, &config).await;
}

async fn run_one(source: &str, language: Language, config: &PreviewConfig) {
    let snippet = Snippet::new(source, language);
    let mut session = PreviewSession::new(snippet, config.clone());

    session.activate();
    let status = session.wait_outcome().await;

    println!("status: {}", status.label());
    if let Some(detail) = session.error_detail() {
        println!("detail: {}", detail);
    }
    for line in session.console() {
        println!("console: {}", line);
    }
}
