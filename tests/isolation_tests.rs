//! Isolation and execution tests for the headless engine path.
//!
//! These run real snippets through the QuickJS wasm build and verify both
//! the outcome protocol and the sandbox boundaries. They require
//! assets/quickjs.wasm and are ignored by default.

use std::time::Duration;

use snippet_preview_rs::prelude::*;

/// Helper to create a test sandbox config.
fn test_config() -> PreviewConfig {
    PreviewConfig::builder()
        .timeout(Duration::from_secs(5))
        .max_memory(32 * 1024 * 1024)
        .build()
}

async fn settle(source: &str, language: Language) -> (PreviewStatus, Option<String>, Vec<String>) {
    let snippet = Snippet::new(source, language);
    let mut session = PreviewSession::new(snippet, test_config());
    session.activate();
    let status = session.wait_outcome().await;
    (
        status,
        session.error_detail().map(str::to_string),
        session.console().to_vec(),
    )
}

/// A component declaration gets mounted by name and succeeds.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_named_component_renders() {
    let source = "function Widget(){ return <button>Click</button> }";
    let (status, detail, _) = settle(source, Language::Jsx).await;

    assert_eq!(status, PreviewStatus::Success, "detail: {detail:?}");
}

/// Plain script output is captured as console lines, no throw means
/// success.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_plain_script_logs_and_succeeds() {
    let (status, _, console) = settle("console.log(1/0)", Language::Javascript).await;

    assert_eq!(status, PreviewStatus::Success);
    assert!(console.iter().any(|line| line.contains("Infinity")));
}

/// A top-level throw is caught by the guarded wrapper and surfaces as an
/// error outcome carrying the message.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_throw_becomes_error_outcome() {
    let (status, detail, _) = settle("throw new Error(\"boom\")", Language::Javascript).await;

    assert_eq!(status, PreviewStatus::Error);
    assert!(detail.unwrap().contains("boom"));
}

/// An undefined reference surfaces as an error, not a hang or a crash.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_reference_error_surfaces() {
    let (status, detail, _) = settle("definitelyNotDefined();", Language::Javascript).await;

    assert_eq!(status, PreviewStatus::Error);
    assert!(detail.unwrap().contains("definitelyNotDefined"));
}

/// An infinite loop is demoted to `TimedOut` instead of spinning forever.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_infinite_loop_times_out() {
    let config = PreviewConfig::builder()
        .timeout(Duration::from_millis(500))
        .max_memory(32 * 1024 * 1024)
        .build();

    let snippet = Snippet::new("while (true) {}", Language::Javascript);
    let mut session = PreviewSession::new(snippet, config);
    session.activate();
    assert_eq!(session.status(), PreviewStatus::Loading);

    let status = session.wait_outcome().await;
    assert_eq!(status, PreviewStatus::TimedOut);
}

/// Timeout at the executor level reports the configured duration.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_executor_timeout_error() {
    let config = PreviewConfig::builder()
        .timeout(Duration::from_millis(200))
        .build();

    let sandbox = JsSandbox::new(config).unwrap();
    let result = sandbox.execute("while (true) {}").await;

    assert!(
        matches!(result, Err(PreviewError::Timeout(_))),
        "infinite loop should time out"
    );
}

/// The engine gets no preopened directories, so snippets cannot see the
/// host filesystem.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_filesystem_access_blocked() {
    let sandbox = JsSandbox::new(test_config()).unwrap();

    let result = sandbox
        .execute(
            r#"
try {
    const data = std.loadFile('/etc/passwd');
    print(data ? 'BREACH: file read succeeded' : 'BLOCKED');
} catch (e) {
    print('BLOCKED: ' + e.name);
}
"#,
        )
        .await;

    if let Ok(res) = result {
        assert!(
            !res.stdout.contains("BREACH"),
            "filesystem access should be blocked"
        );
    }
    // Execution error is also acceptable
}

/// No network globals exist in the engine at all.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_network_globals_absent() {
    let sandbox = JsSandbox::new(test_config()).unwrap();

    let result = sandbox
        .execute("print(typeof fetch, typeof XMLHttpRequest, typeof WebSocket)")
        .await
        .unwrap();

    assert_eq!(result.stdout.trim(), "undefined undefined undefined");
}

/// Runaway allocation hits the memory limiter before it hurts the host.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_memory_limit_enforced() {
    let config = PreviewConfig::builder()
        .timeout(Duration::from_secs(10))
        .max_memory(16 * 1024 * 1024)
        .build();

    let sandbox = JsSandbox::new(config).unwrap();
    let result = sandbox
        .execute("const chunks = []; while (true) { chunks.push(new Array(1e6).fill(0)); }")
        .await;

    assert!(
        matches!(
            result,
            Err(PreviewError::MemoryLimitExceeded(_)) | Err(PreviewError::Timeout(_))
        ),
        "allocation loop should hit a resource limit"
    );
}

/// Sessions are independent: a failing snippet does not poison a
/// succeeding one running concurrently.
#[tokio::test]
#[ignore = "requires quickjs.wasm"]
async fn test_sessions_are_independent() {
    let good = tokio::spawn(settle("console.log('ok')", Language::Javascript));
    let bad = tokio::spawn(settle("throw new Error('bad')", Language::Javascript));

    let (good_status, _, _) = good.await.unwrap();
    let (bad_status, bad_detail, _) = bad.await.unwrap();

    assert_eq!(good_status, PreviewStatus::Success);
    assert_eq!(bad_status, PreviewStatus::Error);
    assert!(bad_detail.unwrap().contains("bad"));
}
