//! Integration tests for the Igloo agent
//!
//! These tests require a running agent and are skipped otherwise.
//! Run with: IGLOO_AGENT_TEST_URL=http://127.0.0.1:5127 cargo test

use integration_tests::*;

macro_rules! agent_or_skip {
    () => {
        match TestConfig::from_env() {
            Some(config) => config,
            None => {
                eprintln!("IGLOO_AGENT_TEST_URL not set, skipping");
                return;
            }
        }
    };
}

// ============================================================================
// Health Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let config = agent_or_skip!();

    let response = config
        .client
        .get(config.url("/health"))
        .send()
        .await
        .expect("Failed to send health request");

    assert!(
        response.status().is_success(),
        "Health check failed with status: {}",
        response.status()
    );

    let health: HealthResponse = response.json().await.expect("Failed to parse health response");
    assert_eq!(health.status, "healthy");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_hello_world() {
    let config = agent_or_skip!();

    let response = config
        .client
        .get(config.url("/"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.expect("Failed to read body"), "Hello World");
}

// ============================================================================
// Command Tests
// ============================================================================

#[tokio::test]
async fn test_successful_command() {
    let config = agent_or_skip!();

    let response = config
        .run_command("echo hi")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 500);

    let body: RunCommandResponse = response.json().await.expect("Failed to parse response");
    assert!(body.ok);
    assert_eq!(body.message, "Successfully ran command.");
    assert_eq!(body.out.as_deref(), Some("hi\n"));
}

#[tokio::test]
async fn test_failing_command() {
    let config = agent_or_skip!();

    let response = config
        .run_command("echo before; exit 1")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);

    let body: RunCommandResponse = response.json().await.expect("Failed to parse response");
    assert!(!body.ok);
    assert_eq!(body.message, "This command failed to run.");
    assert_eq!(body.out.as_deref(), Some("before\n"));
}

#[tokio::test]
async fn test_missing_command_field() {
    let config = agent_or_skip!();

    let response = config
        .authorized(config.client.post(config.url("/")))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 500);

    let body: RunCommandResponse = response.json().await.expect("Failed to parse response");
    assert!(!body.ok);
    assert_eq!(body.message, "Failed to eval command. Please try again later...");
    assert!(body.out.is_none());
}

#[tokio::test]
async fn test_concurrent_commands() {
    let config = agent_or_skip!();

    let requests = (0..4).map(|i| config.run_command(&format!("sleep 1; echo {}", i)).send());
    let started = std::time::Instant::now();
    let responses = spawn_all(requests).await;

    // Commands run side by side, not one after another
    assert!(started.elapsed().as_secs() < 4);
    for response in responses {
        let response = response.expect("Failed to send request");
        assert_eq!(response.status().as_u16(), 500);
    }
}

async fn spawn_all<F, T>(futures: impl Iterator<Item = F>) -> Vec<T>
where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.expect("Task panicked"));
    }
    results
}
