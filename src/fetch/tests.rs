use crate::fetch::{flatten, request_batch, ChunkOutcome, FetchClient, RetryPolicy};
use color_eyre::eyre::{eyre, Report, Result};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_jitter: Duration::ZERO,
        timeout: Duration::from_secs(5),
    }
}

#[test]
fn backoff_delays_increase() {
    let policy = RetryPolicy::default();
    for attempt in 0..4 {
        let longest = policy.delay(attempt, policy.max_jitter);
        let next_shortest = policy.delay(attempt + 1, Duration::ZERO);
        assert!(longest < next_shortest, "attempt {attempt}: {longest:?} >= {next_shortest:?}");
    }
}

#[test]
fn backoff_jitter_is_bounded() {
    let policy = RetryPolicy::default();
    for _ in 0..100 {
        let delay = policy.backoff(1);
        assert!(delay >= Duration::from_millis(2000));
        assert!(delay <= Duration::from_millis(2500));
    }
}

#[tokio::test]
async fn server_errors_exhaust_attempts() -> Result<(), Report> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/always-500"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = FetchClient::new(fast_policy())?;
    let url = format!("{}/always-500", server.uri());
    let result = client.request_with_retry(|c| c.get(&url)).await;

    assert!(result.is_err());
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn client_errors_are_not_retried() -> Result<(), Report> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = FetchClient::new(fast_policy())?;
    let url = format!("{}/missing", server.uri());
    let fetched = client.request_with_retry(|c| c.get(&url)).await?;

    assert_eq!(fetched.status.as_u16(), 404);
    assert!(!fetched.is_transient());
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn rate_limit_is_retried_until_success() -> Result<(), Report> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = FetchClient::new(fast_policy())?;
    let url = format!("{}/limited", server.uri());
    let fetched = client.request_with_retry(|c| c.get(&url)).await?;

    assert!(fetched.is_success());
    assert_eq!(fetched.body, "ok");
    let received = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 3);
    Ok(())
}

#[tokio::test]
async fn slow_responses_time_out() -> Result<(), Report> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let policy = RetryPolicy { max_attempts: 2, timeout: Duration::from_millis(50), ..fast_policy() };
    let client = FetchClient::new(policy)?;
    let url = format!("{}/slow", server.uri());
    let result = client.request_with_retry(|c| c.get(&url)).await;

    let error = format!("{:#}", result.expect_err("slow request should time out"));
    assert!(error.contains("timed out"), "{error}");
    Ok(())
}

#[tokio::test]
async fn failed_chunk_is_isolated() {
    let items: Vec<usize> = (0..120).collect();
    let outcomes = request_batch(&items, 50, |chunk| async move {
        match chunk.first() {
            Some(50) => Err(eyre!("chunk unavailable")),
            _ => Ok(chunk),
        }
    })
    .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes.iter().map(ChunkOutcome::index).collect::<Vec<_>>(), [0, 1, 2]);
    assert!(matches!(&outcomes[1], ChunkOutcome::Failed { reason, .. } if reason.contains("chunk unavailable")));
    assert_eq!(outcomes[1].identifiers(), (50..100).collect::<Vec<_>>());
    assert_eq!(outcomes[2].identifiers().len(), 20);

    let observed = flatten(outcomes);
    let expected: Vec<usize> = (0..50).chain(100..120).collect();
    assert_eq!(observed, expected);
}

#[tokio::test]
async fn empty_batch_has_no_chunks() {
    let items: Vec<String> = Vec::new();
    let outcomes = request_batch(&items, 50, |chunk| async move { Ok(chunk) }).await;
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn successful_empty_chunk_is_not_failure() {
    let items = vec!["rs1".to_string()];
    let outcomes: Vec<ChunkOutcome<String, String>> =
        request_batch(&items, 50, |_chunk| async move { Ok(Vec::new()) }).await;
    assert_eq!(outcomes, [ChunkOutcome::Success { index: 0, identifiers: items, items: Vec::new() }]);
}

#[tokio::test]
async fn unbuildable_request_is_not_retried() -> Result<(), Report> {
    let policy = RetryPolicy { base_delay: Duration::from_secs(60), ..fast_policy() };
    let client = FetchClient::new(policy)?;

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.request_with_retry(|c| c.get("not a url")),
    )
    .await?;

    let error = format!("{:#}", result.expect_err("invalid url should fail"));
    assert!(error.contains("Failed to build request"), "{error}");
    Ok(())
}
