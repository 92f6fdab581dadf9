//! HTTP requests with a timeout, retry with exponential backoff and jitter, and chunked batches.

#[cfg(test)]
mod tests;

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use futures::future::join_all;
use log::{debug, warn};
use rand::Rng;
use reqwest::{Client, Request, RequestBuilder, StatusCode};
use std::future::Future;
use std::time::Duration;

// ----------------------------------------------------------------------------
// Retry Policy
// ----------------------------------------------------------------------------

/// How many times, and how patiently, a request is attempted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt, doubled after each subsequent one.
    pub base_delay: Duration,
    /// Upper bound of the random jitter added to each delay.
    pub max_jitter: Duration,
    /// Time limit for a single attempt, including reading the body.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    /// Returns the delay after failed `attempt` (0-based) with a given `jitter`.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use varlens::fetch::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay(0, Duration::ZERO), Duration::from_millis(1000));
    /// assert_eq!(policy.delay(1, Duration::ZERO), Duration::from_millis(2000));
    /// assert_eq!(policy.delay(2, Duration::from_millis(250)), Duration::from_millis(4250));
    /// ```
    pub fn delay(&self, attempt: u32, jitter: Duration) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(attempt)) + jitter
    }

    /// Returns the delay after failed `attempt` with random jitter in `0..=max_jitter`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let max_jitter = self.max_jitter.as_millis() as u64;
        let jitter = match max_jitter {
            0 => 0,
            max => rand::thread_rng().gen_range(0..=max),
        };
        self.delay(attempt, Duration::from_millis(jitter))
    }
}

// ----------------------------------------------------------------------------
// Fetched
// ----------------------------------------------------------------------------

/// A completed HTTP exchange, with the body fully read.
#[derive(Clone, Debug, PartialEq)]
pub struct Fetched {
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl Fetched {
    /// True for 429 and 5xx responses, which are worth retrying.
    pub fn is_transient(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS || self.status.is_server_error()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

// ----------------------------------------------------------------------------
// Fetch Client
// ----------------------------------------------------------------------------

/// An HTTP client that applies a [`RetryPolicy`] to every request.
///
/// Construct once and share, the inner [`reqwest::Client`] pools connections.
#[derive(Clone, Debug)]
pub struct FetchClient {
    client: Client,
    policy: RetryPolicy,
}

impl FetchClient {
    /// Returns a new [`FetchClient`].
    ///
    /// ```rust
    /// use varlens::fetch::{FetchClient, RetryPolicy};
    ///
    /// let client = FetchClient::new(RetryPolicy::default())?;
    /// assert_eq!(client.policy().max_attempts, 3);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn new(policy: RetryPolicy) -> Result<Self, Report> {
        let user_agent = format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .wrap_err("Failed to build HTTP client.")?;
        Ok(FetchClient { client, policy })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send a request, retrying transient failures.
    ///
    /// `build` is called once per attempt to construct the request.
    ///
    /// - 2xx and 4xx (except 429) responses are returned immediately, client errors are not retried.
    /// - 429, 5xx, network errors and timeouts are retried with [`RetryPolicy::backoff`] between attempts.
    /// - After the last attempt, the last failure is returned as an error.
    /// - A request that cannot be built is an error without any retry.
    pub async fn request_with_retry<F>(&self, build: F) -> Result<Fetched, Report>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = eyre!("No request attempts were made.");

        for attempt in 0..max_attempts {
            // Build errors (ex. invalid URL) are not retried.
            let request = build(&self.client).build().wrap_err("Failed to build request.")?;
            match self.attempt(request).await {
                Ok(fetched) if fetched.is_transient() => {
                    last_error = eyre!("Request failed: {}", fetched.url)
                        .suggestion(format!("Status code: {}", fetched.status));
                }
                Ok(fetched) => return Ok(fetched),
                Err(e) => last_error = e,
            }

            if attempt + 1 < max_attempts {
                let delay = self.policy.backoff(attempt);
                warn!(
                    "Attempt {}/{max_attempts} failed, retrying in {delay:?}: {last_error}",
                    attempt + 1
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.wrap_err(format!("Request failed after {max_attempts} attempts.")))
    }

    /// A single attempt, bounded by the policy timeout. Dropping the future on timeout aborts the request.
    async fn attempt(&self, request: Request) -> Result<Fetched, Report> {
        let url = request.url().to_string();
        debug!("{} {url}", request.method());

        let exchange = async {
            let response = self.client.execute(request).await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        match tokio::time::timeout(self.policy.timeout, exchange).await {
            Ok(Ok((status, body))) => Ok(Fetched { url, status, body }),
            Ok(Err(e)) => Err(eyre!(e).wrap_err(format!("Request failed: {url}"))),
            Err(_) => Err(eyre!("Request timed out after {:?}: {url}", self.policy.timeout)),
        }
    }
}

// ----------------------------------------------------------------------------
// Batches
// ----------------------------------------------------------------------------

/// The outcome of one chunk of a batch request.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkOutcome<I, T> {
    /// The chunk request succeeded, possibly with zero results.
    Success { index: usize, identifiers: Vec<I>, items: Vec<T> },
    /// The chunk request failed, results for its identifiers are absent from the batch.
    Failed { index: usize, identifiers: Vec<I>, reason: String },
}

impl<I, T> ChunkOutcome<I, T> {
    pub fn index(&self) -> usize {
        match self {
            ChunkOutcome::Success { index, .. } | ChunkOutcome::Failed { index, .. } => *index,
        }
    }

    /// The inputs that were sent in this chunk.
    pub fn identifiers(&self) -> &[I] {
        match self {
            ChunkOutcome::Success { identifiers, .. } | ChunkOutcome::Failed { identifiers, .. } => identifiers,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ChunkOutcome::Failed { .. })
    }
}

/// Split `items` into chunks of at most `chunk_size` and request all chunks concurrently.
///
/// A failed chunk does not affect its siblings. Outcomes are returned in chunk order.
///
/// ## Examples
///
/// ```rust
/// use color_eyre::eyre::eyre;
/// use varlens::fetch::{flatten, request_batch, ChunkOutcome};
/// # use tokio_test::block_on;
///
/// let items: Vec<u32> = (0..7).collect();
/// # block_on(async {
/// let outcomes = request_batch(&items, 3, |chunk| async move {
///     match chunk.contains(&4) {
///         true => Err(eyre!("chunk failed")),
///         false => Ok(chunk.iter().map(|i| i * 10).collect::<Vec<u32>>()),
///     }
/// })
/// .await;
///
/// assert_eq!(outcomes.len(), 3);
/// assert!(outcomes[1].is_failed());
/// assert_eq!(outcomes[1].identifiers(), [3, 4, 5]);
/// assert_eq!(flatten(outcomes), [0, 10, 20, 60]);
/// # });
/// ```
pub async fn request_batch<I, T, F, Fut>(
    items: &[I],
    chunk_size: usize,
    request: F,
) -> Vec<ChunkOutcome<I, T>>
where
    I: Clone,
    F: Fn(Vec<I>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, Report>>,
{
    let chunks = items.chunks(chunk_size.max(1)).enumerate().map(|(index, chunk)| {
        let identifiers = chunk.to_vec();
        let pending = request(chunk.to_vec());
        async move {
            match pending.await {
                Ok(items) => ChunkOutcome::Success { index, identifiers, items },
                Err(e) => {
                    warn!("Batch chunk {index} failed ({} items): {e:#}", identifiers.len());
                    ChunkOutcome::Failed { index, identifiers, reason: format!("{e:#}") }
                }
            }
        }
    });

    join_all(chunks).await
}

/// Concatenate the items of all successful chunks, in chunk order.
pub fn flatten<I, T>(outcomes: Vec<ChunkOutcome<I, T>>) -> Vec<T> {
    outcomes
        .into_iter()
        .flat_map(|outcome| match outcome {
            ChunkOutcome::Success { items, .. } => items,
            ChunkOutcome::Failed { .. } => Vec::new(),
        })
        .collect()
}
