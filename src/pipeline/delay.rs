//! Waiting between fetches.

use std::time::Duration;

use async_trait::async_trait;

/// Something the pipeline can wait on between fetches.
///
/// Production code uses [`TokioDelay`]; tests substitute an implementation
/// that records the requested durations and returns immediately.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Waits for `duration`.
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_delay_sleeps_for_duration() {
        let start = std::time::Instant::now();
        TokioDelay.wait(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        TokioDelay.wait(Duration::ZERO).await;
    }
}
