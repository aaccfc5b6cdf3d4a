use crate::models::{EndpointSettings, FormData};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a submission endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Network error: {0}")]
    Network(String),
}

/// External service that receives validated form data.
///
/// The controller invokes [`submit`](Self::submit) at most once per submission cycle and
/// imposes no latency, retry or idempotency contract; those belong to the implementation.
#[allow(async_fn_in_trait)]
pub trait SubmissionEndpoint {
    async fn submit(&self, data: &FormData) -> Result<(), EndpointError>;
}

impl<T: SubmissionEndpoint> SubmissionEndpoint for Arc<T> {
    async fn submit(&self, data: &FormData) -> Result<(), EndpointError> {
        (**self).submit(data).await
    }
}

/// Stand-in for a real network call.
///
/// Waits for the configured latency, then succeeds, or fails every time when
/// `fail_submissions` is set. Outcomes are deterministic.
#[derive(Debug, Clone)]
pub struct SimulatedEndpoint {
    latency: Duration,
    fail_submissions: bool,
}

impl SimulatedEndpoint {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_submissions: false,
        }
    }

    pub fn from_settings(settings: &EndpointSettings) -> Self {
        Self {
            latency: Duration::from_millis(settings.latency_ms),
            fail_submissions: settings.fail_submissions,
        }
    }

    /// Make every subsequent submission fail
    pub fn failing(mut self) -> Self {
        self.fail_submissions = true;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl SubmissionEndpoint for SimulatedEndpoint {
    async fn submit(&self, data: &FormData) -> Result<(), EndpointError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.fail_submissions {
            return Err(EndpointError::Network(
                "simulated endpoint is configured to fail".to_string(),
            ));
        }

        tracing::info!(
            "Form data submitted: {}",
            data.iter()
                .map(|(field, value)| format!("{}={:?}", field, value))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> FormData {
        let mut data = FormData::new();
        data.insert("name".to_string(), "Alice".to_string());
        data.insert("email".to_string(), "alice@example.com".to_string());
        data
    }

    #[test]
    fn test_zero_latency_succeeds() {
        let endpoint = SimulatedEndpoint::new(Duration::ZERO);
        let result = tokio_test::block_on(endpoint.submit(&sample_data()));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_failing_endpoint() {
        let endpoint = SimulatedEndpoint::new(Duration::ZERO).failing();
        let result = tokio_test::block_on(endpoint.submit(&sample_data()));
        assert!(matches!(result, Err(EndpointError::Network(_))));
    }

    #[test]
    fn test_from_settings() {
        let settings = EndpointSettings {
            latency_ms: 250,
            fail_submissions: true,
        };
        let endpoint = SimulatedEndpoint::from_settings(&settings);
        assert_eq!(endpoint.latency(), Duration::from_millis(250));
        assert!(endpoint.fail_submissions);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_latency() {
        let endpoint = SimulatedEndpoint::new(Duration::from_secs(2));
        let start = tokio::time::Instant::now();

        endpoint.submit(&sample_data()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
