//! Simulated messaging backend.
//!
//! The platform offers no public endpoint for messaging contacts, so sends
//! are simulated: each one takes a fixed latency and fails at random with a
//! rate-limit error.

use async_trait::async_trait;
use herald_core::broadcast::{MessagingService, SendError};
use herald_core::config::MessagingSettings;
use herald_core::recipient::RecipientKind;
use herald_core::session::AccessToken;
use rand::Rng;
use std::time::Duration;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

#[derive(Debug, Clone)]
pub struct SimulatedMessenger {
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedMessenger {
    /// `failure_rate` is clamped to `[0, 1]`; NaN counts as 0.
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self {
            latency,
            failure_rate,
        }
    }

    pub fn from_settings(settings: &MessagingSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.latency_ms),
            settings.failure_rate,
        )
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }
}

impl Default for SimulatedMessenger {
    fn default() -> Self {
        Self::from_settings(&MessagingSettings::default())
    }
}

#[async_trait]
impl MessagingService for SimulatedMessenger {
    async fn send(
        &self,
        recipient_id: &str,
        kind: RecipientKind,
        text: &str,
        _token: &AccessToken,
    ) -> Result<(), SendError> {
        // Decide before awaiting; the thread-local RNG is not Send.
        let fails = rand::thread_rng().gen_bool(self.failure_rate);

        tokio::time::sleep(self.latency).await;

        if fails {
            tracing::debug!("[Messenger] Simulated failure for {} {}", kind, recipient_id);
            return Err(SendError::RateLimited(RATE_LIMIT_MESSAGE.to_string()));
        }

        tracing::debug!(
            "[Messenger] Simulated delivery of {} chars to {} {}",
            text.chars().count(),
            kind,
            recipient_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AccessToken {
        AccessToken::new("tok")
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_takes_the_configured_latency() {
        let messenger = SimulatedMessenger::new(Duration::from_millis(500), 0.0);
        let started = tokio::time::Instant::now();

        messenger
            .send("1", RecipientKind::Individual, "hi", &token())
            .await
            .unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_rate_one_always_rate_limits() {
        let messenger = SimulatedMessenger::new(Duration::ZERO, 1.0);

        for _ in 0..10 {
            let err = messenger
                .send("g1", RecipientKind::Group, "hi", &token())
                .await
                .unwrap_err();
            assert_eq!(err, SendError::RateLimited(RATE_LIMIT_MESSAGE.to_string()));
            assert_eq!(err.to_string(), "Rate limit exceeded");
        }
    }

    #[test]
    fn test_failure_rate_is_clamped() {
        assert_eq!(SimulatedMessenger::new(Duration::ZERO, 3.0).failure_rate(), 1.0);
        assert_eq!(SimulatedMessenger::new(Duration::ZERO, -1.0).failure_rate(), 0.0);
        assert_eq!(SimulatedMessenger::new(Duration::ZERO, f64::NAN).failure_rate(), 0.0);
    }

    #[test]
    fn test_default_matches_settings() {
        let messenger = SimulatedMessenger::default();
        assert_eq!(messenger.latency, Duration::from_millis(500));
        assert_eq!(messenger.failure_rate(), 0.1);
    }
}
