//! Market data provider interface

use crate::error::UpstreamError;
use crate::models::observation::Observation;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

/// Source of observations for the scanner.
///
/// Failures are returned, never swallowed: the runtime skips that ticker's
/// cycle and decides about retries.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest reading for `ticker`
    async fn latest_observation(&self, ticker: &str) -> Result<Observation, UpstreamError>;
}

/// Serves pre-loaded observations in order, one per request.
///
/// Used for replaying recorded sessions and in tests.
#[derive(Default)]
pub struct ReplayMarketDataProvider {
    queues: Mutex<HashMap<String, VecDeque<Observation>>>,
}

impl ReplayMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut queues: HashMap<String, VecDeque<Observation>> = HashMap::new();
        for observation in observations {
            queues
                .entry(observation.ticker.clone())
                .or_default()
                .push_back(observation);
        }
        Self {
            queues: Mutex::new(queues),
        }
    }

    pub async fn push(&self, observation: Observation) {
        self.queues
            .lock()
            .await
            .entry(observation.ticker.clone())
            .or_default()
            .push_back(observation);
    }

    pub async fn remaining(&self, ticker: &str) -> usize {
        self.queues
            .lock()
            .await
            .get(ticker)
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl MarketDataProvider for ReplayMarketDataProvider {
    async fn latest_observation(&self, ticker: &str) -> Result<Observation, UpstreamError> {
        self.queues
            .lock()
            .await
            .get_mut(ticker)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| UpstreamError::NoData(ticker.to_string()))
    }
}
