use async_trait::async_trait;
use std::sync::Mutex;

use crate::{WeatherQuery, WeatherResult, error::WeatherError};

use super::WeatherProvider;

/// Provider that answers every call with the same result and remembers the queries.
#[derive(Debug)]
pub struct MockProvider {
    result: WeatherResult,
    calls: Mutex<Vec<WeatherQuery>>,
}

impl MockProvider {
    pub fn new(result: WeatherResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far, oldest first.
    pub fn calls(&self) -> Vec<WeatherQuery> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WeatherProvider for MockProvider {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.clone());
        }
        Ok(self.result.clone())
    }
}
