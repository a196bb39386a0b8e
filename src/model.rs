use serde::{Deserialize, Serialize};

use crate::weather::{Location, WeatherReport};
use crate::{AppError, DEBOUNCE_WINDOW_MS, DEFAULT_CITY, FORECAST_DAYS};

/// Values the shell supplies at startup instead of the core hardcoding
/// them. The API key in particular is never baked into the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: String,
    pub default_city: String,
    pub forecast_days: u8,
    pub debounce_window_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            default_city: DEFAULT_CITY.to_string(),
            forecast_days: FORECAST_DAYS,
            debounce_window_ms: DEBOUNCE_WINDOW_MS,
        }
    }
}

/// The whole of the controller state. Mutated only inside `App::update`;
/// the shells observe it through the view model.
#[derive(Debug, Default)]
pub struct Model {
    pub config: AppConfig,

    // Search
    pub search_panel_open: bool,
    pub search_results: Vec<Location>,
    /// Last qualifying text seen; the value the debounce timer dispatches.
    pub pending_query: String,
    /// Id of the latest armed debounce timer. A timer callback carrying
    /// any other id is stale and ignored.
    pub debounce_generation: u64,

    // Forecast
    pub current_weather: Option<WeatherReport>,

    // Request bookkeeping: a response applies only when its sequence
    // number is the latest dispatched for that request kind.
    pub search_seq: u64,
    pub forecast_seq: u64,

    // UI flags
    /// True only while a search-candidate fetch is in flight.
    pub is_loading: bool,
    pub last_error: Option<AppError>,
}

impl Model {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn set_error(&mut self, error: AppError) {
        self.last_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Record the latest text and supersede any pending debounce timer.
    /// Returns the generation the new timer must carry back.
    pub fn arm_debounce(&mut self, text: String) -> u64 {
        self.pending_query = text;
        self.debounce_generation += 1;
        self.debounce_generation
    }

    /// Abandon any pending debounce timer without arming a new one.
    pub fn invalidate_debounce(&mut self) {
        self.debounce_generation += 1;
    }

    pub fn next_search_seq(&mut self) -> u64 {
        self.search_seq += 1;
        self.search_seq
    }

    #[must_use]
    pub fn is_latest_search(&self, seq: u64) -> bool {
        seq == self.search_seq
    }

    pub fn next_forecast_seq(&mut self) -> u64 {
        self.forecast_seq += 1;
        self.forecast_seq
    }

    #[must_use]
    pub fn is_latest_forecast(&self, seq: u64) -> bool {
        seq == self.forecast_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_app_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.default_city, "New York");
        assert_eq!(config.forecast_days, 7);
        assert_eq!(config.debounce_window_ms, 600);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn arming_supersedes_previous_generation() {
        let mut model = Model::default();

        let first = model.arm_debounce("Lon".to_string());
        let second = model.arm_debounce("Lond".to_string());

        assert!(second > first);
        assert_eq!(model.pending_query, "Lond");
        assert_eq!(model.debounce_generation, second);
    }

    #[test]
    fn invalidation_orphans_armed_timers() {
        let mut model = Model::default();

        let armed = model.arm_debounce("London".to_string());
        model.invalidate_debounce();

        assert_ne!(model.debounce_generation, armed);
    }

    #[test]
    fn only_latest_sequence_applies() {
        let mut model = Model::default();

        let first = model.next_search_seq();
        let second = model.next_search_seq();

        assert!(!model.is_latest_search(first));
        assert!(model.is_latest_search(second));
    }
}
