use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpResult, KvResult, TimerOutput};
use crate::weather::Location;

/// Everything that can drive the core: user interactions from the shell
/// and completions of capability requests. Large payloads are boxed to
/// keep the enum small.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// First activation of the screen; kicks off the stored-city lookup.
    Started,

    // User interactions
    QueryChanged { text: String },
    LocationSelected { location: Location },
    SearchToggled,

    // Capability completions
    DebounceElapsed(TimerOutput),
    StoredCityLoaded { result: Box<KvResult> },
    SearchFetched { seq: u64, result: Box<HttpResult> },
    ForecastFetched {
        seq: u64,
        city: String,
        persist: bool,
        result: Box<HttpResult>,
    },
    CityPersisted { result: Box<KvResult> },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::QueryChanged { .. } => "query_changed",
            Self::LocationSelected { .. } => "location_selected",
            Self::SearchToggled => "search_toggled",
            Self::DebounceElapsed(_) => "debounce_elapsed",
            Self::StoredCityLoaded { .. } => "stored_city_loaded",
            Self::SearchFetched { .. } => "search_fetched",
            Self::ForecastFetched { .. } => "forecast_fetched",
            Self::CityPersisted { .. } => "city_persisted",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::QueryChanged { .. } | Self::LocationSelected { .. } | Self::SearchToggled
        )
    }
}
