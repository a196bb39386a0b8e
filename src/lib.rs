#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod event;
pub mod icons;
pub mod model;
pub mod weather;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::{AppConfig, Model};

pub const API_BASE_URL: &str = "https://api.weatherapi.com/v1/";
pub const DEFAULT_CITY: &str = "New York";
pub const FORECAST_DAYS: u8 = 7;
pub const DEBOUNCE_WINDOW_MS: u64 = 600;
/// Queries of fewer characters are ignored outright: no fetch, no state
/// change.
pub const MIN_QUERY_CHARS: usize = 3;
/// Key under which the last viewed city name is persisted.
pub const STORED_CITY_KEY: &str = "city";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Http,
    Storage,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Http => "HTTP_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }
}

/// Failure state surfaced to the presentation layer. Collaborator failures
/// are converted into this at the controller boundary; nothing propagates
/// to the shell as a raised fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "An unknown error occurred".to_string()
        } else {
            message
        };
        Self { kind, message }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::Http | ErrorKind::Storage | ErrorKind::Unknown => {
                "Something went wrong!".into()
            }
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ApiErrorResponse>(body)
            .ok()
            .map(|e| e.error.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        Self::new(ErrorKind::Http, message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<capabilities::HttpError> for AppError {
    fn from(e: capabilities::HttpError) -> Self {
        let kind = match e {
            capabilities::HttpError::Network { .. } => ErrorKind::Network,
            capabilities::HttpError::Timeout { .. } => ErrorKind::Timeout,
            capabilities::HttpError::InvalidUrl { .. } => ErrorKind::Unknown,
        };
        Self::new(kind, e.to_string())
    }
}

/// Error payload the remote API attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

// --- View model: what the shells render ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub search_panel_open: bool,
    pub is_loading: bool,
    pub search_results: Vec<LocationView>,
    pub error: Option<ErrorView>,
    pub weather: Option<WeatherView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationView {
    pub name: String,
    pub country: String,
    /// Ready-made "Name, Country" row label.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub condition_text: String,
    pub icon: String,
    pub wind_kph: f64,
    pub humidity_percent: f64,
    /// Sunrise of the first forecast day, shown with current conditions.
    pub sunrise: Option<String>,
    pub days: Vec<ForecastDayView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDayView {
    pub date: String,
    /// Weekday name derived from `date`; falls back to the raw date when
    /// the API sends something unparseable.
    pub day_name: String,
    pub avg_temperature_c: f64,
    pub condition_text: String,
    pub icon: String,
}

pub mod app {
    use super::{
        AppError, ErrorView, ForecastDayView, LocationView, ViewModel, WeatherView,
        MIN_QUERY_CHARS, STORED_CITY_KEY,
    };
    use crate::capabilities::{Capabilities, HttpResult, KvOutput, KvResult, TimerOutput};
    use crate::event::Event;
    use crate::icons::Icon;
    use crate::model::{AppConfig, Model};
    use crate::weather::{self, Location, WeatherReport};

    #[derive(Default)]
    pub struct App;

    impl App {
        /// Fire the location search for the query captured at the last
        /// keystroke. Loading is visible only for this request kind.
        fn dispatch_search(model: &mut Model, caps: &Capabilities) {
            let url = match weather::search_url(&model.config, &model.pending_query) {
                Ok(url) => url,
                Err(e) => {
                    model.set_error(AppError::from(e));
                    return;
                }
            };

            let seq = model.next_search_seq();
            model.is_loading = true;
            model.clear_error();

            caps.http.get(url, move |result| Event::SearchFetched {
                seq,
                result: Box::new(result),
            });
        }

        fn dispatch_forecast(model: &mut Model, caps: &Capabilities, city: String, persist: bool) {
            let url = match weather::forecast_url(&model.config, &city) {
                Ok(url) => url,
                Err(e) => {
                    model.set_error(AppError::from(e));
                    return;
                }
            };

            let seq = model.next_forecast_seq();
            model.clear_error();

            caps.http.get(url, move |result| Event::ForecastFetched {
                seq,
                city,
                persist,
                result: Box::new(result),
            });
        }

        /// Unwrap a transfer result down to a 2xx body, converting both
        /// transport failures and HTTP-level failures into `AppError`.
        fn success_body(result: HttpResult) -> Result<Vec<u8>, AppError> {
            let response = result.map_err(AppError::from)?;
            if !response.is_success() {
                return Err(AppError::from_http_status(response.status, &response.body));
            }
            if response.body.len() > crate::capabilities::MAX_RESPONSE_BYTES {
                return Err(AppError::new(
                    crate::ErrorKind::Unknown,
                    format!("response body too large: {} bytes", response.body.len()),
                ));
            }
            Ok(response.body)
        }

        fn decode_search(result: HttpResult) -> Result<Vec<Location>, AppError> {
            let body = Self::success_body(result)?;
            weather::decode_locations(&body)
        }

        fn decode_forecast(result: HttpResult) -> Result<WeatherReport, AppError> {
            let body = Self::success_body(result)?;
            weather::decode_forecast(&body)
        }

        /// Storage is best-effort: any read failure, absent value, or
        /// unreadable bytes degrade to the configured default city.
        fn stored_city_or_default(result: KvResult, config: &AppConfig) -> String {
            match result {
                Ok(KvOutput::Value(Some(bytes))) => match String::from_utf8(bytes) {
                    Ok(city) if !city.trim().is_empty() => city,
                    _ => {
                        tracing::warn!("stored city unreadable, falling back to default");
                        config.default_city.clone()
                    }
                },
                Ok(_) => config.default_city.clone(),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read stored city");
                    config.default_city.clone()
                }
            }
        }

        fn build_weather_view(report: &WeatherReport) -> WeatherView {
            WeatherView {
                city: report.location.name.clone(),
                country: report.location.country.clone(),
                temperature_c: report.current.temperature_c,
                condition_text: report.current.condition_text.clone(),
                icon: Icon::resolve(&report.current.condition_text)
                    .asset_name()
                    .to_string(),
                wind_kph: report.current.wind_kph,
                humidity_percent: report.current.humidity_percent,
                sunrise: report.forecast_days.first().map(|d| d.sunrise.clone()),
                days: report
                    .forecast_days
                    .iter()
                    .map(|day| ForecastDayView {
                        date: day.date.clone(),
                        day_name: Self::weekday_name(&day.date),
                        avg_temperature_c: day.avg_temperature_c,
                        condition_text: day.condition_text.clone(),
                        icon: Icon::resolve(&day.condition_text).asset_name().to_string(),
                    })
                    .collect(),
            }
        }

        fn weekday_name(date: &str) -> String {
            chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_or_else(|_| date.to_string(), |d| d.format("%A").to_string())
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            if event.is_user_initiated() {
                tracing::debug!(event = event.name(), "user action");
            }

            match event {
                Event::Started => {
                    caps.key_value.get(STORED_CITY_KEY, |result| {
                        Event::StoredCityLoaded {
                            result: Box::new(result),
                        }
                    });
                    caps.render.render();
                }

                Event::StoredCityLoaded { result } => {
                    let city = Self::stored_city_or_default(*result, &model.config);
                    // Value came from (or equals) storage: no write-back.
                    Self::dispatch_forecast(model, caps, city, false);
                    caps.render.render();
                }

                Event::QueryChanged { text } => {
                    // Too short to search: not an error, just a no-op.
                    if text.chars().count() < MIN_QUERY_CHARS {
                        return;
                    }

                    let generation = model.arm_debounce(text);
                    caps.timer.start(
                        generation,
                        model.config.debounce_window_ms,
                        Event::DebounceElapsed,
                    );
                }

                Event::DebounceElapsed(TimerOutput::Elapsed { id }) => {
                    if id != model.debounce_generation {
                        tracing::debug!(id, "superseded debounce timer ignored");
                        return;
                    }

                    Self::dispatch_search(model, caps);
                    caps.render.render();
                }

                Event::SearchFetched { seq, result } => {
                    if !model.is_latest_search(seq) {
                        tracing::debug!(seq, "stale search response discarded");
                        return;
                    }

                    model.is_loading = false;

                    match Self::decode_search(*result) {
                        Ok(locations) => {
                            // The panel may have been closed while the
                            // request was in flight; results only ever
                            // show inside an open panel.
                            if model.search_panel_open {
                                model.search_results = locations;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "location search failed");
                            model.set_error(e);
                        }
                    }

                    caps.render.render();
                }

                Event::SearchToggled => {
                    model.search_panel_open = !model.search_panel_open;

                    if !model.search_panel_open {
                        model.search_results.clear();
                        model.invalidate_debounce();
                    }

                    caps.render.render();
                }

                Event::LocationSelected { location } => {
                    model.search_results.clear();
                    model.search_panel_open = false;
                    model.invalidate_debounce();

                    Self::dispatch_forecast(model, caps, location.name, true);
                    caps.render.render();
                }

                Event::ForecastFetched {
                    seq,
                    city,
                    persist,
                    result,
                } => {
                    if !model.is_latest_forecast(seq) {
                        tracing::debug!(seq, "stale forecast response discarded");
                        return;
                    }

                    match Self::decode_forecast(*result) {
                        Ok(report) => {
                            model.current_weather = Some(report);

                            if persist {
                                caps.key_value.set(
                                    STORED_CITY_KEY,
                                    city.into_bytes(),
                                    |result| Event::CityPersisted {
                                        result: Box::new(result),
                                    },
                                );
                            }
                        }
                        Err(e) => {
                            // Stale-but-valid: keep the previous snapshot.
                            tracing::warn!(error = %e, city = %city, "forecast fetch failed");
                            model.set_error(e);
                        }
                    }

                    caps.render.render();
                }

                Event::CityPersisted { result } => {
                    // Persistence is a best-effort side channel; failures
                    // are logged and never surfaced.
                    if let Err(e) = *result {
                        tracing::warn!(error = %e, "failed to persist last city");
                    }
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel {
                search_panel_open: model.search_panel_open,
                is_loading: model.is_loading,
                search_results: model
                    .search_results
                    .iter()
                    .map(|loc| LocationView {
                        name: loc.name.clone(),
                        country: loc.country.clone(),
                        label: loc.label(),
                    })
                    .collect(),
                error: model.last_error.as_ref().map(|e| ErrorView {
                    code: e.code().to_string(),
                    message: e.user_facing_message(),
                }),
                weather: model.current_weather.as_ref().map(Self::build_weather_view),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::capabilities::{HttpError, HttpResponse, KvError};
        use crate::weather::{CurrentConditions, ForecastDay};
        use crate::ErrorKind;

        fn report(city: &str) -> WeatherReport {
            WeatherReport {
                location: Location {
                    name: city.to_string(),
                    country: "Testland".to_string(),
                },
                current: CurrentConditions {
                    temperature_c: 21.0,
                    condition_text: "Sunny".to_string(),
                    wind_kph: 8.0,
                    humidity_percent: 40.0,
                },
                forecast_days: vec![ForecastDay {
                    date: "2024-05-01".to_string(),
                    avg_temperature_c: 19.0,
                    condition_text: "Partly cloudy".to_string(),
                    sunrise: "06:32 AM".to_string(),
                }],
            }
        }

        #[test]
        fn stored_city_falls_back_on_absent_value() {
            let config = AppConfig::default();

            let city =
                App::stored_city_or_default(Ok(KvOutput::Value(None)), &config);
            assert_eq!(city, "New York");
        }

        #[test]
        fn stored_city_falls_back_on_read_failure() {
            let config = AppConfig::default();

            let city = App::stored_city_or_default(
                Err(KvError::Storage {
                    message: "disk gone".to_string(),
                }),
                &config,
            );
            assert_eq!(city, "New York");
        }

        #[test]
        fn stored_city_falls_back_on_garbage_bytes() {
            let config = AppConfig::default();

            let city = App::stored_city_or_default(
                Ok(KvOutput::Value(Some(vec![0xff, 0xfe]))),
                &config,
            );
            assert_eq!(city, "New York");

            let city = App::stored_city_or_default(
                Ok(KvOutput::Value(Some(b"   ".to_vec()))),
                &config,
            );
            assert_eq!(city, "New York");
        }

        #[test]
        fn stored_city_is_used_when_present() {
            let config = AppConfig::default();

            let city = App::stored_city_or_default(
                Ok(KvOutput::Value(Some(b"Paris".to_vec()))),
                &config,
            );
            assert_eq!(city, "Paris");
        }

        #[test]
        fn non_2xx_becomes_http_error_with_api_message() {
            let result = Ok(HttpResponse {
                status: 400,
                body: br#"{"error": {"code": 1006, "message": "No matching location found."}}"#
                    .to_vec(),
            });

            let err = App::decode_search(result).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Http);
            assert_eq!(err.message, "No matching location found.");
        }

        #[test]
        fn non_2xx_without_body_gets_generic_message() {
            let result = Ok(HttpResponse {
                status: 503,
                body: Vec::new(),
            });

            let err = App::decode_search(result).unwrap_err();
            assert_eq!(err.message, "HTTP error: 503");
        }

        #[test]
        fn transport_failure_maps_to_network_kind() {
            let result = Err(HttpError::Network {
                message: "connection reset".to_string(),
            });

            let err = App::decode_forecast(result).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Network);
            assert_eq!(
                err.user_facing_message(),
                "Unable to connect. Please check your internet connection and try again."
            );
        }

        #[test]
        fn empty_failure_message_gets_fallback_text() {
            let err = AppError::new(ErrorKind::Unknown, "");
            assert_eq!(err.message, "An unknown error occurred");
        }

        #[test]
        fn weather_view_resolves_icons_and_weekdays() {
            let view = App::build_weather_view(&report("Paris"));

            assert_eq!(view.city, "Paris");
            assert_eq!(view.icon, "sun");
            assert_eq!(view.sunrise.as_deref(), Some("06:32 AM"));
            assert_eq!(view.days.len(), 1);
            // 2024-05-01 was a Wednesday.
            assert_eq!(view.days[0].day_name, "Wednesday");
            assert_eq!(view.days[0].icon, "partlycloudy");
        }

        #[test]
        fn weekday_name_falls_back_to_raw_date() {
            assert_eq!(App::weekday_name("not-a-date"), "not-a-date");
            assert_eq!(App::weekday_name("2024-05-02"), "Thursday");
        }
    }
}
