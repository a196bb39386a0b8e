//! Domain model and wire schema for the remote weather API.
//!
//! The remote service (weatherapi.com) returns loosely-specified JSON; this
//! module pins down exactly the fields the app consumes and converts them
//! into owned, validated snapshots. Anything that fails to decode or
//! validate is reported as a single decode error; malformed payloads never
//! leak partial data into the model.

use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpError, ValidatedUrl};
use crate::model::AppConfig;
use crate::{AppError, ErrorKind, API_BASE_URL};

/// A candidate returned by the search endpoint. Ephemeral: lives only
/// until a newer search supersedes the list or a selection is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
}

impl Location {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub condition_text: String,
    pub wind_kph: f64,
    pub humidity_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar date as reported by the API, `YYYY-MM-DD`.
    pub date: String,
    pub avg_temperature_c: f64,
    pub condition_text: String,
    pub sunrise: String,
}

/// One complete fetch result. Replaced wholesale on every successful
/// forecast request, never merged field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast_days: Vec<ForecastDay>,
}

// --- Request building ---

pub fn search_url(config: &AppConfig, query: &str) -> Result<ValidatedUrl, HttpError> {
    endpoint_url(config, "search.json", query, None)
}

pub fn forecast_url(config: &AppConfig, city: &str) -> Result<ValidatedUrl, HttpError> {
    endpoint_url(config, "forecast.json", city, Some(config.forecast_days))
}

fn endpoint_url(
    config: &AppConfig,
    endpoint: &str,
    query: &str,
    days: Option<u8>,
) -> Result<ValidatedUrl, HttpError> {
    let mut url = url::Url::parse(API_BASE_URL)
        .and_then(|base| base.join(endpoint))
        .map_err(|e| HttpError::InvalidUrl {
            url: format!("{API_BASE_URL}/{endpoint}"),
            reason: e.to_string(),
        })?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("key", &config.api_key);
        pairs.append_pair("q", query);
        if let Some(days) = days {
            pairs.append_pair("days", &days.to_string());
        }
    }

    Ok(url.into())
}

// --- Wire schema (strict: required fields must be present and decodable) ---

#[derive(Debug, Deserialize)]
struct LocationSchema {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct ConditionSchema {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CurrentSchema {
    temp_c: f64,
    condition: ConditionSchema,
    wind_kph: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct DaySchema {
    avgtemp_c: f64,
    condition: ConditionSchema,
}

#[derive(Debug, Deserialize)]
struct AstroSchema {
    sunrise: String,
}

#[derive(Debug, Deserialize)]
struct ForecastDaySchema {
    date: String,
    day: DaySchema,
    astro: AstroSchema,
}

#[derive(Debug, Deserialize)]
struct ForecastBlockSchema {
    forecastday: Vec<ForecastDaySchema>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponseSchema {
    location: LocationSchema,
    current: CurrentSchema,
    forecast: ForecastBlockSchema,
}

fn malformed(detail: impl std::fmt::Display) -> AppError {
    AppError::new(
        ErrorKind::Unknown,
        format!("malformed weather payload: {detail}"),
    )
}

/// Decode a `search.json` body into candidates, preserving response order.
pub fn decode_locations(body: &[u8]) -> Result<Vec<Location>, AppError> {
    let candidates: Vec<LocationSchema> = serde_json::from_slice(body).map_err(malformed)?;

    Ok(candidates
        .into_iter()
        .map(|c| Location {
            name: c.name,
            country: c.country,
        })
        .collect())
}

/// Decode and validate a `forecast.json` body into a complete report.
pub fn decode_forecast(body: &[u8]) -> Result<WeatherReport, AppError> {
    let response: ForecastResponseSchema = serde_json::from_slice(body).map_err(malformed)?;

    if response.forecast.forecastday.is_empty() {
        return Err(malformed("empty forecast day list"));
    }

    let finite = [
        response.current.temp_c,
        response.current.wind_kph,
        response.current.humidity,
    ];
    if finite.iter().any(|v| !v.is_finite()) {
        return Err(malformed("non-finite current conditions"));
    }

    let forecast_days = response
        .forecast
        .forecastday
        .into_iter()
        .map(|day| {
            if !day.day.avgtemp_c.is_finite() {
                return Err(malformed(format!("non-finite temperature on {}", day.date)));
            }
            Ok(ForecastDay {
                date: day.date,
                avg_temperature_c: day.day.avgtemp_c,
                condition_text: day.day.condition.text,
                sunrise: day.astro.sunrise,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeatherReport {
        location: Location {
            name: response.location.name,
            country: response.location.country,
        },
        current: CurrentConditions {
            temperature_c: response.current.temp_c,
            condition_text: response.current.condition.text,
            wind_kph: response.current.wind_kph,
            humidity_percent: response.current.humidity,
        },
        forecast_days,
    })
}
