//! Condition-text to icon mapping.
//!
//! The remote API describes conditions as free-form strings; the shells
//! bundle a small fixed icon set. Resolution is total: anything outside
//! the known table falls back to a designated icon instead of failing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Icon {
    Sun,
    PartlyCloudy,
    Cloud,
    Mist,
    ModerateRain,
    HeavyRain,
}

impl Icon {
    pub const FALLBACK: Self = Self::ModerateRain;

    #[must_use]
    pub fn resolve(condition_text: &str) -> Self {
        match condition_text {
            "Sunny" | "Clear" => Self::Sun,
            "Partly cloudy" => Self::PartlyCloudy,
            "Overcast" | "Cloudy" => Self::Cloud,
            "Mist" => Self::Mist,
            "Light rain" | "Moderate rain" | "Moderate rain at times" | "Patchy rain possible" => {
                Self::ModerateRain
            }
            "Heavy rain"
            | "Heavy rain at times"
            | "Moderate or heavy freezing rain"
            | "Moderate or heavy rain shower"
            | "Moderate or heavy rain with thunder" => Self::HeavyRain,
            _ => Self::FALLBACK,
        }
    }

    /// Name of the bundled image asset the shells ship for this icon.
    #[must_use]
    pub const fn asset_name(self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::PartlyCloudy => "partlycloudy",
            Self::Cloud => "cloud",
            Self::Mist => "mist",
            Self::ModerateRain => "moderaterain",
            Self::HeavyRain => "heavyrain",
        }
    }
}
