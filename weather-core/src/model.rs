use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Units of measurement understood by the One Call API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Kelvin, metres per second.
    #[default]
    Standard,
    /// Celsius, metres per second.
    Metric,
    /// Fahrenheit, miles per hour.
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of a single One Call request.
///
/// The API key is not part of the query; it belongs to the client that sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherQuery {
    /// Latitude in decimal degrees, from -90 to 90.
    pub lat: f64,

    /// Longitude in decimal degrees, from -180 to 180.
    pub lon: f64,

    /// Parts of the response to leave out: current, minutely, hourly, daily, alerts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<BTreeSet<String>>,

    /// Units of measurement. Defaults to standard.
    #[serde(default)]
    pub units: Units,

    /// Language code for the textual descriptions. Defaults to "en".
    #[serde(default = "default_lang")]
    pub lang: String,
}

fn default_lang() -> String {
    "en".to_string()
}

impl WeatherQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            exclude: None,
            units: Units::default(),
            lang: default_lang(),
        }
    }

    pub fn with_exclude<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(parts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Comma-joined exclusion list, or `None` when there is nothing to exclude.
    pub fn exclude_param(&self) -> Option<String> {
        self.exclude
            .as_ref()
            .filter(|parts| !parts.is_empty())
            .map(|parts| parts.iter().map(String::as_str).collect::<Vec<_>>().join(","))
    }
}

/// Outcome of one call to the weather provider.
///
/// Provider-side errors are data, not faults: the agent gets to see and narrate them.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherResult {
    Success {
        payload: Value,
    },
    Failure {
        status_code: u16,
        message: String,
        raw_body: String,
    },
}

impl WeatherResult {
    pub fn failure(status_code: u16, raw_body: impl Into<String>) -> Self {
        WeatherResult::Failure {
            status_code,
            message: format!("API call failed with status code {status_code}"),
            raw_body: raw_body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WeatherResult::Success { .. })
    }

    /// JSON handed back to the planner as the tool's output.
    pub fn into_tool_output(self) -> Value {
        match self {
            WeatherResult::Success { payload } => payload,
            WeatherResult::Failure {
                message, raw_body, ..
            } => json!({
                "error": message,
                "details": raw_body,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    Text,
    Error,
}

/// What the user ends up seeing for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayResult {
    pub kind: DisplayKind,
    pub value: String,
}

impl DisplayResult {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: DisplayKind::Text,
            value: value.into(),
        }
    }

    pub fn error(value: impl Into<String>) -> Self {
        Self {
            kind: DisplayKind::Error,
            value: value.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == DisplayKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_apply_when_deserializing() {
        let query: WeatherQuery = serde_json::from_value(json!({"lat": 40.7, "lon": -74.0}))
            .expect("minimal query should deserialize");

        assert_eq!(query, WeatherQuery::new(40.7, -74.0));
        assert_eq!(query.units, Units::Standard);
        assert_eq!(query.lang, "en");
        assert!(query.exclude.is_none());
    }

    #[test]
    fn exclude_param_is_sorted_and_comma_joined() {
        let query = WeatherQuery::new(0.0, 0.0).with_exclude(["minutely", "hourly"]);
        assert_eq!(query.exclude_param().as_deref(), Some("hourly,minutely"));
    }

    #[test]
    fn exclude_param_omitted_when_absent_or_empty() {
        let query = WeatherQuery::new(0.0, 0.0);
        assert_eq!(query.exclude_param(), None);

        let query = query.with_exclude(Vec::<String>::new());
        assert_eq!(query.exclude_param(), None);
    }

    #[test]
    fn units_deserialize_lowercase() {
        let units: Units = serde_json::from_value(json!("imperial")).unwrap();
        assert_eq!(units, Units::Imperial);
        assert!(serde_json::from_value::<Units>(json!("kelvin")).is_err());
    }

    #[test]
    fn failure_tool_output_keeps_status_and_details() {
        let output = WeatherResult::failure(401, "{\"cod\":401}").into_tool_output();

        assert_eq!(output["error"], "API call failed with status code 401");
        assert_eq!(output["details"], "{\"cod\":401}");
    }

    #[test]
    fn display_result_serializes_kind_lowercase() {
        let value = serde_json::to_value(DisplayResult::error("boom")).unwrap();
        assert_eq!(value, json!({"kind": "error", "value": "boom"}));
    }
}
