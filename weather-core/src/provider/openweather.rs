use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{
    config::{ApiKey, WeatherSettings},
    error::WeatherError,
    model::{WeatherQuery, WeatherResult},
};

use super::WeatherProvider;

/// OpenWeatherMap One Call 3.0 endpoint.
pub const ONE_CALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: ApiKey,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: ONE_CALL_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Client with the configured endpoint and a bounded request timeout.
    pub fn from_settings(settings: &WeatherSettings) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(WeatherError::Client)?;

        Ok(Self {
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
            http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Query string for a request, in the order the provider documents them.
    fn query_params(&self, query: &WeatherQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("lat", query.lat.to_string()), ("lon", query.lon.to_string())];

        if let Some(exclude) = query.exclude_param() {
            params.push(("exclude", exclude));
        }

        params.push(("units", query.units.as_str().to_string()));
        params.push(("lang", query.lang.clone()));
        params.push(("appid", self.api_key.as_str().to_string()));
        params
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        tracing::debug!(
            lat = query.lat,
            lon = query.lon,
            units = %query.units,
            lang = %query.lang,
            "Requesting One Call weather data"
        );

        let res = self
            .http
            .get(&self.base_url)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(WeatherError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::Transport)?;

        if status != StatusCode::OK {
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate_body(&body),
                "OpenWeather request failed"
            );
            return Ok(WeatherResult::failure(status.as_u16(), body));
        }

        let payload = serde_json::from_str(&body).map_err(WeatherError::Decode)?;
        Ok(WeatherResult::Success { payload })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Units;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: &str) -> OpenWeatherClient {
        OpenWeatherClient::new(ApiKey::new(key)).with_base_url(format!("{}/onecall", server.uri()))
    }

    async fn received_query(server: &MockServer) -> HashMap<String, String> {
        let requests = server.received_requests().await.expect("recording is enabled");
        assert_eq!(requests.len(), 1, "exactly one request per fetch");
        requests[0].url.query_pairs().into_owned().collect()
    }

    #[test]
    fn query_params_omit_exclude_when_absent() {
        let client = OpenWeatherClient::new(ApiKey::new("KEY"));
        let params = client.query_params(&WeatherQuery::new(40.7, -74.0));

        let names: Vec<_> = params.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["lat", "lon", "units", "lang", "appid"]);
    }

    #[test]
    fn query_params_join_exclusions() {
        let client = OpenWeatherClient::new(ApiKey::new("KEY"));
        let query = WeatherQuery::new(40.7, -74.0)
            .with_exclude(["minutely", "hourly"])
            .with_units(Units::Metric)
            .with_lang("de");

        let params: HashMap<_, _> = client.query_params(&query).into_iter().collect();
        assert_eq!(params["exclude"], "hourly,minutely");
        assert_eq!(params["units"], "metric");
        assert_eq!(params["lang"], "de");
        assert_eq!(params["appid"], "KEY");
    }

    #[tokio::test]
    async fn success_passes_json_through_verbatim() {
        let server = MockServer::start().await;
        let body = r#"{"lat":40.7,"lon":-74.0,"current":{"temp":288.15,"weather":[{"description":"overcast clouds"}]},"extra":[1,2,3]}"#;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = client_for(&server, "KEY");
        let result = client.fetch(&WeatherQuery::new(40.7, -74.0)).await.unwrap();

        let reference: Value = serde_json::from_str(body).unwrap();
        assert_eq!(result, WeatherResult::Success { payload: reference });

        let query = received_query(&server).await;
        assert_eq!(query["lat"], "40.7");
        assert_eq!(query["lon"], "-74");
        assert_eq!(query["units"], "standard");
        assert_eq!(query["lang"], "en");
        assert_eq!(query["appid"], "KEY");
        assert!(!query.contains_key("exclude"));
    }

    #[tokio::test]
    async fn exclusions_are_sent_comma_delimited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, "KEY");
        let query = WeatherQuery::new(51.5, -0.12).with_exclude(["minutely", "hourly"]);
        client.fetch(&query).await.unwrap();

        let query = received_query(&server).await;
        assert_eq!(query["exclude"], "hourly,minutely");
    }

    #[tokio::test]
    async fn non_200_becomes_failure_with_raw_body() {
        for (status, body) in [(404u16, "city not found"), (500, "<html>oops</html>"), (429, "")] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_string(body))
                .mount(&server)
                .await;

            let client = client_for(&server, "KEY");
            let result = client.fetch(&WeatherQuery::new(0.0, 0.0)).await.unwrap();

            match result {
                WeatherResult::Failure {
                    status_code,
                    message,
                    raw_body,
                } => {
                    assert_eq!(status_code, status);
                    assert_eq!(raw_body, body);
                    assert!(message.contains(&status.to_string()));
                }
                other => panic!("expected failure, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn empty_key_still_calls_and_gets_401_failure() {
        let server = MockServer::start().await;
        let body = r#"{"cod":401,"message":"Invalid API key."}"#;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "");
        let result = client.fetch(&WeatherQuery::new(40.7, -74.0)).await.unwrap();

        assert_eq!(result, WeatherResult::failure(401, body));
        let query = received_query(&server).await;
        assert_eq!(query["appid"], "");
    }

    #[tokio::test]
    async fn malformed_200_body_is_a_decode_fault() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server, "KEY");
        let err = client.fetch(&WeatherQuery::new(0.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_fault() {
        let client = OpenWeatherClient::new(ApiKey::new("KEY"))
            .with_base_url("http://127.0.0.1:1/onecall");
        let err = client.fetch(&WeatherQuery::new(0.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, WeatherError::Transport(_)));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
