use common::api::{self, Endpoint, RawResponse};
use common::{DashboardError, ForecastBundle, Station, TimeSeries};
use gloo_net::http::Request;
use std::rc::Rc;

use crate::settings;

/// Client for the forecasting backend. The base URL is fixed at
/// construction; components get the client from context.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiClient {
    base_url: Rc<str>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: Rc::from(base_url),
        }
    }

    pub fn from_settings() -> Self {
        Self::new(settings::get_settings().api_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Common GET request handler
    async fn get(&self, endpoint: &Endpoint) -> Result<RawResponse, DashboardError> {
        let url = endpoint.url(&self.base_url);
        log::debug!("GET request to: {}", url);

        let response = Request::get(&url).send().await.map_err(|e| {
            let error_msg = format!("no se pudo contactar al servidor ({})", e);
            log::error!("GET {} - {}", url, error_msg);
            DashboardError::Network(error_msg).with_prefix(endpoint.error_prefix())
        })?;

        let status = response.status();
        let status_text = response.status_text();
        log::trace!("GET {} - Response {} received, reading body", url, status);

        let body = response.text().await.map_err(|e| {
            let error_msg = format!("no se pudo leer la respuesta ({})", e);
            log::error!("GET {} - {}", url, error_msg);
            DashboardError::Api(error_msg).with_prefix(endpoint.error_prefix())
        })?;

        Ok(RawResponse {
            status,
            status_text,
            body,
        })
    }

    pub async fn list_stations(&self) -> Result<Vec<Station>, DashboardError> {
        log::trace!("Fetching station list");
        let endpoint = Endpoint::Stations;
        let response = self.get(&endpoint).await?;
        let result = api::decode_stations(&response);

        match &result {
            Ok(stations) => log::info!("Successfully fetched {} stations", stations.len()),
            Err(e) => log::error!("Failed to fetch stations: {}", e),
        }
        result
    }

    pub async fn get_time_series(
        &self,
        linea: &str,
        estacion: &str,
    ) -> Result<TimeSeries, DashboardError> {
        log::trace!("Fetching time series for {} / {}", linea, estacion);
        let endpoint = Endpoint::time_series(linea, estacion)?;
        let response = self.get(&endpoint).await?;
        let result = api::decode_time_series(&endpoint, &response);

        match &result {
            Ok(ts) => log::info!(
                "Successfully fetched time series for {} / {} ({} valid of {} points, field `{}`)",
                linea,
                estacion,
                ts.series.points.len(),
                ts.series.received,
                ts.series.field.as_str()
            ),
            Err(e) => log::error!("Failed to fetch time series: {}", e),
        }
        result
    }

    pub async fn get_forecast(
        &self,
        linea: &str,
        estacion: &str,
    ) -> Result<ForecastBundle, DashboardError> {
        log::trace!("Fetching forecast for {} / {}", linea, estacion);
        let endpoint = Endpoint::forecast(linea, estacion)?;
        let response = self.get(&endpoint).await?;
        let result = api::decode_forecast(&endpoint, &response);

        match &result {
            Ok(bundle) => log::info!(
                "Successfully fetched forecast for {} / {} ({} anomalies)",
                linea,
                estacion,
                bundle.anomalies().len()
            ),
            Err(e) => log::error!("Failed to fetch forecast: {}", e),
        }
        result
    }
}
