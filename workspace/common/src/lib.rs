//! Transport types and client-side data shaping shared by the dashboard.
//!
//! Everything here is plain Rust with no browser dependency, so the frontend
//! crate stays a thin rendering layer and the reshaping logic can be tested
//! natively.

pub mod api;
pub mod error;
pub mod format;
pub mod forecast;
pub mod request;
pub mod selection;
pub mod station;
pub mod timeseries;

pub use api::Endpoint;
pub use error::{DashboardError, Result};
pub use forecast::{
    AnomalyBand, AnomalyOverlay, Anomaly, ChartData, ChartPoint, Components, ForecastBundle, FutureSeries,
    Metrics, SeriesType, TestMetrics, TestSeries, TrainSeries, TrendPoint, ViewMode,
};
pub use request::{ForecastAction, ForecastRequest, RequestSequence, RequestTicket};
pub use selection::StationSelection;
pub use station::Station;
pub use timeseries::{
    Extreme, RawTimeSeriesPoint, RidershipPoint, RidershipSeries, SeriesSummary, StationStats,
    TimeSeries, TimeSeriesResponse, ValueField,
};
