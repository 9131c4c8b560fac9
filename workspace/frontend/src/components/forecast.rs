mod anomalies;
mod chart;
mod metrics;
mod view;

pub use view::ForecastView;
