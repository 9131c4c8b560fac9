pub mod forecast;
pub mod layout;
pub mod station_selector;
pub mod timeseries_chart;
