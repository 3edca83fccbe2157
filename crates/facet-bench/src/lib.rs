pub mod analytics;
pub mod calibration;
pub mod config;
pub mod logging;
pub mod runner;
