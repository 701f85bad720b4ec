pub mod comparison;
pub mod config;
pub mod impact;
pub mod metrics;
pub mod modes;
pub mod output;
pub mod progress;
pub mod provider;
pub mod ranking;
pub mod server;
pub mod units;
