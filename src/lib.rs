pub mod config;
pub mod dataset;
pub mod engine;
pub mod evaluate;
pub mod experiment;
pub mod metrics;
pub mod server;
pub mod youtube;
