pub mod config;
pub mod coordinator;
pub mod demo;
pub mod flows;
pub mod host;
pub mod logging;
