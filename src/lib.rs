pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notifier;
pub mod poller;
pub mod practicum;
