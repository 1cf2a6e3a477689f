pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod store;
pub mod views;
