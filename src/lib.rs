pub mod api;
pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod telemetry;

pub use api::{ApiClient, ClientConfig};
pub use domain::*;
