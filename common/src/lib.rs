pub mod config;

pub use config::{BackendConfig, CommonConfig, Config};
