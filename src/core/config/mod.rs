pub mod defaults;
pub mod service;
pub mod settings;
pub mod validation;

pub use service::ConfigService;
pub use settings::{AppConfig, Credentials, Settings};
