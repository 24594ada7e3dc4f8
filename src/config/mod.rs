//! Configuration: settings structs, defaults and platform paths.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, CaptureConfig, EvaluationConfig};
