pub mod analysis;
pub mod config;
pub mod data;
pub mod ght;
pub mod logging;
pub mod pipeline;
pub mod visualization;

pub use analysis::*;
pub use config::{load_config_or_default, Config, ConfigFormat, DetectionConfig, EdgeDetectionConfig, GhtConfig, TemplateConfig};
pub use data::*;
pub use ght::*;
pub use pipeline::*;

pub type Result<T> = anyhow::Result<T>;
