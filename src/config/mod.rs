mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{BindingConfig, FetchConfig, NavigationConfig, RenderConfig, ViewConfig};
