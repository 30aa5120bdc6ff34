use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub binding: BindingConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

/// Form binding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Attribute carrying the store path of a bound control (default: "data-binding").
    #[serde(default = "default_binding_attribute")]
    pub attribute: String,
}

/// Render cycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Maximum nesting of re-entrant renders (default: 16).
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Remove live children past the end of a shorter render (default: true).
    #[serde(default = "default_prune_stale_nodes")]
    pub prune_stale_nodes: bool,
}

/// Remote hydration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Active-item marker written by `set_active_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Field set on the active item (default: "isActive").
    #[serde(default = "default_active_field")]
    pub active_field: String,
    /// Value stored in the field of the active item (default: "active").
    #[serde(default = "default_active_value")]
    pub active_value: String,
}

fn default_binding_attribute() -> String {
    "data-binding".to_string()
}

fn default_max_depth() -> u32 {
    16
}

fn default_prune_stale_nodes() -> bool {
    true
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_active_field() -> String {
    "isActive".to_string()
}

fn default_active_value() -> String {
    "active".to_string()
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            attribute: default_binding_attribute(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            prune_stale_nodes: default_prune_stale_nodes(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            active_field: default_active_field(),
            active_value: default_active_value(),
        }
    }
}
