//! Reactive view binding.
//!
//! A [`ViewController`] renders a template against data held in an
//! observable [`Store`], patches the managed [`Node`] region in place after
//! every change, and keeps form controls in the region bound to paths in the
//! store in both directions.

pub mod binding;
pub mod config;
pub mod dom;
pub mod error;
pub mod logging;
pub mod path;
pub mod render;
pub mod store;
pub mod template;
pub mod view;

pub use config::ViewConfig;
pub use dom::Node;
pub use error::ViewError;
pub use store::{Field, Observable, Store, WriteOutcome};
pub use view::{TemplateSource, ViewController, ViewOptions};
