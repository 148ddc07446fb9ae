//! formbind - bi-directional path-based data binding for form models
//!
//! ```
//! use formbind::Binding;
//! use serde_json::json;
//!
//! let root = Binding::new(json!({"address": {"city": "Paris"}}));
//! let address = root.fieldset("address")?;
//!
//! address.set("city", json!("Lyon"))?;
//! assert_eq!(root.get("address.city")?, json!("Lyon"));
//!
//! root.set(["address", "city"], json!("Nice"))?;
//! assert_eq!(address.get("city")?, json!("Nice"));
//! # Ok::<(), formbind::BindError>(())
//! ```

pub mod binding;
pub mod error;
pub mod model;
pub mod options;
pub mod path;

pub use binding::Binding;
pub use error::{BindError, FixSuggestion};
pub use options::BindingOptions;
pub use path::{IntoPath, Path};
