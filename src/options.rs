//! Binding configuration
//!
//! Options are set on the root binding and inherited by every fieldset
//! derived from it.

use serde::{Deserialize, Deserializer, Serialize};

/// Default limit on nested `set` calls within one propagation chain.
pub const DEFAULT_MAX_PROPAGATION_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BindingOptions {
    /// Maximum number of `set` calls that may be nested on the call stack
    /// (listener → set → listener → ...) before the innermost call fails
    /// with `PropagationDepthExceeded`. Never below 1.
    #[serde(deserialize_with = "deserialize_depth")]
    pub max_propagation_depth: usize,
}

fn deserialize_depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(usize::deserialize(deserializer)?.max(1))
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            max_propagation_depth: DEFAULT_MAX_PROPAGATION_DEPTH,
        }
    }
}

impl BindingOptions {
    pub fn with_max_propagation_depth(mut self, depth: usize) -> Self {
        self.max_propagation_depth = depth.max(1);
        self
    }
}
