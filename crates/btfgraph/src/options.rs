//! Load-time options.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// What to do when a requested type name matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTypeNames {
    /// Fail with [`Error::UnknownTypeName`](crate::Error::UnknownTypeName).
    #[default]
    Error,
    /// Skip the name.
    Ignore,
}

/// Options applied while building a [`Spec`](crate::Spec).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecOptions {
    /// Keep only these types and everything they reach. Empty keeps all.
    pub type_names: BTreeSet<String>,
    pub missing_type_names: MissingTypeNames,
}

impl SpecOptions {
    /// Options keeping only the closure of `names`.
    pub fn with_type_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn missing_type_names(mut self, policy: MissingTypeNames) -> Self {
        self.missing_type_names = policy;
        self
    }

    /// Whether these options filter the graph at all.
    pub fn is_filtering(&self) -> bool {
        !self.type_names.is_empty()
    }
}
