use serde::{Deserialize, Serialize};

/// Structural limits of the destination platform.
///
/// Defaults are Discord's. Every field is optional when deserializing so a
/// config file can override just the limits it cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum message length in UTF-16 code units.
    pub message_length: usize,
    /// Maximum number of components in one component tree.
    pub components_per_message: usize,
    /// Maximum number of top-level action rows.
    pub action_rows: usize,
    /// Maximum number of children of one action row.
    pub action_row_children: usize,
    /// Maximum number of options of one select menu.
    pub select_options: usize,
    /// Maximum number of children of one section.
    pub section_children: usize,
    /// Smallest accepted spacer `spacing`.
    pub spacing_min: u64,
    /// Largest accepted spacer `spacing`.
    pub spacing_max: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            message_length: 2000,
            components_per_message: 40,
            action_rows: 5,
            action_row_children: 5,
            select_options: 25,
            section_children: 3,
            spacing_min: 1,
            spacing_max: 4,
        }
    }
}
