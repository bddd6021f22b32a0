//! # Segmentation
//!
//! Two-phase split of a guide into message blocks.
//!
//! ## Phases
//!
//! 1. **Line Classification** (`classify`): each raw line becomes a `LineKind`
//!    (directive, escaped content, separator, content) from local facts only
//!
//! 2. **Block Construction** (`builder`): a `Segmenter` tracks a `Mode` and
//!    emits `MessageBlock`s as blocks open and close, handing every directive to
//!    the command interpreter
//!
//! ## Key Invariants
//!
//! - Directives attach to the block whose content precedes them
//! - `..` at the start of a line is the only way to begin a body line with a dot
//! - Every block leaving the segmenter has `last_line` set

pub mod builder;
pub mod classify;
pub mod types;

pub use builder::{Segmented, Segmenter};
pub use classify::{LineKind, classify};
pub use types::{MessageBlock, Mode, TagRegistry};
