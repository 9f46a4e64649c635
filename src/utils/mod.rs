//! Internal helpers shared across modules.

mod dot;

pub(crate) use dot::{escape_dot, left_justified_label};
