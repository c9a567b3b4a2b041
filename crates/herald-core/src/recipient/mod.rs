//! Recipient domain module.
//!
//! - `model`: `Recipient` and `RecipientKind`
//! - `selection`: `SelectionSet`, the user's pick of recipient ids

mod model;
mod selection;

pub use model::{Recipient, RecipientKind};
pub use selection::SelectionSet;
