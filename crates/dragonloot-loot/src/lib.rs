//! Dragon loot: the persisted loot document and the drop engine.
//!
//! [`LootStore`] edits the document record by record; [`LootTable`] loads a
//! validated copy of it and rolls drops when the dragon dies.

mod entry;
mod error;
mod store;
mod table;

pub use entry::LootEntry;
pub use error::{AmountError, LootError};
pub use store::{LootStore, LOOT_FILE};
pub use table::{format_location, AmountRange, LootItem, LootTable};
