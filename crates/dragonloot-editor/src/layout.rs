//! Slot layout and paging math for the editor menus.

use dragonloot_plugin_api::ROW_WIDTH;

/// Rows of the large (54-slot) editor menus.
pub const LARGE_ROWS: usize = 6;
pub const LARGE_SIZE: usize = LARGE_ROWS * ROW_WIDTH;

// Editor root (27 slots)
pub const ROOT_RELOAD_SLOT: usize = 11;
pub const ROOT_LOOT_SLOT: usize = 13;

// Loot list controls
pub const ADD_SLOT: usize = 45;
pub const SORT_SLOT: usize = 46;
pub const PREV_PAGE_SLOT: usize = 48;
pub const BACK_SLOT: usize = 49;
pub const NEXT_PAGE_SLOT: usize = 50;
pub const GET_ALL_SLOT: usize = 53;

// Item editor
pub const PREVIEW_SLOT: usize = 13;
pub const SWAP_SLOT: usize = 29;
pub const AMOUNT_SLOT: usize = 30;
pub const NAME_SLOT: usize = 31;
pub const CHANCE_SLOT: usize = 32;
pub const LORE_SLOT: usize = 33;
pub const DELETE_SLOT: usize = 45;
pub const SAVE_SLOT: usize = 53;

// Content menu; the only slot the player may put items into.
pub const CONTENT_SLOT: usize = 22;

/// Border: first and last row, first and last column.
pub fn is_border(slot: usize) -> bool {
    let row = slot / ROW_WIDTH;
    let col = slot % ROW_WIDTH;
    row == 0 || row == LARGE_ROWS - 1 || col == 0 || col == ROW_WIDTH - 1
}

/// Interior slots of a large menu, in reading order.
pub fn interior_slots() -> impl Iterator<Item = usize> {
    (0..LARGE_SIZE).filter(|&slot| !is_border(slot))
}

/// Entries shown per loot list page.
pub const PAGE_CAPACITY: usize = (LARGE_ROWS - 2) * (ROW_WIDTH - 2);

/// Position of a slot among the interior slots.
pub fn interior_position(slot: usize) -> Option<usize> {
    if slot >= LARGE_SIZE || is_border(slot) {
        return None;
    }
    let row = slot / ROW_WIDTH;
    let col = slot % ROW_WIDTH;
    Some((row - 1) * (ROW_WIDTH - 2) + (col - 1))
}

/// Pages shown for `total` entries; never less than one.
pub fn page_count(total: usize, capacity: usize) -> usize {
    total.div_ceil(capacity.max(1)).max(1)
}

pub fn last_page(total: usize, capacity: usize) -> usize {
    page_count(total, capacity) - 1
}
