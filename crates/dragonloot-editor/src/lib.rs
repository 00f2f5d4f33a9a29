//! In-game loot editor: menus, per-player sessions and chat prompts.

mod editor;
pub mod layout;
pub mod render;
mod session;

pub use editor::{LootEditor, TASK_ID_BASE};
pub use render::EditorMenu;
pub use session::{DialogField, EditorSession, Sessions};
