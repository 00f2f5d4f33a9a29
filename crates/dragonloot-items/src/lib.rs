//! Item-side vocabulary shared by the loot engine, the editor and the plugin:
//! the material catalog, enchantments, `&` markup, item building and chat.

pub mod builder;
pub mod chat;
pub mod enchantment;
pub mod markup;
pub mod material;

pub use builder::{menu_icon, ItemBuilder};
pub use chat::Messenger;
pub use enchantment::{enchantment_by_name, parse_enchantment, EnchantmentError, EnchantmentInfo};
pub use material::{MaterialInfo, MaterialRegistry};
