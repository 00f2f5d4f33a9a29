//! Item stack builder used for menu icons and loot drops.

use dragonloot_plugin_api::ItemStack;

use crate::markup;

/// Builds an [`ItemStack`], decoding `&` markup in name and lore.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    stack: ItemStack,
}

impl ItemBuilder {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            stack: ItemStack::new(material, 1),
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.stack.count = count;
        self
    }

    /// Set the display name. An empty name leaves the default name.
    pub fn name(mut self, name: &str) -> Self {
        if !name.is_empty() {
            self.stack.display_name = Some(markup::decode(name));
        }
        self
    }

    pub fn lore<S: AsRef<str>>(mut self, lines: &[S]) -> Self {
        self.stack.lore = lines.iter().map(|l| markup::decode(l.as_ref())).collect();
        self
    }

    pub fn lore_line(mut self, line: &str) -> Self {
        self.stack.lore.push(markup::decode(line));
        self
    }

    pub fn enchant(mut self, key: &str, level: u32) -> Self {
        self.stack.enchantments.push((key.to_string(), level));
        self
    }

    pub fn build(self) -> ItemStack {
        self.stack
    }
}

/// A named menu icon with lore.
pub fn menu_icon<S: AsRef<str>>(material: &str, name: &str, lore: &[S]) -> ItemStack {
    ItemBuilder::new(material).name(name).lore(lore).build()
}
