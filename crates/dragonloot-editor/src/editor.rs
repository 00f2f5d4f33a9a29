//! The loot editor: sessions, paging, click handling and chat prompts.

use std::collections::HashMap;

use dragonloot_items::{markup, Messenger};
use dragonloot_loot::{LootStore, LootTable};
use dragonloot_plugin_api::{EventResult, ItemStack, PluginPlayer, ServerApi};
use tracing::{debug, info};

use crate::layout::*;
use crate::render::{self, format_chance, EditorMenu};
use crate::session::{DialogField, EditorSession, Sessions};

/// Scheduler ids handed out by the editor start here, above the plugin's own.
pub const TASK_ID_BASE: u32 = 0x0001_0000;

const SAVE_HINT: &str = "&7Click &aSave &7to apply changes!";

/// Work deferred to a later tick.
#[derive(Debug, Clone)]
enum EditorTask {
    CloseMenu { player_name: String },
    Respond { player: PluginPlayer, text: String },
}

pub struct LootEditor {
    store: LootStore,
    sessions: Sessions,
    pages: HashMap<String, usize>,
    messenger: Messenger,
    plugin_name: String,
    tasks: HashMap<u32, EditorTask>,
    next_task_id: u32,
    idle_timeout_ticks: u64,
}

impl LootEditor {
    pub fn new(store: LootStore, plugin_name: impl Into<String>, messenger: Messenger) -> Self {
        Self {
            store,
            sessions: Sessions::default(),
            pages: HashMap::new(),
            messenger,
            plugin_name: plugin_name.into(),
            tasks: HashMap::new(),
            next_task_id: TASK_ID_BASE,
            idle_timeout_ticks: 0,
        }
    }

    /// Sessions idle this long are dropped by [`LootEditor::evict_idle`].
    /// Zero keeps them forever.
    pub fn set_idle_timeout_ticks(&mut self, ticks: u64) {
        self.idle_timeout_ticks = ticks;
    }

    pub fn set_messenger(&mut self, messenger: Messenger) {
        self.messenger = messenger;
    }

    pub fn store(&self) -> &LootStore {
        &self.store
    }

    pub fn session(&self, uuid: &str) -> Option<&EditorSession> {
        self.sessions.get(uuid)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The stored loot list page for a player.
    pub fn page(&self, uuid: &str) -> usize {
        self.pages.get(uuid).copied().unwrap_or(0)
    }

    pub fn is_editor_menu(title: &str) -> bool {
        EditorMenu::from_title(title).is_some()
    }

    /// The field a player's next chat message will fill, if any.
    pub fn input_request(&self, uuid: &str) -> Option<DialogField> {
        self.sessions
            .get(uuid)
            .filter(|s| s.awaiting_input)
            .and_then(|s| s.dialog)
    }

    // ─── Menus ───────────────────────────────────────────────────────────────

    pub fn open_root(&mut self, player: &PluginPlayer, api: &mut dyn ServerApi, loot: &LootTable) {
        api.open_menu(&player.name, render::root(loot.item_count()));
    }

    /// Render the loot list at the player's page, clamped to the pages that exist.
    pub fn open_loot_list(&mut self, player: &PluginPlayer, api: &mut dyn ServerApi) {
        let entries = self.store.all_entries();
        let page = self
            .page(&player.uuid)
            .min(last_page(entries.len(), PAGE_CAPACITY));
        self.pages.insert(player.uuid.clone(), page);
        api.open_menu(&player.name, render::loot_list(&entries, page));
    }

    /// Open the item editor for `index`, starting a session unless the
    /// player is already editing that index.
    pub fn open_item_editor(
        &mut self,
        player: &PluginPlayer,
        index: usize,
        api: &mut dyn ServerApi,
    ) -> bool {
        let tick = api.get_tick();
        let editing = self
            .sessions
            .get(&player.uuid)
            .is_some_and(|s| s.loot_index == index);
        if !editing {
            let Some(entry) = self.store.entry(index) else {
                self.messenger.send(api, &player.name, "&cInvalid loot item!");
                return false;
            };
            self.sessions
                .insert(&player.uuid, EditorSession::new(index, entry, tick));
        }

        let Some(session) = self.sessions.get_mut(&player.uuid) else {
            return false;
        };
        session.last_touched_tick = tick;
        api.open_menu(&player.name, render::item_editor(&session.entry));
        true
    }

    pub fn open_content(&mut self, player: &PluginPlayer, api: &mut dyn ServerApi) {
        match self.sessions.get(&player.uuid) {
            Some(session) => api.open_menu(&player.name, render::content(&session.entry)),
            None => self
                .messenger
                .send(api, &player.name, "&cNo active editing session!"),
        }
    }

    // ─── Clicks ──────────────────────────────────────────────────────────────

    /// Handle a click in one of the editor menus. Returns `Cancelled` for
    /// every editor menu click except on the content slot, so the player can
    /// place an item there. Clicks outside editor menus are left alone.
    pub fn handle_click(
        &mut self,
        player: &PluginPlayer,
        title: &str,
        slot: usize,
        item: Option<&ItemStack>,
        api: &mut dyn ServerApi,
        loot: &mut LootTable,
    ) -> EventResult {
        let Some(menu) = EditorMenu::from_title(title) else {
            return EventResult::Continue;
        };
        if menu == EditorMenu::Content && slot == CONTENT_SLOT {
            return EventResult::Continue;
        }
        if item.map_or(true, ItemStack::is_empty) {
            return EventResult::Cancelled;
        }

        if let Some(session) = self.sessions.get_mut(&player.uuid) {
            session.last_touched_tick = api.get_tick();
        }

        match menu {
            EditorMenu::Root => self.click_root(player, slot, api, loot),
            EditorMenu::LootList => self.click_loot_list(player, slot, api, loot),
            EditorMenu::ItemEditor => self.click_item_editor(player, slot, api, loot),
            EditorMenu::Content => self.click_content(player, slot, api),
        }
        EventResult::Cancelled
    }

    fn click_root(
        &mut self,
        player: &PluginPlayer,
        slot: usize,
        api: &mut dyn ServerApi,
        loot: &mut LootTable,
    ) {
        match slot {
            ROOT_LOOT_SLOT => self.open_loot_list(player, api),
            ROOT_RELOAD_SLOT => {
                self.messenger
                    .send(api, &player.name, "&eReloading loot configuration...");
                if loot.reload() {
                    self.messenger.send(
                        api,
                        &player.name,
                        "&aLoot configuration reloaded successfully!",
                    );
                    self.messenger.send(
                        api,
                        &player.name,
                        &format!("&7Loaded {} loot item(s).", loot.item_count()),
                    );
                } else {
                    self.messenger
                        .send(api, &player.name, "&cFailed to reload loot configuration!");
                }
                self.open_root(player, api, loot);
            }
            _ => {}
        }
    }

    fn click_loot_list(
        &mut self,
        player: &PluginPlayer,
        slot: usize,
        api: &mut dyn ServerApi,
        loot: &mut LootTable,
    ) {
        let name = player.name.as_str();
        match slot {
            ADD_SLOT => {
                if self.store.add_default_entry() {
                    self.messenger.send(api, name, "&aNew loot item added!");
                    let total = self.store.all_entries().len();
                    self.pages
                        .insert(player.uuid.clone(), last_page(total, PAGE_CAPACITY));
                } else {
                    self.messenger.send(api, name, "&cFailed to add loot item!");
                }
                self.open_loot_list(player, api);
            }
            SORT_SLOT => {
                if self.store.sort_by_chance_descending() {
                    self.messenger
                        .send(api, name, "&aLoot entries sorted by chance (high → low).");
                    self.open_loot_list(player, api);
                } else {
                    self.messenger.send(api, name, "&cFailed to sort loot entries.");
                }
            }
            PREV_PAGE_SLOT => {
                let page = self.page(&player.uuid);
                if page > 0 {
                    self.pages.insert(player.uuid.clone(), page - 1);
                    self.open_loot_list(player, api);
                } else {
                    self.messenger.send(api, name, "&7Already on the first page.");
                }
            }
            NEXT_PAGE_SLOT => {
                let total = self.store.all_entries().len();
                let page = self.page(&player.uuid);
                if page < last_page(total, PAGE_CAPACITY) {
                    self.pages.insert(player.uuid.clone(), page + 1);
                    self.open_loot_list(player, api);
                } else {
                    self.messenger.send(api, name, "&7No more pages.");
                }
            }
            BACK_SLOT => {
                self.pages.remove(&player.uuid);
                self.open_root(player, api, loot);
            }
            GET_ALL_SLOT => self.give_all(player, api),
            _ => {
                let Some(position) = interior_position(slot) else {
                    return;
                };
                let index = self.page(&player.uuid) * PAGE_CAPACITY + position;
                if index < self.store.all_entries().len() {
                    self.open_item_editor(player, index, api);
                } else {
                    self.messenger.send(api, name, "&7No loot item in that slot.");
                }
            }
        }
    }

    fn give_all(&mut self, player: &PluginPlayer, api: &mut dyn ServerApi) {
        let entries = self.store.all_entries();
        if entries.is_empty() {
            self.messenger
                .send(api, &player.name, "&7No loot items configured.");
            return;
        }
        for entry in &entries {
            api.give_item(&player.name, render::sample_stack(entry));
        }
        self.messenger.send(
            api,
            &player.name,
            "&aAll loot items have been given to you (check inventory). If full, items were dropped on the ground.",
        );
    }

    fn click_item_editor(
        &mut self,
        player: &PluginPlayer,
        slot: usize,
        api: &mut dyn ServerApi,
        loot: &mut LootTable,
    ) {
        let name = player.name.as_str();
        let Some(session) = self.sessions.get(&player.uuid) else {
            self.messenger
                .send(api, name, "&cNo active editing session! Please reopen the editor.");
            return;
        };
        let index = session.loot_index;

        match slot {
            PREVIEW_SLOT => {
                let entry = &session.entry;
                if entry.material.is_empty() || entry.material.eq_ignore_ascii_case("AIR") {
                    self.messenger.send(api, name, "&7No item set.");
                    return;
                }
                api.drop_item(&player.location, render::sample_stack(entry));
                self.messenger.send(
                    api,
                    name,
                    "&aDropped a test item at your feet (preserves name & lore).",
                );
            }
            SWAP_SLOT => self.open_content(player, api),
            AMOUNT_SLOT => {
                let current = session.entry.amount.clone();
                self.show_dialog(player, DialogField::Amount, &current, api);
            }
            NAME_SLOT => {
                let current = session.entry.custom_name.clone();
                self.show_dialog(player, DialogField::Name, &current, api);
            }
            CHANCE_SLOT => {
                let current = format_chance(session.entry.chance);
                self.show_dialog(player, DialogField::Chance, &current, api);
            }
            LORE_SLOT => {
                let current = session.entry.lore.join("|");
                self.show_dialog(player, DialogField::Lore, &current, api);
            }
            DELETE_SLOT => {
                if self.store.delete_entry(index) {
                    self.messenger.send(api, name, "&aLoot item deleted!");
                    loot.reload();
                } else {
                    self.messenger.send(api, name, "&cFailed to delete loot item!");
                }
                self.sessions.remove(&player.uuid);
                self.open_loot_list(player, api);
            }
            BACK_SLOT => {
                self.sessions.remove(&player.uuid);
                self.open_loot_list(player, api);
            }
            SAVE_SLOT => {
                if self.store.update_entry(index, &session.entry) {
                    self.messenger.send(api, name, "&aChanges saved successfully!");
                    loot.reload();
                } else {
                    self.messenger.send(api, name, "&cFailed to save changes!");
                }
                self.sessions.remove(&player.uuid);
                self.open_loot_list(player, api);
            }
            _ => {}
        }
    }

    fn click_content(&mut self, player: &PluginPlayer, slot: usize, api: &mut dyn ServerApi) {
        let Some(index) = self.sessions.get(&player.uuid).map(|s| s.loot_index) else {
            self.messenger.send(
                api,
                &player.name,
                "&cNo active editing session! Please reopen the editor.",
            );
            return;
        };
        match slot {
            BACK_SLOT => {
                self.open_item_editor(player, index, api);
            }
            SAVE_SLOT => {
                let placed = api.menu_slot(&player.name, CONTENT_SLOT);
                self.apply_content(player, placed, api);
                self.open_item_editor(player, index, api);
            }
            _ => {}
        }
    }

    /// Copy the content slot's item onto the working copy. Memory only.
    fn apply_content(
        &mut self,
        player: &PluginPlayer,
        placed: Option<ItemStack>,
        api: &mut dyn ServerApi,
    ) {
        let Some(session) = self.sessions.get_mut(&player.uuid) else {
            return;
        };
        let entry = &mut session.entry;

        if placed.as_ref() == Some(&render::content_item(entry)) {
            self.messenger.send(api, &player.name, "&7Content unchanged.");
            return;
        }

        match placed.filter(|item| !item.is_empty() && *item != render::content_placeholder()) {
            None => {
                entry.material = "AIR".into();
                entry.amount = "1".into();
                entry.custom_name.clear();
                entry.lore.clear();
                self.messenger.send(
                    api,
                    &player.name,
                    "&eContent cleared (will be saved when you click Save)",
                );
            }
            Some(item) => {
                entry.material = item.material.to_uppercase();
                entry.amount = item.count.max(1).to_string();
                entry.custom_name = item
                    .display_name
                    .as_deref()
                    .map(markup::encode)
                    .unwrap_or_default();
                entry.lore = item.lore.iter().map(|l| markup::encode(l)).collect();
                self.messenger.send(
                    api,
                    &player.name,
                    "&aContent updated in session. Click Save to persist.",
                );
            }
        }
    }

    // ─── Chat input ──────────────────────────────────────────────────────────

    /// Prompt for a field value in chat. The menu closes on the next tick.
    fn show_dialog(
        &mut self,
        player: &PluginPlayer,
        field: DialogField,
        current: &str,
        api: &mut dyn ServerApi,
    ) {
        let Some(session) = self.sessions.get_mut(&player.uuid) else {
            self.messenger
                .send(api, &player.name, "&cNo active editing session!");
            return;
        };
        session.dialog = Some(field);
        session.awaiting_input = true;

        self.schedule(
            EditorTask::CloseMenu {
                player_name: player.name.clone(),
            },
            api,
        );

        let current = if current.is_empty() { "None" } else { current };
        let name = player.name.as_str();
        self.messenger.send(api, name, "&e&lInput Required");
        self.messenger.send(api, name, field.instruction());
        self.messenger.send(api, name, &format!("&7Current: &f{current}"));
        self.messenger.send(
            api,
            name,
            "&7Type your value in chat, or type &ccancel &7to go back.",
        );
    }

    /// Take a chat message as the answer to the open prompt. The answer is
    /// applied on the next tick. Later messages are not intercepted.
    pub fn queue_response(&mut self, player: &PluginPlayer, text: &str, api: &mut dyn ServerApi) {
        if let Some(session) = self.sessions.get_mut(&player.uuid) {
            session.awaiting_input = false;
        }
        self.schedule(
            EditorTask::Respond {
                player: player.clone(),
                text: text.to_string(),
            },
            api,
        );
    }

    /// Apply a prompt answer to the working copy and reopen the item editor.
    pub fn handle_response(&mut self, player: &PluginPlayer, text: &str, api: &mut dyn ServerApi) {
        let name = player.name.as_str();
        let Some(session) = self.sessions.get_mut(&player.uuid) else {
            self.messenger
                .send(api, name, "&cNo active editing session! Please reopen the editor.");
            return;
        };
        session.awaiting_input = false;
        session.last_touched_tick = api.get_tick();
        let index = session.loot_index;

        let answer = text.trim();
        if answer.eq_ignore_ascii_case("cancel") || answer.eq_ignore_ascii_case("back") {
            self.messenger.send(api, name, "&7Input cancelled.");
            self.open_item_editor(player, index, api);
            return;
        }

        let entry = &mut session.entry;
        match session.dialog {
            Some(DialogField::Chance) => match answer.parse::<f64>() {
                Ok(chance) if (0.0..=100.0).contains(&chance) => {
                    entry.chance = chance;
                    self.messenger.send(
                        api,
                        name,
                        &format!("&aChance updated to &f{}%", format_chance(chance)),
                    );
                    self.messenger.send(api, name, SAVE_HINT);
                }
                Ok(_) => {
                    self.messenger
                        .send(api, name, "&cChance must be between 0 and 100!");
                }
                Err(_) => {
                    self.messenger
                        .send(api, name, "&cInvalid number format! Please enter a number.");
                }
            },
            Some(DialogField::Name) => {
                entry.custom_name = text.to_string();
                self.messenger
                    .send(api, name, &format!("&aName updated to: {text}"));
                self.messenger.send(api, name, SAVE_HINT);
            }
            Some(DialogField::Amount) => {
                entry.amount = text.to_string();
                self.messenger
                    .send(api, name, &format!("&aAmount updated to: &f{text}"));
                self.messenger.send(api, name, SAVE_HINT);
            }
            Some(DialogField::Lore) => {
                entry.lore = split_lore(text);
                self.messenger.send(api, name, "&aLore updated!");
                self.messenger.send(api, name, SAVE_HINT);
            }
            None => {}
        }

        self.open_item_editor(player, index, api);
    }

    // ─── Tasks & lifecycle ───────────────────────────────────────────────────

    fn schedule(&mut self, task: EditorTask, api: &mut dyn ServerApi) {
        let id = self.next_task_id;
        self.next_task_id = self.next_task_id.checked_add(1).unwrap_or(TASK_ID_BASE);
        self.tasks.insert(id, task);
        api.schedule_delayed(&self.plugin_name, 1, id);
    }

    /// Run a task scheduled by the editor. Returns false for ids it does not own.
    pub fn run_task(&mut self, task_id: u32, api: &mut dyn ServerApi) -> bool {
        let Some(task) = self.tasks.remove(&task_id) else {
            return false;
        };
        match task {
            EditorTask::CloseMenu { player_name } => api.close_menu(&player_name),
            EditorTask::Respond { player, text } => self.handle_response(&player, &text, api),
        }
        true
    }

    /// Forget a player's session and page, e.g. when they leave.
    pub fn forget(&mut self, uuid: &str) {
        if self.sessions.remove(uuid).is_some() {
            debug!("Dropped editor session of {uuid}");
        }
        self.pages.remove(uuid);
    }

    /// Drop sessions idle longer than the configured timeout.
    pub fn evict_idle(&mut self, now_tick: u64) -> usize {
        if self.idle_timeout_ticks == 0 {
            return 0;
        }
        let evicted = self.sessions.evict_idle(now_tick, self.idle_timeout_ticks);
        if !evicted.is_empty() {
            info!("Evicted {} idle editor session(s)", evicted.len());
        }
        evicted.len()
    }
}

/// Split on `|`, dropping trailing empty lines. An empty answer is one
/// empty line.
fn split_lore(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut lines: Vec<String> = text.split('|').map(str::to_string).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}
