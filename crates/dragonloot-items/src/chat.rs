//! Prefixed, colorized chat messages.

use dragonloot_plugin_api::ServerApi;

use crate::markup;

pub const DEFAULT_PREFIX: &str = "&e&lDragonLoot &8» &r";

/// Sends plugin messages with a common prefix, translating `&` markup.
#[derive(Debug, Clone)]
pub struct Messenger {
    prefix: String,
}

impl Default for Messenger {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Messenger {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Prefix and colorize a message.
    pub fn format(&self, message: &str) -> String {
        markup::decode(&format!("{}{message}", self.prefix))
    }

    pub fn send(&self, api: &mut dyn ServerApi, player_name: &str, message: &str) {
        api.send_message(player_name, &self.format(message));
    }

    /// Colorize without the prefix (headers, multi-line prompts).
    pub fn send_raw(&self, api: &mut dyn ServerApi, player_name: &str, message: &str) {
        api.send_message(player_name, &markup::decode(message));
    }

    pub fn broadcast(&self, api: &mut dyn ServerApi, message: &str) {
        api.broadcast_message(&self.format(message));
    }
}

/// Substitute one `%placeholder%` in a message template.
pub fn fill(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(&format!("%{placeholder}%"), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragonloot_plugin_api::testing::RecordingApi;

    #[test]
    fn format_prefixes_and_colors() {
        let messenger = Messenger::default();
        assert_eq!(
            messenger.format("&aSaved!"),
            "§e§lDragonLoot §8» §r§aSaved!"
        );
    }

    #[test]
    fn send_and_broadcast() {
        let messenger = Messenger::new("[DL] ");
        let mut api = RecordingApi::new();
        messenger.send(&mut api, "Alex", "&chi");
        messenger.send_raw(&mut api, "Alex", "&6&lInput Required");
        messenger.broadcast(&mut api, "boom");
        assert_eq!(api.messages_to("Alex"), vec!["[DL] §chi", "§6§lInput Required"]);
        assert_eq!(api.broadcasts, vec!["[DL] boom"]);
    }

    #[test]
    fn fill_placeholder() {
        assert_eq!(fill("Wait %time%s", "time", "42"), "Wait 42s");
        assert_eq!(fill("No placeholder", "time", "42"), "No placeholder");
    }
}
