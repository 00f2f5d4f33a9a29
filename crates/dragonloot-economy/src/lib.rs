//! Spawn payments through a host currency provider.
//!
//! The host exposes currency operations per provider service name. The
//! manager picks one provider at startup (or on reload) and routes every
//! balance check, withdrawal and refund through it.

use dragonloot_plugin_api::ServerApi;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ─── Settings ────────────────────────────────────────────────────────────────

/// The `economy` section of the plugin config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    pub enabled: bool,
    /// `vault`, `coinsengine` or `auto`.
    pub provider: String,
    pub spawn_cost: f64,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "auto".into(),
            spawn_cost: 1000.0,
        }
    }
}

impl EconomySettings {
    /// Clamp invalid values. A negative cost becomes 0.
    pub fn sanitize(&mut self) {
        if !self.spawn_cost.is_finite() || self.spawn_cost < 0.0 {
            warn!("Spawn cost cannot be negative! Setting to 0.");
            self.spawn_cost = 0.0;
        }
    }
}

// ─── Providers ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    Vault,
    CoinsEngine,
    #[default]
    None,
}

impl ProviderKind {
    /// Service name the host knows the provider by.
    pub fn service(self) -> Option<&'static str> {
        match self {
            ProviderKind::Vault => Some("vault"),
            ProviderKind::CoinsEngine => Some("coinsengine"),
            ProviderKind::None => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Vault => "Vault",
            ProviderKind::CoinsEngine => "CoinsEngine",
            ProviderKind::None => "None",
        }
    }

    fn is_available(self, api: &dyn ServerApi) -> bool {
        self.service().is_some_and(|s| api.economy_available(s))
    }
}

/// Outcome of a spawn payment.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResult {
    pub success: bool,
    /// Amount actually withdrawn.
    pub amount: f64,
    pub message: String,
}

impl TransactionResult {
    fn success(amount: f64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            amount,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            amount: 0.0,
            message: message.into(),
        }
    }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Starts without a provider until [`EconomyManager::reload`] picks one.
#[derive(Debug, Default)]
pub struct EconomyManager {
    settings: EconomySettings,
    provider: ProviderKind,
}

impl EconomyManager {
    pub fn new(settings: EconomySettings, api: &dyn ServerApi) -> Self {
        let mut manager = Self::default();
        manager.reload(settings, api);
        manager
    }

    /// Apply new settings and pick the provider again.
    pub fn reload(&mut self, mut settings: EconomySettings, api: &dyn ServerApi) {
        settings.sanitize();
        self.provider = select_provider(&settings, api);
        self.settings = settings;
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.display_name()
    }

    pub fn spawn_cost(&self) -> f64 {
        self.settings.spawn_cost
    }

    /// Whether spawning costs anything right now.
    pub fn is_enabled(&self, api: &dyn ServerApi) -> bool {
        self.settings.enabled && self.provider.is_available(api) && self.settings.spawn_cost > 0.0
    }

    pub fn balance(&self, player_name: &str, api: &dyn ServerApi) -> f64 {
        match self.provider.service() {
            Some(service) => api.balance(service, player_name),
            None => 0.0,
        }
    }

    /// Format an amount the way the provider does, else `$1234.50`.
    pub fn format(&self, amount: f64, api: &dyn ServerApi) -> String {
        self.provider
            .service()
            .and_then(|service| api.format_currency(service, amount))
            .unwrap_or_else(|| format!("${amount:.2}"))
    }

    /// `exempt` players (free-spawn or admin) never pay.
    pub fn can_afford(&self, player_name: &str, exempt: bool, api: &dyn ServerApi) -> bool {
        if exempt || !self.is_enabled(api) {
            return true;
        }
        self.balance(player_name, api) >= self.settings.spawn_cost
    }

    /// Charge the spawn cost.
    pub fn process_spawn_payment(
        &self,
        player_name: &str,
        exempt: bool,
        api: &mut dyn ServerApi,
    ) -> TransactionResult {
        if exempt {
            return TransactionResult::success(0.0, "Free spawn (admin/bypass)");
        }
        if !self.is_enabled(api) {
            return TransactionResult::success(0.0, "Economy disabled or free");
        }

        let cost = self.settings.spawn_cost;
        let balance = self.balance(player_name, api);
        if balance < cost {
            return TransactionResult::failure(format!(
                "Insufficient funds! Need {} more (Balance: {}, Cost: {})",
                self.format(cost - balance, api),
                self.format(balance, api),
                self.format(cost, api),
            ));
        }

        if !self.withdraw(player_name, cost, api) {
            return TransactionResult::failure(
                "Transaction failed! Please try again or contact an administrator.",
            );
        }
        TransactionResult::success(
            cost,
            format!("Paid {} to spawn the Ender Dragon", self.format(cost, api)),
        )
    }

    fn withdraw(&self, player_name: &str, amount: f64, api: &mut dyn ServerApi) -> bool {
        if amount < 0.0 {
            warn!("Refusing negative withdrawal of {amount} from {player_name}");
            return false;
        }
        match self.provider.service() {
            Some(service) => api.withdraw(service, player_name, amount),
            None => false,
        }
    }

    /// Give back a payment after a failed spawn. Nothing to do counts as success.
    pub fn refund(&self, player_name: &str, amount: f64, api: &mut dyn ServerApi) -> bool {
        if amount <= 0.0 || !self.provider.is_available(api) {
            return true;
        }
        let Some(service) = self.provider.service() else {
            return true;
        };
        let formatted = self.format(amount, api);
        if api.deposit(service, player_name, amount) {
            info!("Refunded {formatted} to {player_name} (spawn failed)");
            true
        } else {
            error!("Failed to refund {formatted} to {player_name}, manual intervention required");
            false
        }
    }
}

fn select_provider(settings: &EconomySettings, api: &dyn ServerApi) -> ProviderKind {
    if !settings.enabled {
        info!("Economy integration is disabled in config");
        return ProviderKind::None;
    }

    let wanted = settings.provider.to_lowercase();
    let configured = match wanted.as_str() {
        "vault" => Some(ProviderKind::Vault),
        "coinsengine" => Some(ProviderKind::CoinsEngine),
        "auto" => None,
        other => {
            warn!("Unknown economy provider: {other}, using auto-detection");
            None
        }
    };

    match configured {
        Some(kind) if kind.is_available(api) => {
            info!("Economy provider: {}", kind.display_name());
            kind
        }
        Some(kind) => {
            warn!(
                "{} economy provider configured but not available, spawning will be free",
                kind.display_name()
            );
            ProviderKind::None
        }
        None => {
            for kind in [ProviderKind::Vault, ProviderKind::CoinsEngine] {
                if kind.is_available(api) {
                    info!("Economy provider: {} (auto-detected)", kind.display_name());
                    return kind;
                }
            }
            warn!("No economy provider detected, spawning will be free");
            ProviderKind::None
        }
    }
}
