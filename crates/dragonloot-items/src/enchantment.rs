//! Vanilla enchantment registry and `NAME:LEVEL` token parsing.

use thiserror::Error;

/// Static enchantment definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnchantmentInfo {
    /// Namespaced key without the `minecraft:` prefix.
    pub key: &'static str,
    pub max_level: u32,
}

const fn ench(key: &'static str, max_level: u32) -> EnchantmentInfo {
    EnchantmentInfo { key, max_level }
}

pub const ENCHANTMENT_LIST: &[EnchantmentInfo] = &[
    // Armor
    ench("protection", 4),
    ench("fire_protection", 4),
    ench("feather_falling", 4),
    ench("blast_protection", 4),
    ench("projectile_protection", 4),
    ench("respiration", 3),
    ench("aqua_affinity", 1),
    ench("thorns", 3),
    ench("depth_strider", 3),
    ench("frost_walker", 2),
    ench("soul_speed", 3),
    ench("swift_sneak", 3),
    ench("binding_curse", 1),
    // Melee
    ench("sharpness", 5),
    ench("smite", 5),
    ench("bane_of_arthropods", 5),
    ench("knockback", 2),
    ench("fire_aspect", 2),
    ench("looting", 3),
    ench("sweeping_edge", 3),
    ench("density", 5),
    ench("breach", 4),
    ench("wind_burst", 3),
    // Tools
    ench("efficiency", 5),
    ench("silk_touch", 1),
    ench("unbreaking", 3),
    ench("fortune", 3),
    // Ranged
    ench("power", 5),
    ench("punch", 2),
    ench("flame", 1),
    ench("infinity", 1),
    ench("multishot", 1),
    ench("quick_charge", 3),
    ench("piercing", 4),
    // Trident
    ench("loyalty", 3),
    ench("impaling", 5),
    ench("riptide", 3),
    ench("channeling", 1),
    // Fishing
    ench("luck_of_the_sea", 3),
    ench("lure", 3),
    // Any
    ench("mending", 1),
    ench("vanishing_curse", 1),
];

/// Look up an enchantment by name, case-insensitive (`SHARPNESS` → `sharpness`).
/// A `minecraft:` prefix is accepted.
pub fn enchantment_by_name(name: &str) -> Option<&'static EnchantmentInfo> {
    let lower = name.trim().to_ascii_lowercase();
    let key = lower.strip_prefix("minecraft:").unwrap_or(&lower);
    ENCHANTMENT_LIST.iter().find(|e| e.key == key)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnchantmentError {
    #[error("expected NAME:LEVEL")]
    Format,

    #[error("invalid level '{0}'")]
    InvalidLevel(String),

    #[error("level must be at least 1, got {0}")]
    LevelTooLow(i64),

    #[error("unknown enchantment '{0}'")]
    Unknown(String),
}

/// Parse a `NAME:LEVEL` token. Levels above the vanilla maximum are allowed.
pub fn parse_enchantment(token: &str) -> Result<(&'static EnchantmentInfo, u32), EnchantmentError> {
    let parts: Vec<&str> = token.split(':').collect();
    let (name, level) = match parts.as_slice() {
        [name, level] => (*name, *level),
        // Namespaced form: minecraft:sharpness:5
        [ns, name, level] if ns.eq_ignore_ascii_case("minecraft") => (*name, *level),
        _ => return Err(EnchantmentError::Format),
    };

    let level: i64 = level
        .trim()
        .parse()
        .map_err(|_| EnchantmentError::InvalidLevel(level.trim().to_string()))?;
    if level < 1 {
        return Err(EnchantmentError::LevelTooLow(level));
    }
    let level = u32::try_from(level).map_err(|_| EnchantmentError::InvalidLevel(level.to_string()))?;

    let info = enchantment_by_name(name).ok_or_else(|| EnchantmentError::Unknown(name.to_string()))?;
    Ok((info, level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(enchantment_by_name("SHARPNESS").unwrap().key, "sharpness");
        assert_eq!(enchantment_by_name("minecraft:mending").unwrap().max_level, 1);
        assert!(enchantment_by_name("super_sharp").is_none());
    }

    #[test]
    fn parse_tokens() {
        let (info, level) = parse_enchantment("SHARPNESS:5").unwrap();
        assert_eq!(info.key, "sharpness");
        assert_eq!(level, 5);

        // Unsafe levels pass
        let (_, level) = parse_enchantment("unbreaking:10").unwrap();
        assert_eq!(level, 10);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_enchantment("SHARPNESS"), Err(EnchantmentError::Format));
        assert_eq!(
            parse_enchantment("SHARPNESS:five"),
            Err(EnchantmentError::InvalidLevel("five".into()))
        );
        assert_eq!(parse_enchantment("SHARPNESS:0"), Err(EnchantmentError::LevelTooLow(0)));
        assert_eq!(
            parse_enchantment("FLIGHT:2"),
            Err(EnchantmentError::Unknown("FLIGHT".into()))
        );
    }
}
