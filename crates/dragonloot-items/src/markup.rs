//! Ampersand color markup.
//!
//! Config files and chat input use `&` codes (`&bShiny`, `&#ff8800Hot`);
//! items and messages carry `§` codes.

pub const SECTION: char = '§';

fn is_code(c: char) -> bool {
    matches!(c, '0'..='9' | 'a'..='f' | 'A'..='F' | 'k'..='o' | 'K'..='O' | 'r' | 'R' | 'x' | 'X')
}

/// Translate `&` codes and `&#RRGGBB` hex colors to `§` codes.
/// An `&` not followed by a code is left as is.
pub fn decode(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '&' {
            if let Some(hex) = hex_color_at(&chars, i + 1) {
                out.push(SECTION);
                out.push('x');
                for h in hex {
                    out.push(SECTION);
                    out.push(h.to_ascii_lowercase());
                }
                i += 8;
                continue;
            }
            if let Some(&next) = chars.get(i + 1) {
                if is_code(next) {
                    out.push(SECTION);
                    out.push(next.to_ascii_lowercase());
                    i += 2;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

fn hex_color_at(chars: &[char], start: usize) -> Option<[char; 6]> {
    if chars.get(start) != Some(&'#') {
        return None;
    }
    let digits = chars.get(start + 1..start + 7)?;
    if !digits.iter().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mut hex = ['0'; 6];
    hex.copy_from_slice(digits);
    Some(hex)
}

/// Translate `§` codes back to `&` codes, for storing item text in config.
pub fn encode(text: &str) -> String {
    text.replace(SECTION, "&")
}

/// Remove all `§` and `&` formatting codes, leaving plain text.
pub fn strip(text: &str) -> String {
    let decoded = decode(text);
    let mut out = String::with_capacity(decoded.len());
    let mut chars = decoded.chars();
    while let Some(c) = chars.next() {
        if c == SECTION {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_codes() {
        assert_eq!(decode("&bShiny &lBold"), "§bShiny §lBold");
        assert_eq!(decode("&CRed"), "§cRed");
        assert_eq!(decode("Fish & Chips"), "Fish & Chips");
        assert_eq!(decode("trailing &"), "trailing &");
        assert_eq!(decode("already §aGreen"), "already §aGreen");
    }

    #[test]
    fn decode_hex() {
        assert_eq!(decode("&#FF8800Hot"), "§x§f§f§8§8§0§0Hot");
        assert_eq!(decode("&#FF88Hot"), "&#FF88Hot");
    }

    #[test]
    fn encode_then_decode() {
        let item_text = "§bShiny §x§f§f§8§8§0§0Hot";
        assert_eq!(encode(item_text), "&bShiny &x&f&f&8&8&0&0Hot");
        assert_eq!(decode(&encode(item_text)), item_text);
    }

    #[test]
    fn strip_formatting() {
        assert_eq!(strip("§6§lLoot Editor"), "Loot Editor");
        assert_eq!(strip("&e&lDragon &8» &rHi"), "Dragon » Hi");
        assert_eq!(strip("plain"), "plain");
    }
}
