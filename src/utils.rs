use regex::Regex;
use std::sync::LazyLock;

static BUS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r": BUS\w+$").unwrap());

/// Strips the trailing `": BUS<code>"` token CityBus appends to stop names
pub fn strip_bus_suffix(stop_name: &str) -> String {
    BUS_SUFFIX.replace(stop_name, "").into_owned()
}

/// Parses a `#RRGGBB` color into its channels
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Four cells of 24-bit background color, or four blanks if the color can't be read
pub fn color_blocks(hex: &str) -> String {
    match parse_hex_color(hex) {
        Some((r, g, b)) => format!("\x1b[48;2;{r};{g};{b}m    \x1b[0m"),
        None => "    ".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bus_suffix() {
        assert_eq!(strip_bus_suffix("Main St: BUS123"), "Main St");
        assert_eq!(strip_bus_suffix("5th & Main: BUS101"), "5th & Main");
        assert_eq!(strip_bus_suffix("CityBus Center: BUS215X"), "CityBus Center");
    }

    #[test]
    fn test_strip_bus_suffix_only_at_end() {
        assert_eq!(strip_bus_suffix("Depot: BUS Shelter"), "Depot: BUS Shelter");
        assert_eq!(strip_bus_suffix("A: BUS1 B"), "A: BUS1 B");
        assert_eq!(strip_bus_suffix("A: BUS1: BUS2"), "A: BUS1");
        assert_eq!(strip_bus_suffix("Purdue Memorial Union"), "Purdue Memorial Union");
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#5CB8B2"), Some((0x5c, 0xb8, 0xb2)));
        assert_eq!(parse_hex_color("#000000"), Some((0, 0, 0)));
        assert_eq!(parse_hex_color("5CB8B2"), None);
        assert_eq!(parse_hex_color("#5CB8"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn test_color_blocks() {
        assert_eq!(color_blocks("#FF0080"), "\x1b[48;2;255;0;128m    \x1b[0m");
        assert_eq!(color_blocks("red"), "    ");
    }
}
