//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use crate::grid::Colour;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Block and UI colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub red: Color,
    pub green: Color,
    pub blue: Color,
    pub yellow: Color,
    /// Removed (collapsed) slots at the top of each column.
    pub removed: Color,
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (counts, help).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark hex values (from onedark.theme).
    pub fn onedark_default() -> Self {
        Self {
            red: Color::Rgb(0xE0, 0x6C, 0x75),    // cpu_end
            green: Color::Rgb(0x98, 0xC3, 0x79),  // mem_box
            blue: Color::Rgb(0x61, 0xAF, 0xEF),   // cpu_box
            yellow: Color::Rgb(0xE5, 0xC0, 0x7B), // title
            removed: Color::Rgb(0x5C, 0x63, 0x70), // inactive_fg
            bg: Color::Rgb(0x31, 0x35, 0x3F),     // meter_bg
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file does not exist.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))
            }
            _ => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override block colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        let [red, green, blue, yellow] = match palette {
            Palette::Normal => return,
            Palette::HighContrast => [
                Color::Rgb(0xFF, 0x00, 0x00),
                Color::Rgb(0x00, 0xFF, 0x00),
                Color::Rgb(0x00, 0x88, 0xFF),
                Color::Rgb(0xFF, 0xFF, 0x00),
            ],
            // Paul Tol's vibrant scheme; no red/green pair.
            Palette::Colorblind => [
                Color::Rgb(0xCC, 0x33, 0x11),
                Color::Rgb(0x00, 0x99, 0x88),
                Color::Rgb(0x00, 0x77, 0xBB),
                Color::Rgb(0xEE, 0x77, 0x33),
            ],
        };
        self.red = red;
        self.green = green;
        self.blue = blue;
        self.yellow = yellow;
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        // Keys match onedark.theme.
        Self {
            red: get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.red),
            green: get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.green),
            blue: get("cpu_box").unwrap_or(d.blue),
            yellow: get("title").or_else(|| get("cpu_mid")).unwrap_or(d.yellow),
            removed: get("inactive_fg").unwrap_or(d.removed),
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
        }
    }

    #[inline]
    pub fn block_color(&self, colour: Colour) -> Color {
        match colour {
            Colour::Red => self.red,
            Colour::Green => self.green,
            Colour::Blue => self.blue,
            Colour::Yellow => self.yellow,
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_from_map_overrides_and_falls_back() {
        let map = parse_theme_file(
            "theme[cpu_end]=\"#FF0000\"\n# comment\ntheme[inactive_fg]='#808080'\n",
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.red, Color::Rgb(0xFF, 0, 0));
        assert_eq!(theme.removed, Color::Rgb(0x80, 0x80, 0x80));
        assert_eq!(theme.blue, Theme::default().blue);
    }

    #[test]
    fn test_palette_colours_are_distinct() {
        for palette in [Palette::Normal, Palette::HighContrast, Palette::Colorblind] {
            let theme = Theme::load(None, palette).unwrap();
            let colours: std::collections::HashSet<_> =
                Colour::ALL.iter().map(|&c| theme.block_color(c)).collect();
            assert_eq!(colours.len(), Colour::ALL.len());
            assert!(!colours.contains(&theme.removed));
        }
    }
}
