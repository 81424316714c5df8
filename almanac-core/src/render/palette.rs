//! Color palette and SGR escape sequences.
//!
//! The palette is a closed set: seven base colors, their background
//! variants, and three decorations. Free-form names are only accepted at
//! the edges ([`Color::from_name_lossy`], [`Style::from_name`]) and degrade to
//! neutral defaults instead of failing.

use serde::{Deserialize, Serialize};

/// SGR reset sequence.
pub const RESET: &str = "\x1b[0m";

/// Base colors a tag can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    Cyan,
    /// Neutral default for untagged appointments and unknown names
    #[default]
    White,
}

impl Color {
    /// Every palette color, in menu order.
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Purple,
        Color::Cyan,
        Color::White,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Purple => "purple",
            Color::Cyan => "cyan",
            Color::White => "white",
        }
    }

    /// Parse a stored or user-supplied color name, falling back to the
    /// neutral default for anything unrecognized.
    pub fn from_name_lossy(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(color = name, "Unknown color name, using default");
            Color::default()
        })
    }

    /// Offset of this color within the SGR 30-37 / 40-47 ranges.
    fn sgr_offset(&self) -> u8 {
        match self {
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Purple => 5,
            Color::Cyan => 6,
            Color::White => 7,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "purple" => Ok(Color::Purple),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            _ => Err(format!("unknown color: {}", s)),
        }
    }
}

/// A single SGR style applied to a text fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Foreground color
    Fg(Color),
    /// Background color, reserved for marking "today"
    Bg(Color),
    Bold,
    Italic,
    Underline,
    /// Reset only; what unknown style names resolve to
    Plain,
}

impl Style {
    /// Resolve a semantic style name such as `"blue"`, `"bg_blue"` or
    /// `"underline"`. Unknown names resolve to [`Style::Plain`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "bold" => return Style::Bold,
            "italic" => return Style::Italic,
            "underline" => return Style::Underline,
            _ => {}
        }
        if let Some(base) = name.strip_prefix("bg_") {
            return base.parse().map(Style::Bg).unwrap_or(Style::Plain);
        }
        name.parse().map(Style::Fg).unwrap_or(Style::Plain)
    }

    /// The background variant of this style. Decorations are unchanged.
    pub fn to_background(self) -> Self {
        match self {
            Style::Fg(color) => Style::Bg(color),
            other => other,
        }
    }

    /// SGR escape sequence that turns this style on.
    pub fn escape(&self) -> String {
        match self {
            Style::Fg(color) => format!("\x1b[{}m", 30 + color.sgr_offset()),
            Style::Bg(color) => format!("\x1b[{}m", 40 + color.sgr_offset()),
            Style::Bold => "\x1b[1m".to_string(),
            Style::Italic => "\x1b[3m".to_string(),
            Style::Underline => "\x1b[4m".to_string(),
            Style::Plain => RESET.to_string(),
        }
    }
}

impl From<Color> for Style {
    fn from(color: Color) -> Self {
        Style::Fg(color)
    }
}

/// Wrap `text` in the escape sequence for `style`, followed by a reset.
pub fn paint(style: impl Into<Style>, text: &str) -> String {
    let style = style.into();
    format!("{}{}{}", style.escape(), text, RESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_round_trips_through_name() {
        for color in Color::ALL {
            assert_eq!(color.as_str().parse::<Color>(), Ok(color));
        }
        assert_eq!("BLUE".parse::<Color>(), Ok(Color::Blue));
    }

    #[test]
    fn test_unknown_color_falls_back_to_default() {
        assert_eq!(Color::from_name_lossy("#ff00ff"), Color::White);
        assert_eq!(Color::from_name_lossy("magenta"), Color::White);
    }

    #[test]
    fn test_style_from_name() {
        assert_eq!(Style::from_name("red"), Style::Fg(Color::Red));
        assert_eq!(Style::from_name("bg_cyan"), Style::Bg(Color::Cyan));
        assert_eq!(Style::from_name("Underline"), Style::Underline);
        assert_eq!(Style::from_name("bg_mauve"), Style::Plain);
        assert_eq!(Style::from_name("sparkly"), Style::Plain);
    }

    #[test]
    fn test_escape_codes() {
        assert_eq!(Style::Fg(Color::Red).escape(), "\x1b[31m");
        assert_eq!(Style::Fg(Color::White).escape(), "\x1b[37m");
        assert_eq!(Style::Bg(Color::Blue).escape(), "\x1b[44m");
        assert_eq!(Style::Bold.escape(), "\x1b[1m");
        assert_eq!(Style::Plain.escape(), RESET);
    }

    #[test]
    fn test_paint_wraps_with_reset() {
        assert_eq!(paint(Color::Blue, "12"), "\x1b[34m12\x1b[0m");
        assert_eq!(paint(Style::Plain, "x"), "\x1b[0mx\x1b[0m");
    }

    #[test]
    fn test_to_background() {
        assert_eq!(Style::Fg(Color::Green).to_background(), Style::Bg(Color::Green));
        assert_eq!(Style::Bold.to_background(), Style::Bold);
    }
}
