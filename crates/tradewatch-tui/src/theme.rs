//! Colour theme for the tradewatch TUI.
//!
//! Themes are TOML files embedded in the binary via [`include_str!`] and
//! parsed through the `config` crate, so the application works without any
//! files on disk. Load once with [`Theme::load_default`] (or
//! [`Theme::by_name`] from the `:theme` command) and pass by reference.
//!
//! # Account colours
//!
//! Account ids are hashed to a stable index into the palette so the same
//! account always gets the same colour, regardless of arrival order.

use config::{Config, File, FileFormat};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use tradewatch_core::{ConnectionState, LogType};

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");
const GRUVBOX_DARK_THEME_SRC: &str = include_str!("themes/gruvbox_dark.toml");

/// Names accepted by [`Theme::by_name`].
pub const THEME_NAMES: [&str; 2] = ["default", "gruvbox"];

// ---------------------------------------------------------------------------
// Raw (serde) types: mirror the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawTypes {
    info: RawStyle,
    success: RawStyle,
    warning: RawStyle,
    error: RawStyle,
    trade: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    connected: RawStyle,
    connecting: RawStyle,
    disconnected: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    highlight: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawImpact {
    gain: RawStyle,
    loss: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawChart {
    profit: RawStyle,
    volume: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawAccounts {
    palette: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    types: RawTypes,
    status: RawStatus,
    borders: RawBorders,
    search: RawSearch,
    impact: RawImpact,
    chart: RawChart,
    accounts: RawAccounts,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Application colour theme. All styles are pre-resolved ratatui [`Style`]
/// values.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,

    pub type_info: Style,
    pub type_success: Style,
    pub type_warning: Style,
    pub type_error: Style,
    pub type_trade: Style,

    pub status_connected: Style,
    pub status_connecting: Style,
    pub status_disconnected: Style,

    pub border_focused: Style,
    pub border_unfocused: Style,

    /// Inline highlight applied to matched search spans.
    pub search_highlight: Style,

    pub impact_gain: Style,
    pub impact_loss: Style,

    pub chart_profit: Style,
    pub chart_volume: Style,

    account_palette: Vec<Color>,
}

impl Theme {
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_default() -> Self {
        Self::from_toml_str("default", DEFAULT_THEME_SRC)
            .expect("embedded default theme must be valid TOML")
    }

    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_gruvbox_dark() -> Self {
        Self::from_toml_str("gruvbox", GRUVBOX_DARK_THEME_SRC)
            .expect("embedded gruvbox dark theme must be valid TOML")
    }

    /// Look up an embedded theme. Accepts the usual spellings of gruvbox.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(Self::load_default()),
            "gruvbox" | "gruvbox_dark" | "gruvbox-dark" => Some(Self::load_gruvbox_dark()),
            _ => None,
        }
    }

    /// Parse a theme from a TOML string. Unknown keys are ignored.
    pub fn from_toml_str(name: &'static str, src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            name,
            type_info: raw.types.info.into_style(),
            type_success: raw.types.success.into_style(),
            type_warning: raw.types.warning.into_style(),
            type_error: raw.types.error.into_style(),
            type_trade: raw.types.trade.into_style(),
            status_connected: raw.status.connected.into_style(),
            status_connecting: raw.status.connecting.into_style(),
            status_disconnected: raw.status.disconnected.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            search_highlight: raw.search.highlight.into_style(),
            impact_gain: raw.impact.gain.into_style(),
            impact_loss: raw.impact.loss.into_style(),
            chart_profit: raw.chart.profit.into_style(),
            chart_volume: raw.chart.volume.into_style(),
            account_palette: raw
                .accounts
                .palette
                .iter()
                .filter_map(|s| parse_color(s))
                .collect(),
        })
    }

    pub fn type_style(&self, kind: LogType) -> Style {
        match kind {
            LogType::Info => self.type_info,
            LogType::Success => self.type_success,
            LogType::Warning => self.type_warning,
            LogType::Error => self.type_error,
            LogType::Trade => self.type_trade,
        }
    }

    pub fn status_style(&self, status: ConnectionState) -> Style {
        match status {
            ConnectionState::Connected => self.status_connected,
            ConnectionState::Connecting => self.status_connecting,
            ConnectionState::Disconnected => self.status_disconnected,
        }
    }

    /// Style for an `amount` string: gain for a leading `+`, loss for `-`.
    pub fn impact_style(&self, amount: &str) -> Style {
        if amount.starts_with('-') {
            self.impact_loss
        } else {
            self.impact_gain
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }

    /// Stable colour for an account id.
    pub fn account_style(&self, account: &str) -> Style {
        if self.account_palette.is_empty() {
            return Style::default();
        }
        let idx = stable_hash(account) % self.account_palette.len();
        Style::default().fg(self.account_palette[idx])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// djb2-style hash, stable across Rust versions and process restarts.
fn stable_hash(s: &str) -> usize {
    s.bytes()
        .fold(5381usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
}

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts named terminal colours (`red`, `dark_gray`, ...), hex `#rrggbb`,
/// and `indexed:N`.
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
