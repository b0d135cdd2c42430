//! RGB colors and ANSI SGR sequence generation.
//!
//! Colors are plain value types. Escape sequences are produced either as
//! 24-bit direct color (`ESC[38;2;r;g;bm`) or as an index into the 256-color
//! cube (`ESC[38;5;nm`), depending on [`ColorSupport`].

use std::fmt;
use std::sync::OnceLock;

const ESC: char = '\u{1b}';

const FG_MODE: u8 = 38;
const BG_MODE: u8 = 48;
const FG_RESET: u8 = 39;
const BG_RESET: u8 = 49;

/// An immutable RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::of(0, 0, 0);

    #[must_use]
    pub const fn of(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Darken by `amount` in `[0, 1]`; `0` is identity, `1` is black.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        self.multiply(1.0 - amount)
    }

    /// Scale every channel by `amount`, clamping to `[0, 255]`.
    #[must_use]
    pub fn multiply(self, amount: f32) -> Self {
        Self {
            r: scale_channel(self.r, amount),
            g: scale_channel(self.g, amount),
            b: scale_channel(self.b, amount),
        }
    }

    /// Index into the xterm 6x6x6 color cube.
    #[must_use]
    pub fn cube_index(self) -> u8 {
        let q = |c: u8| (5 * u16::from(c)) / 255;
        (16 + 36 * q(self.r) + 6 * q(self.g) + q(self.b)) as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn scale_channel(channel: u8, amount: f32) -> u8 {
    (f32::from(channel) * amount).round().clamp(0.0, 255.0) as u8
}

/// Terminal color capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    /// 24-bit direct RGB.
    TrueColor,
    /// 256-color palette, RGB quantized to the color cube.
    #[default]
    Ansi256,
}

static DETECTED: OnceLock<ColorSupport> = OnceLock::new();

impl ColorSupport {
    /// Capability read from `COLORTERM`, evaluated once per process.
    #[must_use]
    pub fn detect() -> Self {
        *DETECTED.get_or_init(|| Self::from_colorterm(std::env::var("COLORTERM").ok().as_deref()))
    }

    /// Interpret a `COLORTERM` value.
    #[must_use]
    pub fn from_colorterm(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.contains("truecolor") || v.contains("24bit") => Self::TrueColor,
            _ => Self::Ansi256,
        }
    }

    #[must_use]
    pub fn is_true_color(self) -> bool {
        matches!(self, Self::TrueColor)
    }

    fn push_start(self, out: &mut String, mode: u8, color: Color) {
        match self {
            Self::TrueColor => {
                out.push_str(&format!(
                    "{ESC}[{mode};2;{};{};{}m",
                    color.r, color.g, color.b
                ));
            }
            Self::Ansi256 => {
                out.push_str(&format!("{ESC}[{mode};5;{}m", color.cube_index()));
            }
        }
    }

    /// Append a foreground color start sequence.
    pub fn start_fg(self, out: &mut String, color: Color) {
        self.push_start(out, FG_MODE, color);
    }

    /// Append a background color start sequence.
    pub fn start_bg(self, out: &mut String, color: Color) {
        self.push_start(out, BG_MODE, color);
    }

    /// Append the default-foreground sequence.
    pub fn end_fg(self, out: &mut String) {
        out.push_str(&format!("{ESC}[{FG_RESET}m"));
    }

    /// Append the default-background sequence.
    pub fn end_bg(self, out: &mut String) {
        out.push_str(&format!("{ESC}[{BG_RESET}m"));
    }

    /// Wrap `text` in a foreground color.
    #[must_use]
    pub fn colorize(self, text: &str, fg: Color) -> String {
        let mut out = String::with_capacity(text.len() + 24);
        self.start_fg(&mut out, fg);
        out.push_str(text);
        self.end_fg(&mut out);
        out
    }

    /// Wrap `text` in a foreground and background color.
    #[must_use]
    pub fn colorize_on(self, text: &str, fg: Color, bg: Color) -> String {
        let mut out = String::with_capacity(text.len() + 48);
        self.start_fg(&mut out, fg);
        self.start_bg(&mut out, bg);
        out.push_str(text);
        self.end_bg(&mut out);
        self.end_fg(&mut out);
        out
    }
}

/// Wrap `text` in bold, followed by a full attribute reset.
#[must_use]
pub fn bold(text: &str) -> String {
    format!("{ESC}[1m{text}{ESC}[0m")
}
