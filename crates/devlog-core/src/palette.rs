//! Named colors and severity interpolation.

use crate::color::Color;
use crate::level::Level;

pub const CTX_PRIMARY: Color = Color::of(0x00, 0xaa, 0xff);
pub const CTX_SECONDARY: Color = Color::of(0x00, 0x91, 0xd9);
pub const CTX_TERTIARY: Color = Color::of(0x00, 0x7b, 0xb8);

pub const HTTP_CTX_IMPORTANT: Color = Color::of(0xff, 0x99, 0x22);

pub const EXC_PRIMARY: Color = Color::of(0xff, 0x42, 0x42);
pub const EXC_SECONDARY: Color = Color::of(0xff, 0x62, 0x62);
pub const EXC_TERTIARY: Color = Color::of(0xff, 0x82, 0x82);
pub const EXC_QUATERNARY: Color = Color::of(0xff, 0xa2, 0xa2);
pub const EXC_MESSAGE: Color = Color::of(0xaa, 0xa0, 0xa0);

pub const DELIM: Color = Color::of(0xaa, 0xaa, 0xaa);
pub const HI_TEXT: Color = Color::of(0xdd, 0xdd, 0xdd);
pub const LO_TEXT: Color = Color::of(0x88, 0x88, 0x88);

pub const UUID_ARG: Color = Color::of(0xdd, 0xff, 0xdd);
pub const TYPE_NAME_ARG: Color = Color::of(0xff, 0xff, 0xdd);

const BASE: i32 = 66;
const SPAN: i32 = 189;

/// Color for a severity rank.
///
/// The rank is clamped to `[LOWEST, HIGHEST]` and shifted onto `0..=600`.
/// Blue rises over the lower half, red rises over the upper half, and
/// green peaks in the middle.
#[must_use]
pub fn rank_color(rank: i32) -> Color {
    let lo = Level::LOWEST.rank();
    let hi = Level::HIGHEST.rank();
    let v = rank.clamp(lo, hi) - lo;
    let mid = (hi - lo) / 2;

    let r = if v < mid { 0 } else { (v - mid) * SPAN / mid };
    let g = ((mid - (v - mid).abs()) * SPAN) / mid;
    let b = if v > mid { 0 } else { v * SPAN / mid };

    Color::of((r + BASE) as u8, (g + BASE) as u8, (b + BASE) as u8)
}

#[must_use]
pub fn level_color(level: Level) -> Color {
    rank_color(level.rank())
}
