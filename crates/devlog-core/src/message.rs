//! Message template expansion.
//!
//! Three substitution styles are supported, selected by [`FormatStyle`]:
//! printf-like directives (`%s`, `%5.2f`, `%2$d`), indexed placeholders
//! (`{0}`), and literal text. Printf substitution colors each substituted
//! value by the kind of its argument; the other styles color the whole result.

use crate::color::{Color, ColorSupport};
use crate::palette;
use crate::record::{Arg, ArgKind, FormatStyle};

/// Expands message templates into colorized text.
#[derive(Debug, Clone)]
pub struct MessageRenderer {
    support: ColorSupport,
    text_color: Color,
    kind_colors: Vec<(ArgKind, Color)>,
    darken: f32,
}

impl MessageRenderer {
    /// Renderer with the default palette: plain text in the high-contrast text
    /// color, UUIDs and type names highlighted.
    #[must_use]
    pub fn new(support: ColorSupport) -> Self {
        Self {
            support,
            text_color: palette::HI_TEXT,
            kind_colors: vec![
                (ArgKind::Uuid, palette::UUID_ARG),
                (ArgKind::TypeName, palette::TYPE_NAME_ARG),
            ],
            darken: 0.0,
        }
    }

    /// Override the color of one argument kind. Earlier entries win.
    #[must_use]
    pub fn with_kind_color(mut self, kind: ArgKind, color: Color) -> Self {
        self.kind_colors.push((kind, color));
        self
    }

    /// Darken every substituted value by `amount`.
    #[must_use]
    pub fn with_darken(mut self, amount: f32) -> Self {
        self.darken = amount;
        self
    }

    #[must_use]
    pub fn color_support(&self) -> ColorSupport {
        self.support
    }

    /// Color used for a substituted argument.
    #[must_use]
    pub fn color_for(&self, arg: &Arg) -> Color {
        let kind = arg.kind();
        self.kind_colors
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(self.text_color, |(_, color)| *color)
    }

    /// Expand `template` against `args` using `style`.
    ///
    /// Without arguments the template is the message. An unrecognized style
    /// with arguments renders as an empty string.
    #[must_use]
    pub fn render(&self, template: &str, style: FormatStyle, args: Option<&[Arg]>) -> String {
        let Some(args) = args else {
            return self.support.colorize(template, self.text_color);
        };
        match style {
            FormatStyle::Printf => self.printf(template, args),
            FormatStyle::Indexed => self
                .support
                .colorize(&format_indexed(template, args), self.text_color),
            FormatStyle::Literal => self.support.colorize(template, self.text_color),
            FormatStyle::None => String::new(),
        }
    }

    /// Printf expansion with each substituted run colored by argument kind.
    #[must_use]
    pub fn printf(&self, template: &str, args: &[Arg]) -> String {
        let mut out = String::with_capacity(template.len() + 32);
        self.support.end_fg(&mut out);

        let chars: Vec<char> = template.chars().collect();
        let mut next_arg = 0;
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != '%' {
                out.push(chars[i]);
                i += 1;
                continue;
            }

            let Some((directive, end)) = Directive::parse(&chars, i + 1) else {
                out.extend(&chars[i..]);
                break;
            };
            let raw: String = chars[i..end].iter().collect();
            i = end;

            match directive.conversion {
                '%' => out.push('%'),
                'n' => out.push('\n'),
                conv if Directive::CONVERSIONS.contains(conv) => {
                    let index = directive.index.unwrap_or_else(|| {
                        next_arg += 1;
                        next_arg - 1
                    });
                    match args.get(index) {
                        Some(arg) => {
                            let color = self.color_for(arg).darken(self.darken);
                            self.support.start_fg(&mut out, color);
                            out.push_str(&directive.apply(arg));
                            self.support.end_fg(&mut out);
                        }
                        None => out.push_str(&raw),
                    }
                }
                _ => out.push_str(&raw),
            }
        }

        out
    }
}

/// A parsed `%[index$][flags][width][.precision]conversion` directive.
#[derive(Debug, Default, Clone, PartialEq)]
struct Directive {
    index: Option<usize>,
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

impl Directive {
    const CONVERSIONS: &'static str = "sSdixXofecb";

    /// Parse starting just after `%`. Returns the directive and the offset
    /// past its conversion character.
    fn parse(chars: &[char], start: usize) -> Option<(Self, usize)> {
        let mut directive = Self::default();
        let mut j = start;

        let (digits, after) = read_number(chars, j);
        if let Some(n) = digits {
            if chars.get(after) == Some(&'$') && n > 0 {
                directive.index = Some(n - 1);
                j = after + 1;
            }
        }

        while let Some(&c) = chars.get(j) {
            match c {
                '-' => directive.left = true,
                '0' => directive.zero = true,
                '+' => directive.plus = true,
                ' ' => directive.space = true,
                _ => break,
            }
            j += 1;
        }

        let (width, after) = read_number(chars, j);
        directive.width = width;
        j = after;

        if chars.get(j) == Some(&'.') {
            let (precision, after) = read_number(chars, j + 1);
            directive.precision = Some(precision.unwrap_or(0));
            j = after;
        }

        let conversion = *chars.get(j)?;
        directive.conversion = conversion;
        Some((directive, j + 1))
    }

    fn apply(&self, arg: &Arg) -> String {
        let body = match self.conversion {
            's' => self.truncate(arg.to_string()),
            'S' => self.truncate(arg.to_string()).to_uppercase(),
            'd' | 'i' => match arg.as_i128() {
                Some(v) => self.signed(v.to_string()),
                None => arg.to_string(),
            },
            'x' => self.radix(arg, |v| format!("{v:x}")),
            'X' => self.radix(arg, |v| format!("{v:X}")),
            'o' => self.radix(arg, |v| format!("{v:o}")),
            'f' => match arg.as_f64() {
                Some(v) => self.signed(format!("{:.*}", self.precision.unwrap_or(6), v)),
                None => arg.to_string(),
            },
            'e' => match arg.as_f64() {
                Some(v) => self.signed(scientific(v, self.precision.unwrap_or(6))),
                None => arg.to_string(),
            },
            'c' => match arg {
                Arg::Char(c) => c.to_string(),
                other => other
                    .as_i128()
                    .and_then(|v| u32::try_from(v).ok())
                    .and_then(char::from_u32)
                    .map_or_else(|| other.to_string(), String::from),
            },
            'b' => match arg {
                Arg::Bool(v) => v.to_string(),
                _ => "true".to_string(),
            },
            _ => arg.to_string(),
        };
        self.pad(body)
    }

    fn truncate(&self, s: String) -> String {
        match self.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s,
        }
    }

    fn signed(&self, digits: String) -> String {
        if digits.starts_with('-') {
            digits
        } else if self.plus {
            format!("+{digits}")
        } else if self.space {
            format!(" {digits}")
        } else {
            digits
        }
    }

    fn radix(&self, arg: &Arg, fmt: impl Fn(u64) -> String) -> String {
        match arg.as_i128() {
            // negative values print as their 64-bit two's complement
            Some(v) => fmt(v as i64 as u64),
            None => arg.to_string(),
        }
    }

    fn pad(&self, body: String) -> String {
        let Some(width) = self.width else {
            return body;
        };
        let len = body.chars().count();
        if len >= width {
            return body;
        }
        let fill = width - len;
        if self.left {
            format!("{body}{}", " ".repeat(fill))
        } else if self.zero && self.is_numeric() {
            let (sign, digits) = match body.chars().next() {
                Some(c @ ('-' | '+' | ' ')) => (c.to_string(), &body[1..]),
                _ => (String::new(), body.as_str()),
            };
            format!("{sign}{}{digits}", "0".repeat(fill))
        } else {
            format!("{}{body}", " ".repeat(fill))
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self.conversion, 'd' | 'i' | 'x' | 'X' | 'o' | 'f' | 'e')
    }
}

fn read_number(chars: &[char], start: usize) -> (Option<usize>, usize) {
    let mut end = start;
    let mut value: usize = 0;
    while let Some(d) = chars.get(end).and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d as usize);
        end += 1;
    }
    if end == start {
        (None, start)
    } else {
        (Some(value), end)
    }
}

/// `1.500000e+02` style scientific notation.
fn scientific(v: f64, precision: usize) -> String {
    let rendered = format!("{v:.precision$e}");
    match rendered.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => rendered,
    }
}

/// Expand `{n}` placeholders against `args`.
///
/// `''` yields a single quote and text between single quotes is literal. A
/// placeholder may carry a format suffix (`{0,number}`), which is ignored.
/// Placeholders without a matching argument are kept as `{n}`.
#[must_use]
pub fn format_indexed(template: &str, args: &[Arg]) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len() + 16);
    let mut quoted = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
            } else {
                quoted = !quoted;
                i += 1;
            }
            continue;
        }
        if quoted || c != '{' {
            out.push(c);
            i += 1;
            continue;
        }

        let Some(close) = chars[i..].iter().position(|&ch| ch == '}').map(|p| i + p) else {
            out.extend(&chars[i..]);
            break;
        };
        let inner: String = chars[i + 1..close].iter().collect();
        let index_part = inner.split(',').next().unwrap_or_default().trim();
        match index_part.parse::<usize>() {
            Ok(index) => match args.get(index) {
                Some(arg) => out.push_str(&arg.to_string()),
                None => out.push_str(&format!("{{{index}}}")),
            },
            Err(_) => out.extend(&chars[i..=close]),
        }
        i = close + 1;
    }

    out
}
