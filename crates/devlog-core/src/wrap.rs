//! Word wrapping that treats ANSI escape sequences as zero-width.
//!
//! The wrapper walks the text in words. A word starts at a break character
//! (space, `,`, `.`, `;`, `|` or newline) and runs up to the next one, so a
//! delimiter travels with the word that follows it. The logical column only
//! counts visible characters; CSI sequences (`ESC [ params final`) are skipped
//! atomically.

const ESC: char = '\u{1b}';
const CSI: char = '\u{9b}';

fn is_break(ch: char) -> bool {
    matches!(ch, ' ' | ',' | '.' | ';' | '|' | '\n')
}

fn is_escape_param(ch: char) -> bool {
    ('0'..='?').contains(&ch)
}

fn starts_escape(chars: &[char], offset: usize) -> bool {
    matches!(chars.get(offset), Some(&ESC | &CSI)) && chars.get(offset + 1) == Some(&'[')
}

/// Scan from `offset` to the next break character.
///
/// Returns the offset of that break (or the end of input) and the logical
/// column after counting every visible character scanned, including the break.
#[must_use]
pub fn advance(chars: &[char], mut offset: usize, mut column: usize) -> (usize, usize) {
    while offset < chars.len() {
        let ch = chars[offset];
        if is_break(ch) {
            return (offset, column + 1);
        }
        if starts_escape(chars, offset) {
            offset += 2;
            while offset < chars.len() && is_escape_param(chars[offset]) {
                offset += 1;
            }
            // final byte
            offset += 1;
            continue;
        }
        offset += 1;
        column += 1;
    }
    (chars.len(), column)
}

/// Wrap `text` at `width` logical columns, starting continuation lines with
/// `indent`.
///
/// Explicit newlines are kept and followed by `indent`. A word wider than the
/// remaining room moves whole to the next line; it is never split. The first
/// word always stays on the first line.
#[must_use]
pub fn wrap(text: &str, width: usize, indent: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let indent_len = indent.chars().count();
    let mut out = String::with_capacity(text.len() + 32);

    let mut column = 0;
    let mut offset = 0;
    let mut first = true;

    loop {
        let mut word_start = offset;
        let word_column = column;
        let scan_from = if first { 0 } else { offset + 1 };
        first = false;
        (offset, column) = advance(&chars, scan_from, column);

        // Text starting with a break: that break begins the first real word.
        if offset == word_start {
            continue;
        }

        if chars[word_start] == '\n' {
            // A trailing newline, possibly followed by escapes, ends the text.
            if offset >= len && column == word_column {
                out.extend(&chars[word_start + 1..]);
                break;
            }
            out.push('\n');
            out.push_str(indent);
            word_start += 1;
            // The newline itself was counted by the previous word.
            column = indent_len + (column - word_column);
            out.extend(&chars[word_start..offset]);
        } else if column >= width && word_column > 0 {
            // Drop a dangling space, or keep a delimiter on the current line
            // when it still fits.
            if chars[word_start] == ' ' {
                word_start += 1;
            } else if word_column < width && is_break(chars[word_start]) {
                out.push(chars[word_start]);
                word_start += 1;
            }

            out.push('\n');
            out.push_str(indent);
            out.extend(&chars[word_start..offset]);

            let overage = column - word_column;
            column = indent_len + overage;

            if overage == 1 {
                while offset < len && chars[offset] == ' ' {
                    offset += 1;
                }
            }
        } else {
            out.extend(&chars[word_start..offset]);
        }

        if offset >= len {
            break;
        }
    }

    out
}

/// Visible width of `text`, ignoring escape sequences.
#[must_use]
pub fn visible_width(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut offset = 0;
    let mut column = 0;
    while offset < chars.len() {
        if starts_escape(&chars, offset) {
            offset += 2;
            while offset < chars.len() && is_escape_param(chars[offset]) {
                offset += 1;
            }
            offset += 1;
        } else {
            offset += 1;
            column += 1;
        }
    }
    column
}
