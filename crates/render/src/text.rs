//! Text helpers for the standard Type1 fonts.

/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

pub const ELLIPSIS: &str = "...";

/// How many characters fit on a line of `width` points at `font_size`.
pub fn chars_per_line(width: f32, font_size: f32) -> usize {
    ((width / (font_size * AVG_GLYPH_WIDTH)).floor() as usize).max(1)
}

/// Greedy word wrap; words longer than a line are split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Keep at most `keep` lines, marking a cut with a trailing ellipsis.
pub fn truncate_lines(mut lines: Vec<String>, keep: usize, max_chars: usize) -> Vec<String> {
    if lines.len() <= keep {
        return lines;
    }
    lines.truncate(keep);
    if let Some(last) = lines.last_mut() {
        let room = max_chars.saturating_sub(ELLIPSIS.len());
        let mut kept: String = last.chars().take(room).collect();
        kept.truncate(kept.trim_end().len());
        kept.push_str(ELLIPSIS);
        *last = kept;
    }
    lines
}

/// Encode text for a WinAnsi font; unmappable characters become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut buf));
        if unmappable {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}
