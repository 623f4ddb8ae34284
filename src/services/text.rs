//! Text measurement and wrapping for the built-in PDF fonts.
//!
//! The renderer lays out Helvetica with millimetre coordinates and needs
//! string widths to right-align numbers and wrap descriptions. The width
//! tables below are the standard AFM advance widths (thousandths of an em,
//! ASCII 32..=126) for Helvetica and Helvetica-Bold.

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Fallback advance for characters outside the table.
const DEFAULT_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278,
    584, 584, 584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278,
    500, 667, 556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556,
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333,
    278, 278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333,
    584, 584, 584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278,
    556, 722, 611, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944,
    667, 667, 611, 333, 278, 333, 584, 556, 333, 556, 611, 556, 611, 556,
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn advance(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    let code = c as u32;
    if (32..=126).contains(&code) {
        table[(code - 32) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Width of `text` in points at the given font size.
pub fn text_width_pt(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(advance(c, bold))).sum();
    units as f32 * size / 1000.0
}

/// Width of `text` in millimetres at the given font size.
pub fn text_width_mm(text: &str, size: f32, bold: bool) -> f32 {
    text_width_pt(text, size, bold) / PT_PER_MM
}

/// Greedy word-wrap of `text` into lines no wider than `max_width_mm`.
///
/// Embedded newlines are hard breaks and blank source lines are kept, so
/// multi-paragraph notes keep their shape. A single word wider than the
/// limit is broken mid-word rather than overflowing the column.
pub fn wrap(text: &str, size: f32, bold: bool, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let raw_line = raw_line.trim_end_matches('\r');
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                place_word(word, size, bold, max_width_mm, &mut lines, &mut current);
                continue;
            }

            let candidate = format!("{} {}", current, word);
            if text_width_mm(&candidate, size, bold) <= max_width_mm {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                place_word(word, size, bold, max_width_mm, &mut lines, &mut current);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Start a fresh line with `word`, hard-breaking it if it alone exceeds
/// the limit. Completed fragments go to `lines`; the remainder becomes
/// `current`.
fn place_word(
    word: &str,
    size: f32,
    bold: bool,
    max_width_mm: f32,
    lines: &mut Vec<String>,
    current: &mut String,
) {
    if text_width_mm(word, size, bold) <= max_width_mm {
        *current = word.to_string();
        return;
    }

    let mut fragment = String::new();
    for c in word.chars() {
        let mut candidate = fragment.clone();
        candidate.push(c);
        if !fragment.is_empty() && text_width_mm(&candidate, size, bold) > max_width_mm {
            lines.push(fragment);
            fragment = c.to_string();
        } else {
            fragment = candidate;
        }
    }
    *current = fragment;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_matches_afm_sum() {
        // H(722) e(556) l(222) l(222) o(556) = 2278 units
        let width = text_width_pt("Hello", 10.0, false);
        assert!((width - 22.78).abs() < 0.01);

        // Bold digits are 556 units each
        let width = text_width_pt("100", 10.0, true);
        assert!((width - 16.68).abs() < 0.01);
    }

    #[test]
    fn test_bold_is_wider() {
        assert!(text_width_pt("Invoice", 10.0, true) > text_width_pt("Invoice", 10.0, false));
    }

    #[test]
    fn test_wrap_fits_column() {
        let text = "Replace kitchen faucet and supply lines, haul away old fixture";
        let lines = wrap(text, 10.0, false, 40.0);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 10.0, false) <= 40.0);
        }
        // No words lost
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_wrap_honors_embedded_newlines() {
        let lines = wrap("first\nsecond line", 10.0, false, 100.0);
        assert_eq!(lines, vec!["first".to_string(), "second line".to_string()]);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let lines = wrap("para one\n\npara two", 10.0, false, 100.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "");
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let lines = wrap("Oberweissenbrunnenstrasse", 10.0, false, 20.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 10.0, false) <= 20.0);
        }
        assert_eq!(lines.concat(), "Oberweissenbrunnenstrasse");
    }

    #[test]
    fn test_short_text_single_line() {
        let lines = wrap("Labor", 10.0, false, 100.0);
        assert_eq!(lines, vec!["Labor".to_string()]);
    }
}
