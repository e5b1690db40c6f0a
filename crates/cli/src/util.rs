use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use rowdeck_engine::row::{Row, Schema};

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, appending ".."
/// when anything was cut. Walks chars so CJK/emoji alignment stays correct.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        let mut out = String::new();
        let mut used = 0;
        for ch in s.chars() {
            let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + cw > width {
                break;
            }
            used += cw;
            out.push(ch);
        }
        return out;
    }

    let budget = width - 2;
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Column widths from header names plus a bounded scan of the data rows,
/// clamped to [3, 40] display columns.
pub(crate) fn column_widths(schema: &Schema, rows: &[Row], scan_rows: usize) -> Vec<usize> {
    let scan = &rows[..scan_rows.min(rows.len())];
    schema
        .names()
        .map(|name| {
            let header_w = display_width(name);
            let max_cell = scan
                .iter()
                .map(|row| display_width(row.get(name)))
                .max()
                .unwrap_or(0);
            header_w.max(max_cell).clamp(3, 40)
        })
        .collect()
}

/// Width of the row-number gutter for ids up to `max_id`.
pub(crate) fn gutter_width(max_id: u64) -> usize {
    let mut digits = 1;
    let mut n = max_id;
    while n >= 10 {
        digits += 1;
        n /= 10;
    }
    digits.max(3) + 1
}
