//! Text layout for fixed-geometry character displays.
//!
//! Pure functions over bounded strings; the driver streams their output to
//! the controller byte for byte. Content is expected to be ASCII — the
//! HD44780 character ROM is 8-bit and multi-byte characters would not
//! render anyway.

use heapless::{String, Vec};

/// Widest geometry the layout routines support.
pub const MAX_COLS: usize = 20;
pub const MAX_ROWS: usize = 4;

/// Horizontal alignment for a full-line write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Centre,
}

/// Truncate or pad `text` to exactly `cols` characters.
///
/// Padding is decided one column at a time: `Left` grows on the right,
/// `Right` on the left, and `Centre` alternates by the parity of the
/// current length — an even-length line gains its next space on the left.
/// The alternation means centred text of even length ends up with one more
/// space on the left whenever the padding cannot split evenly.
#[must_use]
pub fn pad_line(text: &str, cols: usize, align: TextAlign) -> String<MAX_COLS> {
    let cols = cols.min(MAX_COLS);
    let mut out: String<MAX_COLS> = String::new();
    let len = text.chars().count();

    if len >= cols {
        for c in text.chars().take(cols) {
            let _ = out.push(c);
        }
        return out;
    }

    let mut left = 0;
    let mut right = 0;
    let mut current = len;
    while current < cols {
        match align {
            TextAlign::Left => right += 1,
            TextAlign::Right => left += 1,
            TextAlign::Centre => {
                if current % 2 == 0 {
                    left += 1;
                } else {
                    right += 1;
                }
            }
        }
        current += 1;
    }

    for _ in 0..left {
        let _ = out.push(' ');
    }
    let _ = out.push_str(text);
    for _ in 0..right {
        let _ = out.push(' ');
    }
    out
}

/// Break `text` into up to `rows` segments of at most `cols` characters.
///
/// A full segment breaks at its last space; a full segment containing no
/// space is hard-cut mid-word. Unused trailing rows come back empty so the
/// caller can blank them.
#[must_use]
pub fn make_text_block(text: &str, cols: usize, rows: usize) -> Vec<String<MAX_COLS>, MAX_ROWS> {
    let cols = cols.min(MAX_COLS);
    let rows = rows.min(MAX_ROWS);
    let bytes = text.as_bytes();

    let mut block: Vec<String<MAX_COLS>, MAX_ROWS> = Vec::new();
    for _ in 0..rows {
        let _ = block.push(String::new());
    }

    let mut start = 0;
    for row in block.iter_mut() {
        let seg_len = cols.min(bytes.len() - start);
        let part = &bytes[start..start + seg_len];

        // A full row breaks at the last space it contains; a partial row
        // (end of text) is taken whole.
        let mut split = part.len();
        if part.len() >= cols {
            for (i, &b) in part.iter().enumerate() {
                if b == b' ' {
                    split = i;
                }
            }
        }

        for &b in &part[..split] {
            let _ = row.push(b as char);
        }

        start += split + 1;
        if start >= bytes.len() {
            break;
        }
    }

    block
}
