//! Bitmap glyphs for the scrolling data streams.
//!
//! A tiny 5x7 font covering the characters the streams draw: binary digits,
//! a run of katakana and the usual code punctuation. Each glyph is seven
//! rows; bit 4 of a row is the leftmost column.

/// Columns per glyph.
pub const GLYPH_COLS: u32 = 5;
/// Rows per glyph.
pub const GLYPH_ROWS: u32 = 7;

/// The characters data streams pick from.
pub const DATA_GLYPHS: &str = "01アイウエオカキクケコサシスセソタチツテト{}[]<>/\\=+-*&%$#@!";

/// The data glyph set as a vector, for random picking.
pub fn data_glyphs() -> Vec<char> {
    DATA_GLYPHS.chars().collect()
}

/// Row bitmap for a character, or `None` if the font has no glyph for it.
pub fn bitmap(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'ア' => [0x1F, 0x01, 0x06, 0x04, 0x04, 0x08, 0x10],
        'イ' => [0x01, 0x02, 0x06, 0x0A, 0x12, 0x02, 0x02],
        'ウ' => [0x04, 0x1F, 0x11, 0x01, 0x02, 0x04, 0x08],
        'エ' => [0x00, 0x1F, 0x04, 0x04, 0x04, 0x04, 0x1F],
        'オ' => [0x02, 0x1F, 0x02, 0x06, 0x0A, 0x12, 0x06],
        'カ' => [0x08, 0x1F, 0x09, 0x09, 0x09, 0x11, 0x12],
        'キ' => [0x04, 0x1F, 0x04, 0x1F, 0x04, 0x04, 0x04],
        'ク' => [0x08, 0x0F, 0x11, 0x01, 0x02, 0x04, 0x18],
        'ケ' => [0x08, 0x0F, 0x12, 0x02, 0x02, 0x04, 0x08],
        'コ' => [0x1F, 0x01, 0x01, 0x01, 0x01, 0x01, 0x1F],
        'サ' => [0x0A, 0x1F, 0x0A, 0x0A, 0x02, 0x04, 0x08],
        'シ' => [0x18, 0x00, 0x19, 0x01, 0x02, 0x04, 0x18],
        'ス' => [0x1F, 0x01, 0x02, 0x04, 0x06, 0x09, 0x11],
        'セ' => [0x08, 0x08, 0x1F, 0x09, 0x0A, 0x08, 0x07],
        'ソ' => [0x11, 0x11, 0x01, 0x01, 0x02, 0x04, 0x18],
        'タ' => [0x08, 0x0F, 0x11, 0x15, 0x02, 0x04, 0x18],
        'チ' => [0x03, 0x1C, 0x04, 0x1F, 0x04, 0x04, 0x08],
        'ツ' => [0x15, 0x15, 0x01, 0x01, 0x02, 0x04, 0x18],
        'テ' => [0x0E, 0x00, 0x1F, 0x04, 0x04, 0x08, 0x10],
        'ト' => [0x08, 0x08, 0x0C, 0x0A, 0x08, 0x08, 0x08],
        '{' => [0x06, 0x08, 0x08, 0x10, 0x08, 0x08, 0x06],
        '}' => [0x0C, 0x02, 0x02, 0x01, 0x02, 0x02, 0x0C],
        '[' => [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E],
        ']' => [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E],
        '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
        '>' => [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        '\\' => [0x10, 0x10, 0x08, 0x04, 0x02, 0x01, 0x01],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '*' => [0x00, 0x15, 0x0E, 0x1F, 0x0E, 0x15, 0x00],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '$' => [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '@' => [0x0E, 0x11, 0x17, 0x15, 0x17, 0x10, 0x0F],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        _ => return None,
    };
    Some(rows)
}

/// Iterate the lit `(col, row)` cells of a glyph.
pub fn lit_cells(c: char) -> impl Iterator<Item = (u32, u32)> {
    let rows = bitmap(c).unwrap_or([0; 7]);
    (0..GLYPH_ROWS).flat_map(move |row| {
        let bits = rows[row as usize];
        (0..GLYPH_COLS)
            .filter(move |col| bits & (0x10 >> col) != 0)
            .map(move |col| (col, row))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_data_glyph_has_a_bitmap() {
        for c in DATA_GLYPHS.chars() {
            let rows = bitmap(c).unwrap_or_else(|| panic!("missing glyph {c:?}"));
            assert!(rows.iter().any(|r| *r != 0), "blank glyph {c:?}");
            assert!(rows.iter().all(|r| *r < 0x20), "glyph {c:?} wider than 5 columns");
        }
    }

    #[test]
    fn test_lit_cells() {
        // '-' lights exactly the middle row.
        let cells: Vec<_> = lit_cells('-').collect();
        assert_eq!(cells.len(), 5);
        assert!(cells.iter().all(|&(_, row)| row == 3));
        assert_eq!(lit_cells('?').count(), 0);
    }

    #[test]
    fn test_glyph_set_size() {
        assert_eq!(data_glyphs().len(), 40);
    }
}
