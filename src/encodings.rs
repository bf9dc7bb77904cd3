//! Single-byte base encodings and glyph-name resolution for simple fonts.
//!
//! Tables map a character code to a UTF-16 code unit; `0` marks an undefined code.

use encoding_rs::{Encoding, MACINTOSH, UTF_16BE, WINDOWS_1252};

pub(crate) const PDF_DOC_ENCODING: [u16; 256] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x0004, 0x0005, 0x0006, 0x0007, 0x0008, 0x0009, 0x000a, 0x000b,
    0x000c, 0x000d, 0x000e, 0x000f, 0x0010, 0x0011, 0x0012, 0x0013, 0x0014, 0x0015, 0x0016, 0x0017,
    0x02d8, 0x02c7, 0x02c6, 0x02d9, 0x02dd, 0x02db, 0x02da, 0x02dc, 0x0020, 0x0021, 0x0022, 0x0023,
    0x0024, 0x0025, 0x0026, 0x0027, 0x0028, 0x0029, 0x002a, 0x002b, 0x002c, 0x002d, 0x002e, 0x002f,
    0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037, 0x0038, 0x0039, 0x003a, 0x003b,
    0x003c, 0x003d, 0x003e, 0x003f, 0x0040, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047,
    0x0048, 0x0049, 0x004a, 0x004b, 0x004c, 0x004d, 0x004e, 0x004f, 0x0050, 0x0051, 0x0052, 0x0053,
    0x0054, 0x0055, 0x0056, 0x0057, 0x0058, 0x0059, 0x005a, 0x005b, 0x005c, 0x005d, 0x005e, 0x005f,
    0x0060, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067, 0x0068, 0x0069, 0x006a, 0x006b,
    0x006c, 0x006d, 0x006e, 0x006f, 0x0070, 0x0071, 0x0072, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077,
    0x0078, 0x0079, 0x007a, 0x007b, 0x007c, 0x007d, 0x007e, 0x0000, 0x2022, 0x2020, 0x2021, 0x2026,
    0x2014, 0x2013, 0x0192, 0x2044, 0x2039, 0x203a, 0x2212, 0x2030, 0x201e, 0x201c, 0x201d, 0x2018,
    0x2019, 0x201a, 0x2122, 0xfb01, 0xfb02, 0x0141, 0x0152, 0x0160, 0x0178, 0x017d, 0x0131, 0x0142,
    0x0153, 0x0161, 0x017e, 0x0000, 0x20ac, 0x00a1, 0x00a2, 0x00a3, 0x00a4, 0x00a5, 0x00a6, 0x00a7,
    0x00a8, 0x00a9, 0x00aa, 0x00ab, 0x00ac, 0x0000, 0x00ae, 0x00af, 0x00b0, 0x00b1, 0x00b2, 0x00b3,
    0x00b4, 0x00b5, 0x00b6, 0x00b7, 0x00b8, 0x00b9, 0x00ba, 0x00bb, 0x00bc, 0x00bd, 0x00be, 0x00bf,
    0x00c0, 0x00c1, 0x00c2, 0x00c3, 0x00c4, 0x00c5, 0x00c6, 0x00c7, 0x00c8, 0x00c9, 0x00ca, 0x00cb,
    0x00cc, 0x00cd, 0x00ce, 0x00cf, 0x00d0, 0x00d1, 0x00d2, 0x00d3, 0x00d4, 0x00d5, 0x00d6, 0x00d7,
    0x00d8, 0x00d9, 0x00da, 0x00db, 0x00dc, 0x00dd, 0x00de, 0x00df, 0x00e0, 0x00e1, 0x00e2, 0x00e3,
    0x00e4, 0x00e5, 0x00e6, 0x00e7, 0x00e8, 0x00e9, 0x00ea, 0x00eb, 0x00ec, 0x00ed, 0x00ee, 0x00ef,
    0x00f0, 0x00f1, 0x00f2, 0x00f3, 0x00f4, 0x00f5, 0x00f6, 0x00f7, 0x00f8, 0x00f9, 0x00fa, 0x00fb,
    0x00fc, 0x00fd, 0x00fe, 0x00ff,
];

// StandardEncoding entries that differ from printable ASCII.
const STANDARD_ENCODING_OVERRIDES: &[(u8, u16)] = &[
    (0x27, 0x2019),
    (0x60, 0x2018),
    (0xa1, 0x00a1),
    (0xa2, 0x00a2),
    (0xa3, 0x00a3),
    (0xa4, 0x2044),
    (0xa5, 0x00a5),
    (0xa6, 0x0192),
    (0xa7, 0x00a7),
    (0xa8, 0x00a4),
    (0xa9, 0x0027),
    (0xaa, 0x201c),
    (0xab, 0x00ab),
    (0xac, 0x2039),
    (0xad, 0x203a),
    (0xae, 0xfb01),
    (0xaf, 0xfb02),
    (0xb1, 0x2013),
    (0xb2, 0x2020),
    (0xb3, 0x2021),
    (0xb4, 0x00b7),
    (0xb6, 0x00b6),
    (0xb7, 0x2022),
    (0xb8, 0x201a),
    (0xb9, 0x201e),
    (0xba, 0x201d),
    (0xbb, 0x00bb),
    (0xbc, 0x2026),
    (0xbd, 0x2030),
    (0xbf, 0x00bf),
    (0xc1, 0x0060),
    (0xc2, 0x00b4),
    (0xc3, 0x02c6),
    (0xc4, 0x02dc),
    (0xc5, 0x00af),
    (0xc6, 0x02d8),
    (0xc7, 0x02d9),
    (0xc8, 0x00a8),
    (0xca, 0x02da),
    (0xcb, 0x00b8),
    (0xcd, 0x02dd),
    (0xce, 0x02db),
    (0xcf, 0x02c7),
    (0xd0, 0x2014),
    (0xe1, 0x00c6),
    (0xe3, 0x00aa),
    (0xe8, 0x0141),
    (0xe9, 0x00d8),
    (0xea, 0x0152),
    (0xeb, 0x00ba),
    (0xf1, 0x00e6),
    (0xf5, 0x0131),
    (0xf8, 0x0142),
    (0xf9, 0x00f8),
    (0xfa, 0x0153),
    (0xfb, 0x00df),
];

/// Glyph names outside the single-letter and `uniXXXX` forms.
const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("nbspace", '\u{a0}'),
    ("exclam", '!'),
    ("quotedbl", '"'),
    ("numbersign", '#'),
    ("dollar", '$'),
    ("percent", '%'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("quoteright", '\u{2019}'),
    ("quoteleft", '\u{2018}'),
    ("parenleft", '('),
    ("parenright", ')'),
    ("asterisk", '*'),
    ("plus", '+'),
    ("comma", ','),
    ("hyphen", '-'),
    ("period", '.'),
    ("slash", '/'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("colon", ':'),
    ("semicolon", ';'),
    ("less", '<'),
    ("equal", '='),
    ("greater", '>'),
    ("question", '?'),
    ("at", '@'),
    ("bracketleft", '['),
    ("backslash", '\\'),
    ("bracketright", ']'),
    ("asciicircum", '^'),
    ("underscore", '_'),
    ("grave", '`'),
    ("braceleft", '{'),
    ("bar", '|'),
    ("braceright", '}'),
    ("asciitilde", '~'),
    ("bullet", '\u{2022}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("quotedblleft", '\u{201c}'),
    ("quotedblright", '\u{201d}'),
    ("quotesinglbase", '\u{201a}'),
    ("quotedblbase", '\u{201e}'),
    ("guillemotleft", '\u{ab}'),
    ("guillemotright", '\u{bb}'),
    ("ellipsis", '\u{2026}'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("trademark", '\u{2122}'),
    ("copyright", '\u{a9}'),
    ("registered", '\u{ae}'),
    ("degree", '\u{b0}'),
    ("section", '\u{a7}'),
    ("paragraph", '\u{b6}'),
    ("cent", '\u{a2}'),
    ("sterling", '\u{a3}'),
    ("yen", '\u{a5}'),
    ("Euro", '\u{20ac}'),
    ("minus", '\u{2212}'),
    ("multiply", '\u{d7}'),
    ("divide", '\u{f7}'),
    ("plusminus", '\u{b1}'),
    ("periodcentered", '\u{b7}'),
    ("fi", '\u{fb01}'),
    ("fl", '\u{fb02}'),
    ("ff", '\u{fb00}'),
    ("ffi", '\u{fb03}'),
    ("ffl", '\u{fb04}'),
    ("Aacute", '\u{c1}'),
    ("Agrave", '\u{c0}'),
    ("Adieresis", '\u{c4}'),
    ("Ccedilla", '\u{c7}'),
    ("Eacute", '\u{c9}'),
    ("Egrave", '\u{c8}'),
    ("Ntilde", '\u{d1}'),
    ("Oacute", '\u{d3}'),
    ("Odieresis", '\u{d6}'),
    ("Uacute", '\u{da}'),
    ("Udieresis", '\u{dc}'),
    ("aacute", '\u{e1}'),
    ("agrave", '\u{e0}'),
    ("acircumflex", '\u{e2}'),
    ("adieresis", '\u{e4}'),
    ("ccedilla", '\u{e7}'),
    ("eacute", '\u{e9}'),
    ("egrave", '\u{e8}'),
    ("ecircumflex", '\u{ea}'),
    ("edieresis", '\u{eb}'),
    ("iacute", '\u{ed}'),
    ("idieresis", '\u{ef}'),
    ("ntilde", '\u{f1}'),
    ("oacute", '\u{f3}'),
    ("ocircumflex", '\u{f4}'),
    ("odieresis", '\u{f6}'),
    ("uacute", '\u{fa}'),
    ("udieresis", '\u{fc}'),
    ("Acircumflex", '\u{c2}'),
    ("Atilde", '\u{c3}'),
    ("Aring", '\u{c5}'),
    ("AE", '\u{c6}'),
    ("Ecircumflex", '\u{ca}'),
    ("Edieresis", '\u{cb}'),
    ("Igrave", '\u{cc}'),
    ("Iacute", '\u{cd}'),
    ("Icircumflex", '\u{ce}'),
    ("Idieresis", '\u{cf}'),
    ("Eth", '\u{d0}'),
    ("Ograve", '\u{d2}'),
    ("Ocircumflex", '\u{d4}'),
    ("Otilde", '\u{d5}'),
    ("Oslash", '\u{d8}'),
    ("Ugrave", '\u{d9}'),
    ("Ucircumflex", '\u{db}'),
    ("Yacute", '\u{dd}'),
    ("Thorn", '\u{de}'),
    ("atilde", '\u{e3}'),
    ("aring", '\u{e5}'),
    ("ae", '\u{e6}'),
    ("igrave", '\u{ec}'),
    ("icircumflex", '\u{ee}'),
    ("eth", '\u{f0}'),
    ("ograve", '\u{f2}'),
    ("otilde", '\u{f5}'),
    ("oslash", '\u{f8}'),
    ("ugrave", '\u{f9}'),
    ("ucircumflex", '\u{fb}'),
    ("yacute", '\u{fd}'),
    ("thorn", '\u{fe}'),
    ("ydieresis", '\u{ff}'),
    ("Ydieresis", '\u{178}'),
    ("OE", '\u{152}'),
    ("oe", '\u{153}'),
    ("Scaron", '\u{160}'),
    ("scaron", '\u{161}'),
    ("Zcaron", '\u{17d}'),
    ("zcaron", '\u{17e}'),
    ("Lslash", '\u{141}'),
    ("lslash", '\u{142}'),
    ("dotlessi", '\u{131}'),
    ("exclamdown", '\u{a1}'),
    ("questiondown", '\u{bf}'),
    ("currency", '\u{a4}'),
    ("brokenbar", '\u{a6}'),
    ("dieresis", '\u{a8}'),
    ("ordfeminine", '\u{aa}'),
    ("ordmasculine", '\u{ba}'),
    ("logicalnot", '\u{ac}'),
    ("macron", '\u{af}'),
    ("acute", '\u{b4}'),
    ("mu", '\u{b5}'),
    ("cedilla", '\u{b8}'),
    ("onesuperior", '\u{b9}'),
    ("twosuperior", '\u{b2}'),
    ("threesuperior", '\u{b3}'),
    ("onequarter", '\u{bc}'),
    ("onehalf", '\u{bd}'),
    ("threequarters", '\u{be}'),
    ("circumflex", '\u{2c6}'),
    ("tilde", '\u{2dc}'),
    ("florin", '\u{192}'),
    ("perthousand", '\u{2030}'),
    ("guilsinglleft", '\u{2039}'),
    ("guilsinglright", '\u{203a}'),
    ("fraction", '\u{2044}'),
    ("germandbls", '\u{df}'),
];

/// Decode `s` through `encoding`, honouring a UTF-16BE byte order mark.
pub(crate) fn to_utf8(encoding: &[u16], s: &[u8]) -> String {
    if s.len() > 2 && s[0] == 0xfe && s[1] == 0xff {
        return UTF_16BE.decode_without_bom_handling(&s[2..]).0.into_owned();
    }
    let r: Vec<u8> = s
        .iter()
        .filter_map(|&x| encoding.get(x as usize).copied())
        .filter(|&k| k != 0)
        .flat_map(|k| k.to_be_bytes())
        .collect();
    UTF_16BE.decode_without_bom_handling(&r).0.into_owned()
}

fn table_from_encoding(encoding: &'static Encoding) -> Vec<u16> {
    (0..=255u8)
        .map(|b| {
            let byte = [b];
            let (decoded, _) = encoding.decode_without_bom_handling(&byte);
            let mut units = decoded.encode_utf16();
            match (units.next(), units.next()) {
                (Some(unit), None) if unit != 0xfffd => unit,
                _ => 0,
            }
        })
        .collect()
}

fn standard_table() -> Vec<u16> {
    let mut table: Vec<u16> = (0..=255u16)
        .map(|c| if (0x20..0x7f).contains(&c) { c } else { 0 })
        .collect();
    for &(code, unit) in STANDARD_ENCODING_OVERRIDES {
        table[code as usize] = unit;
    }
    table
}

/// Unicode table for a named base encoding.
pub(crate) fn base_encoding_table(name: &[u8]) -> Option<Vec<u16>> {
    match name {
        b"WinAnsiEncoding" => Some(table_from_encoding(WINDOWS_1252)),
        b"MacRomanEncoding" => Some(table_from_encoding(MACINTOSH)),
        b"StandardEncoding" => Some(standard_table()),
        b"PDFDocEncoding" => Some(PDF_DOC_ENCODING.to_vec()),
        _ => None,
    }
}

/// Table used when a simple font names no encoding.
pub(crate) fn default_table(symbolic: bool) -> Vec<u16> {
    if symbolic {
        PDF_DOC_ENCODING.to_vec()
    } else {
        standard_table()
    }
}

fn hex_scalar(hex: &str) -> Option<char> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

fn component_to_unicode(name: &str) -> Option<String> {
    if let Some(&(_, c)) = GLYPH_NAMES.iter().find(|(n, _)| *n == name) {
        return Some(c.to_string());
    }
    if let Some(hex) = name.strip_prefix("uni") {
        if !hex.is_empty() && hex.len() % 4 == 0 {
            return hex
                .as_bytes()
                .chunks(4)
                .map(|chunk| std::str::from_utf8(chunk).ok().and_then(hex_scalar))
                .collect();
        }
    }
    if let Some(hex) = name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) {
            return hex_scalar(hex).map(String::from);
        }
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_string()),
        _ => None,
    }
}

/// Resolve a glyph name to text: `.suffix` variants are stripped and `_`
/// ligature names map component by component.
pub(crate) fn glyph_name_to_unicode(name: &str) -> Option<String> {
    let base = name.split('.').next().unwrap_or(name);
    if base.is_empty() {
        return None;
    }
    base.split('_').map(component_to_unicode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_covers_cp1252_specials() {
        let table = base_encoding_table(b"WinAnsiEncoding").unwrap();
        assert_eq!(table[0x41], 'A' as u16);
        assert_eq!(table[0x80], 0x20ac);
        assert_eq!(table[0x93], 0x201c);
        assert_eq!(table[0xe9], 0x00e9);
    }

    #[test]
    fn mac_roman_upper_half() {
        let table = base_encoding_table(b"MacRomanEncoding").unwrap();
        assert_eq!(table[0x8e], 0x00e9);
        assert_eq!(table[0xd2], 0x201c);
    }

    #[test]
    fn standard_encoding_quotes() {
        let table = base_encoding_table(b"StandardEncoding").unwrap();
        assert_eq!(to_utf8(&table, b"it's"), "it\u{2019}s");
        assert_eq!(table[0x80], 0);
    }

    #[test]
    fn unknown_encoding_name() {
        assert!(base_encoding_table(b"Identity-H").is_none());
    }

    #[test]
    fn to_utf8_handles_bom_and_undefined_codes() {
        assert_eq!(to_utf8(&PDF_DOC_ENCODING, b"\xfe\xff\x00H\x00i"), "Hi");
        assert_eq!(to_utf8(&PDF_DOC_ENCODING, b"a\x7fb"), "ab");
        assert_eq!(to_utf8(&PDF_DOC_ENCODING, b"\x84"), "\u{2014}");
    }

    #[test]
    fn glyph_names() {
        assert_eq!(glyph_name_to_unicode("A").as_deref(), Some("A"));
        assert_eq!(glyph_name_to_unicode("eacute").as_deref(), Some("\u{e9}"));
        assert_eq!(glyph_name_to_unicode("uni00410042").as_deref(), Some("AB"));
        assert_eq!(glyph_name_to_unicode("u1F600").as_deref(), Some("\u{1f600}"));
        assert_eq!(glyph_name_to_unicode("f_i").as_deref(), Some("fi"));
        assert_eq!(glyph_name_to_unicode("a.sc").as_deref(), Some("a"));
        assert_eq!(glyph_name_to_unicode("g123"), None);
        assert_eq!(glyph_name_to_unicode(".notdef"), None);
    }

    #[test]
    fn non_ascii_uni_names_are_unknown() {
        let name = String::from_utf8_lossy(b"uniaaa\xffaa");
        assert_eq!(glyph_name_to_unicode(&name), None);
        assert_eq!(glyph_name_to_unicode("uni00\u{e9}1"), None);
        assert_eq!(glyph_name_to_unicode("u\u{e9}41"), None);
    }

    #[test]
    fn latin_glyph_names() {
        assert_eq!(glyph_name_to_unicode("Aring").as_deref(), Some("\u{c5}"));
        assert_eq!(glyph_name_to_unicode("scaron").as_deref(), Some("\u{161}"));
        assert_eq!(glyph_name_to_unicode("oslash").as_deref(), Some("\u{f8}"));
    }
}
