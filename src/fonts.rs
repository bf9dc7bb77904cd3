use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::rc::Rc;
use std::slice::Iter;

use adobe_cmap_parser::{ByteMapping, CIDRange, CodeRange};
use lopdf::{Dictionary, Document, Object};
use tracing::{debug, warn};

use crate::encodings::*;
use crate::utils::*;

pub(crate) type CharCode = u32;

/// Advance used when neither the font nor its descriptor gives one, in glyph units.
const DEFAULT_GLYPH_WIDTH: f32 = 600.;

// FontDescriptor /Flags bit 3.
const FLAG_SYMBOLIC: i64 = 1 << 2;

// Highest CID a composite font can address.
const MAX_CID: i64 = 0xFFFF;

pub(crate) trait PdfFont: Debug {
    /// Horizontal advance of `id` in thousandths of a text space unit.
    fn get_width(&self, id: CharCode) -> f32;
    /// Read the next character code and its byte length.
    fn next_char(&self, iter: &mut Iter<u8>) -> Option<(CharCode, u8)>;
    fn decode_char(&self, char: CharCode) -> String;
    fn get_font_name(&self) -> &str;
}

pub(crate) fn make_font(doc: &Document, font: &Dictionary) -> Rc<dyn PdfFont> {
    let subtype = maybe_get_name_string(doc, font, b"Subtype").unwrap_or_default();
    debug!("MakeFont({})", subtype);
    if subtype == "Type0" {
        Rc::new(PdfCIDFont::new(doc, font))
    } else {
        Rc::new(PdfSimpleFont::new(doc, font))
    }
}

/// Type1, TrueType, MMType1 and Type3 fonts: one byte per character code.
pub(crate) struct PdfSimpleFont {
    base_name: String,
    encoding: Vec<u16>,
    differences: HashMap<CharCode, String>,
    unicode_map: Option<HashMap<CharCode, String>>,
    widths: HashMap<CharCode, f32>,
    missing_width: f32,
}

impl PdfSimpleFont {
    fn new(doc: &Document, font: &Dictionary) -> PdfSimpleFont {
        let base_name = maybe_get_name_string(doc, font, b"BaseFont").unwrap_or_default();
        let subtype = maybe_get_name_string(doc, font, b"Subtype").unwrap_or_default();
        let descriptor: Option<&Dictionary> = maybe_get(doc, font, b"FontDescriptor");

        let symbolic = descriptor
            .and_then(|d| maybe_get::<i64>(doc, d, b"Flags"))
            .map_or(false, |flags| flags & FLAG_SYMBOLIC != 0);

        let mut differences = HashMap::new();
        let encoding = match maybe_get_obj(doc, font, b"Encoding") {
            Some(Object::Name(name)) => base_encoding_table(name).unwrap_or_else(|| {
                warn!(
                    "unsupported encoding {:?} on {}, using default",
                    pdf_to_utf8(name),
                    base_name
                );
                default_table(symbolic)
            }),
            Some(Object::Dictionary(dict)) => {
                let table = maybe_get::<&[u8]>(doc, dict, b"BaseEncoding")
                    .and_then(base_encoding_table)
                    .unwrap_or_else(|| default_table(symbolic));
                if let Some(diffs) = maybe_get::<&Object>(doc, dict, b"Differences") {
                    read_differences(doc, diffs, &mut differences);
                }
                table
            }
            _ => default_table(symbolic),
        };

        // Type3 glyph widths are in glyph space; scale them by FontMatrix into thousandths.
        let width_scale = if subtype == "Type3" {
            maybe_get::<Vec<f32>>(doc, font, b"FontMatrix")
                .and_then(|m| m.first().copied())
                .map_or(1., |a| a * 1000.)
        } else {
            1.
        };

        let mut widths = HashMap::new();
        let first_char = maybe_get::<i64>(doc, font, b"FirstChar").unwrap_or(0);
        if let Some(w) = maybe_get::<Vec<f32>>(doc, font, b"Widths") {
            for (i, width) in w.into_iter().enumerate() {
                // Simple font codes are single bytes.
                match first_char.checked_add(i as i64) {
                    Some(code @ 0..=255) => {
                        widths.insert(code as CharCode, width * width_scale);
                    }
                    _ => break,
                }
            }
        }
        let missing_width = descriptor
            .and_then(|d| maybe_get::<f32>(doc, d, b"MissingWidth"))
            .filter(|w| *w > 0.)
            .unwrap_or(DEFAULT_GLYPH_WIDTH);

        debug!(
            "simple font {} {} widths:{} differences:{}",
            base_name,
            subtype,
            widths.len(),
            differences.len()
        );

        PdfSimpleFont {
            unicode_map: get_unicode_map(doc, font),
            base_name,
            encoding,
            differences,
            widths,
            missing_width,
        }
    }
}

fn read_differences(doc: &Document, diffs: &Object, out: &mut HashMap<CharCode, String>) {
    let Ok(diffs) = diffs.as_array() else {
        warn!("Differences is not an array: {:?}", diffs);
        return;
    };
    let mut code: CharCode = 0;
    for entry in diffs {
        match maybe_deref(doc, entry) {
            &Object::Integer(i) => code = i as CharCode,
            Object::Name(name) => {
                let name = String::from_utf8_lossy(name);
                match glyph_name_to_unicode(&name) {
                    Some(s) => {
                        out.insert(code, s);
                    }
                    None => debug!("unknown glyph name {} for code {}", name, code),
                }
                code += 1;
            }
            other => debug!("unexpected Differences entry {:?}", other),
        }
    }
}

impl PdfFont for PdfSimpleFont {
    fn get_width(&self, id: CharCode) -> f32 {
        self.widths.get(&id).copied().unwrap_or(self.missing_width)
    }

    fn next_char(&self, iter: &mut Iter<u8>) -> Option<(CharCode, u8)> {
        iter.next().map(|x| (*x as CharCode, 1))
    }

    fn decode_char(&self, char: CharCode) -> String {
        if let Some(s) = self.unicode_map.as_ref().and_then(|m| m.get(&char)) {
            return s.clone();
        }
        if let Some(s) = self.differences.get(&char) {
            return s.clone();
        }
        to_utf8(&self.encoding, &[char as u8])
    }

    fn get_font_name(&self) -> &str {
        &self.base_name
    }
}

impl Debug for PdfSimpleFont {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PdfSimpleFont({})", self.base_name)
    }
}

/// Parse a ToUnicode CMap into code → text.
fn get_unicode_map(doc: &Document, font: &Dictionary) -> Option<HashMap<CharCode, String>> {
    match maybe_get_obj(doc, font, b"ToUnicode") {
        Some(Object::Stream(stream)) => {
            let contents = get_contents(stream);
            let cmap = match adobe_cmap_parser::get_unicode_map(&contents) {
                Ok(cmap) => cmap,
                Err(e) => {
                    warn!("unreadable ToUnicode CMap: {:?}", e);
                    return None;
                }
            };
            let mut unicode = HashMap::new();
            for (&k, v) in cmap.iter() {
                if v.len() % 2 != 0 {
                    debug!("odd-length ToUnicode entry for {}: {:02X?}", k, v);
                    continue;
                }
                let be: Vec<u16> = v
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                match String::from_utf16(&be) {
                    Ok(s) => {
                        unicode.insert(k as CharCode, s);
                    }
                    Err(_) => debug!("invalid UTF-16 in ToUnicode entry for {}", k),
                }
            }
            Some(unicode)
        }
        Some(Object::Name(name)) => {
            debug!("ToUnicode names a predefined CMap {:?}", pdf_to_utf8(name));
            None
        }
        None => None,
        Some(other) => {
            warn!("unsupported ToUnicode {:?}", other);
            None
        }
    }
}

fn identity_mapping() -> ByteMapping {
    ByteMapping {
        codespace: vec![CodeRange {
            width: 2,
            start: 0,
            end: 0xffff,
        }],
        cid: vec![CIDRange {
            src_code_lo: 0,
            src_code_hi: 0xffff,
            dst_CID_lo: 0,
        }],
    }
}

/// Type0 font with a CID-keyed descendant.
pub(crate) struct PdfCIDFont {
    base_name: String,
    encoding: ByteMapping,
    to_unicode: Option<HashMap<CharCode, String>>,
    widths: HashMap<CharCode, f32>,
    default_width: f32,
}

impl PdfCIDFont {
    fn new(doc: &Document, font: &Dictionary) -> PdfCIDFont {
        let base_name = maybe_get_name_string(doc, font, b"BaseFont").unwrap_or_default();

        let encoding = match maybe_get_obj(doc, font, b"Encoding") {
            Some(Object::Name(name)) => {
                let name = pdf_to_utf8(name);
                if name != "Identity-H" && name != "Identity-V" {
                    warn!("predefined CMap {} is not supported, reading two-byte codes", name);
                }
                identity_mapping()
            }
            Some(Object::Stream(stream)) => {
                let contents = get_contents(stream);
                adobe_cmap_parser::get_byte_mapping(&contents).unwrap_or_else(|e| {
                    warn!("unreadable encoding CMap for {}: {:?}", base_name, e);
                    identity_mapping()
                })
            }
            other => {
                warn!("missing or unsupported Type0 encoding {:?}", other);
                identity_mapping()
            }
        };

        let ciddict: Option<&Dictionary> = maybe_get::<&Object>(doc, font, b"DescendantFonts")
            .and_then(|d| d.as_array().ok())
            .and_then(|d| d.first())
            .and_then(|d| maybe_deref(doc, d).as_dict().ok());

        let mut widths = HashMap::new();
        let mut default_width = 1000.;
        if let Some(ciddict) = ciddict {
            default_width = maybe_get::<f32>(doc, ciddict, b"DW").unwrap_or(1000.);
            if let Some(w) = maybe_get::<&Object>(doc, ciddict, b"W").and_then(|w| w.as_array().ok())
            {
                read_cid_widths(doc, w, &mut widths);
            }
        } else {
            warn!("Type0 font {} has no descendant font", base_name);
        }

        PdfCIDFont {
            to_unicode: get_unicode_map(doc, font),
            base_name,
            encoding,
            widths,
            default_width,
        }
    }

    fn in_codespace(&self, code: CharCode, width: u32) -> bool {
        self.encoding.codespace.iter().any(|range| {
            range.width as u32 == width
                && code >= range.start as CharCode
                && code <= range.end as CharCode
        })
    }

    fn cid(&self, code: CharCode) -> Option<CharCode> {
        self.encoding
            .cid
            .iter()
            .find(|r| code >= r.src_code_lo as CharCode && code <= r.src_code_hi as CharCode)
            .map(|r| code - r.src_code_lo as CharCode + r.dst_CID_lo as CharCode)
    }
}

/// `W` holds runs of `c [w1 w2 ...]` and `c_first c_last w`.
fn read_cid_widths(doc: &Document, w: &[Object], widths: &mut HashMap<CharCode, f32>) {
    let mut i = 0;
    while i + 1 < w.len() {
        let Some(first) = i64::from_obj(doc, &w[i]).filter(|c| (0..=MAX_CID).contains(c)) else {
            debug!("malformed W entry at {}", i);
            return;
        };
        match maybe_deref(doc, &w[i + 1]) {
            Object::Array(run) => {
                for (j, width) in run.iter().enumerate() {
                    let cid = first + j as i64;
                    if cid > MAX_CID {
                        break;
                    }
                    if let Some(width) = as_num(maybe_deref(doc, width)) {
                        widths.insert(cid as CharCode, width);
                    }
                }
                i += 2;
            }
            last => {
                let (Some(last), Some(width)) =
                    (as_num(last), w.get(i + 2).and_then(|o| as_num(maybe_deref(doc, o))))
                else {
                    debug!("malformed W range at {}", i);
                    return;
                };
                let last = (last as i64).min(MAX_CID);
                if last < first {
                    debug!("empty W range {}..{}", first, last);
                }
                for cid in first..=last {
                    widths.insert(cid as CharCode, width);
                }
                i += 3;
            }
        }
    }
}

impl PdfFont for PdfCIDFont {
    fn get_width(&self, id: CharCode) -> f32 {
        self.cid(id)
            .and_then(|cid| self.widths.get(&cid).copied())
            .unwrap_or(self.default_width)
    }

    fn next_char(&self, iter: &mut Iter<u8>) -> Option<(CharCode, u8)> {
        let mut code = *iter.next()? as CharCode;
        let mut width = 1;
        loop {
            if width == 4 || self.in_codespace(code, width) {
                return Some((code, width as u8));
            }
            let next = *iter.next()?;
            code = (code << 8) | next as CharCode;
            width += 1;
        }
    }

    fn decode_char(&self, char: CharCode) -> String {
        match self.to_unicode.as_ref().and_then(|x| x.get(&char)) {
            Some(s) if !s.is_empty() && !s.contains('\0') => s.clone(),
            _ => {
                debug!("Unknown character {} in {} (no mapping found)", char, self.base_name);
                String::new()
            }
        }
    }

    fn get_font_name(&self) -> &str {
        &self.base_name
    }
}

impl Debug for PdfCIDFont {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PdfCIDFont({})", self.base_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    fn decode_all(font: &dyn PdfFont, bytes: &[u8]) -> String {
        let mut iter = bytes.iter();
        let mut out = String::new();
        while let Some((code, _)) = font.next_char(&mut iter) {
            out.push_str(&font.decode_char(code));
        }
        out
    }

    #[test]
    fn simple_font_with_differences() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Custom",
            "Encoding" => dictionary! {
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => Object::Array(vec![
                    Object::Integer(65),
                    Object::Name(b"eacute".to_vec()),
                    Object::Name(b"f_i".to_vec()),
                ]),
            },
        };
        let font = PdfSimpleFont::new(&doc, &font);
        assert_eq!(decode_all(&font, b"ABCx\x80"), "\u{e9}fiCx\u{20ac}");
        assert_eq!(font.get_width(65), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn simple_font_widths_from_first_char() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "FirstChar" => 32,
            "Widths" => Object::Array(vec![
                Object::Integer(278),
                Object::Integer(278),
                Object::Integer(355),
            ]),
        };
        let font = PdfSimpleFont::new(&doc, &font);
        assert_eq!(font.get_width(32), 278.);
        assert_eq!(font.get_width(34), 355.);
        assert_eq!(font.get_width(35), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn identity_cid_font_uses_to_unicode() {
        let mut doc = Document::with_version("1.5");
        let cmap = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0048>
<0004> <0069>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end
";
        let to_unicode = doc.add_object(Stream::new(dictionary! {}, cmap.to_vec()));
        let descendant = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "Noto",
            "DW" => 500,
            "W" => Object::Array(vec![
                Object::Integer(3),
                Object::Array(vec![Object::Integer(700)]),
            ]),
        });
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "Noto",
            "Encoding" => "Identity-H",
            "DescendantFonts" => Object::Array(vec![Object::Reference(descendant)]),
            "ToUnicode" => to_unicode,
        };
        let font = PdfCIDFont::new(&doc, &font);
        assert_eq!(decode_all(&font, &[0x00, 0x03, 0x00, 0x04]), "Hi");
        assert_eq!(font.get_width(3), 700.);
        assert_eq!(font.get_width(4), 500.);
    }

    #[test]
    fn cid_widths_ranges() {
        let doc = Document::with_version("1.5");
        let w = vec![
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(250),
            Object::Integer(20),
            Object::Array(vec![Object::Integer(1), Object::Integer(2)]),
        ];
        let mut widths = HashMap::new();
        read_cid_widths(&doc, &w, &mut widths);
        assert_eq!(widths.get(&10), Some(&250.));
        assert_eq!(widths.get(&12), Some(&250.));
        assert_eq!(widths.get(&21), Some(&2.));
        assert_eq!(widths.get(&13), None);
    }

    #[test]
    fn cid_width_ranges_stay_in_cid_space() {
        let doc = Document::with_version("1.5");
        let w = vec![
            Object::Integer(0),
            Object::Integer(4_000_000_000),
            Object::Integer(500),
            Object::Integer(40),
            Object::Integer(30),
            Object::Integer(100),
            Object::Integer(0xFFFE),
            Object::Array(vec![
                Object::Integer(1),
                Object::Integer(2),
                Object::Integer(3),
            ]),
            Object::Integer(i64::MAX),
            Object::Array(vec![Object::Integer(1)]),
        ];
        let mut widths = HashMap::new();
        read_cid_widths(&doc, &w, &mut widths);
        assert_eq!(widths.len(), 0x10000);
        assert_eq!(widths.get(&0xFFFF), Some(&2.));
        assert_eq!(widths.get(&0x10000), None);
    }

    #[test]
    fn simple_font_widths_ignore_codes_past_one_byte() {
        let doc = Document::with_version("1.5");
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "FirstChar" => i64::MAX,
            "Widths" => Object::Array(vec![Object::Integer(278), Object::Integer(300)]),
        };
        let font = PdfSimpleFont::new(&doc, &font);
        assert_eq!(font.get_width(0), DEFAULT_GLYPH_WIDTH);
    }
}
