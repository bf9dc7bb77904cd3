use lopdf::{Dictionary, Document, Object, Stream};

use crate::encodings::{PDF_DOC_ENCODING, to_utf8};

/// Decode a PDF text string or name: UTF-16BE when it carries a BOM, PDFDocEncoding otherwise.
pub(crate) fn pdf_to_utf8(s: &[u8]) -> String {
    to_utf8(&PDF_DOC_ENCODING, s)
}

/// Follow an indirect reference. A dangling reference is returned as-is, so the
/// caller's type check fails instead of panicking.
pub(crate) fn maybe_deref<'a>(doc: &'a Document, o: &'a Object) -> &'a Object {
    match o {
        &Object::Reference(r) => doc.get_object(r).unwrap_or(o),
        _ => o,
    }
}

pub(crate) fn maybe_get_obj<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    dict.get(key).map(|o| maybe_deref(doc, o)).ok()
}

pub(crate) trait FromObj<'a>
where
    Self: std::marker::Sized,
{
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<Self>;
}

impl<'a, T: FromObj<'a>> FromObj<'a> for Vec<T> {
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<Self> {
        maybe_deref(doc, obj)
            .as_array()
            .ok()?
            .iter()
            .map(|x| T::from_obj(doc, x))
            .collect()
    }
}

impl<'a> FromObj<'a> for f32 {
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<Self> {
        as_num(maybe_deref(doc, obj))
    }
}

impl<'a> FromObj<'a> for i64 {
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<Self> {
        match maybe_deref(doc, obj) {
            &Object::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl<'a> FromObj<'a> for &'a Dictionary {
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
        maybe_deref(doc, obj).as_dict().ok()
    }
}

impl<'a> FromObj<'a> for &'a Stream {
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<&'a Stream> {
        maybe_deref(doc, obj).as_stream().ok()
    }
}

impl<'a> FromObj<'a> for &'a [u8] {
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<&'a [u8]> {
        maybe_deref(doc, obj).as_name().ok()
    }
}

impl<'a> FromObj<'a> for &'a Object {
    fn from_obj(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
        Some(maybe_deref(doc, obj))
    }
}

pub(crate) fn maybe_get<'a, T: FromObj<'a>>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<T> {
    maybe_get_obj(doc, dict, key).and_then(|o| T::from_obj(doc, o))
}

pub(crate) fn maybe_get_name_string<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<String> {
    maybe_get::<&[u8]>(doc, dict, key).map(pdf_to_utf8)
}

pub(crate) fn as_num(o: &Object) -> Option<f32> {
    match o {
        &Object::Integer(i) => Some(i as f32),
        &Object::Real(f) => Some(f as f32),
        _ => None,
    }
}

/// Numeric operands of an operator, or `None` if there are fewer than `N` or any is not a number.
pub(crate) fn operand_nums<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    let mut out = [0.; N];
    if operands.len() < N {
        return None;
    }
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = as_num(operand)?;
    }
    Some(out)
}

pub(crate) fn get_contents(contents: &Stream) -> Vec<u8> {
    if contents.filters().is_ok() {
        contents
            .decompressed_content()
            .unwrap_or_else(|_| contents.content.clone())
    } else {
        contents.content.clone()
    }
}

/// Look up a page attribute, walking up the page tree through `Parent` when the
/// page itself does not define it.
pub(crate) fn get_inherited<'a, T: FromObj<'a>>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<T> {
    get_inherited_at_depth(doc, dict, key, 0)
}

// Page trees are shallow; the bound only guards against Parent cycles.
const MAX_INHERIT_DEPTH: usize = 64;

fn get_inherited_at_depth<'a, T: FromObj<'a>>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
    depth: usize,
) -> Option<T> {
    if let Some(o) = maybe_get(doc, dict, key) {
        return Some(o);
    }
    if depth >= MAX_INHERIT_DEPTH {
        return None;
    }
    let parent = dict
        .get(b"Parent")
        .and_then(|parent| parent.as_reference())
        .and_then(|id| doc.get_dictionary(id))
        .ok()?;
    get_inherited_at_depth(doc, parent, key, depth + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn inherited_value_comes_from_parent() {
        let mut doc = Document::with_version("1.5");
        let parent_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Rotate" => 90,
        });
        let page = dictionary! {
            "Type" => "Page",
            "Parent" => parent_id,
        };
        let rotate: Option<i64> = get_inherited(&doc, &page, b"Rotate");
        assert_eq!(rotate, Some(90));
        let missing: Option<i64> = get_inherited(&doc, &page, b"UserUnit");
        assert_eq!(missing, None);
    }

    #[test]
    fn operand_nums_rejects_non_numbers() {
        let ops = vec![Object::Integer(1), Object::Real(2.5)];
        assert_eq!(operand_nums::<2>(&ops), Some([1.0, 2.5]));
        assert_eq!(operand_nums::<3>(&ops), None);
        let ops = vec![Object::Integer(1), Object::Name(b"F1".to_vec())];
        assert_eq!(operand_nums::<2>(&ops), None);
    }
}
