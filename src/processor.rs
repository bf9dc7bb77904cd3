use std::collections::HashMap;
use std::rc::Rc;

use euclid::{Transform2D, vec2};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::fonts::{PdfFont, make_font};
use crate::output::PlainTextOutput;
use crate::types::Transform;
use crate::utils::*;

// Form XObjects may reference each other; stop following them past this depth.
const MAX_FORM_DEPTH: usize = 16;

// TJ adjustments (thousandths of an em) further left than this read as a word break.
const TJ_WORD_BREAK: f32 = -250.;

#[derive(Clone)]
pub(crate) struct TextState {
    pub(crate) font: Option<Rc<dyn PdfFont>>,
    pub(crate) font_size: f32,
    pub(crate) character_spacing: f32,
    pub(crate) word_spacing: f32,
    pub(crate) horizontal_scaling: f32,
    pub(crate) leading: f32,
    pub(crate) rise: f32,
    pub(crate) tm: Transform,
}

#[derive(Clone)]
pub(crate) struct GraphicsState {
    pub(crate) ctm: Transform,
    pub(crate) ts: TextState,
}

impl GraphicsState {
    fn new(ctm: Transform) -> GraphicsState {
        GraphicsState {
            ts: TextState {
                font: None,
                font_size: 0.,
                character_spacing: 0.,
                word_spacing: 0.,
                horizontal_scaling: 100. / 100.,
                leading: 0.,
                rise: 0.,
                tm: Transform2D::identity(),
            },
            ctm,
        }
    }

    // Trm = Tsm × Tm × CTM
    fn text_rendering_matrix(&self) -> Transform {
        let ts = &self.ts;
        let tsm = Transform2D::new(ts.horizontal_scaling, 0., 0., 1.0, 0., ts.rise);
        tsm.then(&ts.tm.then(&self.ctm))
    }
}

/// Font size after the text and graphics transforms are applied.
fn device_font_size(trm: &Transform, font_size: f32) -> f32 {
    let v = trm.transform_vector(vec2(0., font_size));
    v.length()
}

fn show_text(gs: &mut GraphicsState, s: &[u8], output: &mut PlainTextOutput) {
    let trm = gs.text_rendering_matrix();
    let size = device_font_size(&trm, gs.ts.font_size);
    output.begin_run(trm.m31, trm.m32, size);

    let Some(font) = gs.ts.font.clone() else {
        warn!("text shown with no font selected");
        output.output_text(&pdf_to_utf8(s));
        output.end_run(trm.m31, trm.m32, size);
        return;
    };

    let ts = &mut gs.ts;
    let mut bytes = s.iter();
    while let Some((c, length)) = font.next_char(&mut bytes) {
        output.output_text(&font.decode_char(c));

        let w0 = font.get_width(c) / 1000.;
        let mut spacing = ts.character_spacing;
        // Word spacing applies to the single-byte code 32 only, never to 32 inside a multi-byte code.
        if c == 32 && length == 1 {
            spacing += ts.word_spacing;
        }
        let tx = ts.horizontal_scaling * (w0 * ts.font_size + spacing);
        ts.tm = Transform2D::translation(tx, 0.).then(&ts.tm);
    }
    debug!("{:?} {:?}", font.get_font_name(), s);

    let trm = gs.text_rendering_matrix();
    output.end_run(trm.m31, trm.m32, size);
}

/// Move the text position by a TJ adjustment, given in thousandths of an em.
fn adjust_text(gs: &mut GraphicsState, tj: f32, output: &mut PlainTextOutput) {
    let ts = &mut gs.ts;
    let tx = -ts.horizontal_scaling * (tj / 1000.) * ts.font_size;
    ts.tm = Transform2D::translation(tx, 0.).then(&ts.tm);
    if tj < TJ_WORD_BREAK {
        output.word_break();
    }
}

fn name_operand(operation: &Operation) -> Option<&[u8]> {
    operation.operands.first().and_then(|o| o.as_name().ok())
}

/// Walks a content stream and feeds the text it shows to a [`PlainTextOutput`].
#[derive(Debug, Default)]
pub(crate) struct Processor {
    depth: usize,
}

impl Processor {
    pub(crate) fn new() -> Processor {
        Processor { depth: 0 }
    }

    pub(crate) fn process_stream(
        &mut self,
        doc: &Document,
        content: &[u8],
        resources: &Dictionary,
        output: &mut PlainTextOutput,
        page_num: u32,
    ) -> Result<(), ExtractError> {
        self.process_with_ctm(
            doc,
            content,
            resources,
            Transform2D::identity(),
            output,
            page_num,
        )
    }

    fn process_with_ctm(
        &mut self,
        doc: &Document,
        content: &[u8],
        resources: &Dictionary,
        ctm: Transform,
        output: &mut PlainTextOutput,
        page_num: u32,
    ) -> Result<(), ExtractError> {
        let content = match Content::decode(content) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Failed to decode content stream for page {}: {}. Skipping this content.",
                    page_num, e
                );
                return Ok(());
            }
        };
        let mut font_table: HashMap<Vec<u8>, Rc<dyn PdfFont>> = HashMap::new();
        let mut gs = GraphicsState::new(ctm);
        let mut gs_stack = Vec::new();
        let mut tlm: Transform = Transform2D::identity();

        for operation in &content.operations {
            let operands = &operation.operands;
            match operation.operator.as_ref() {
                "BT" | "ET" => {
                    tlm = Transform2D::identity();
                    gs.ts.tm = tlm;
                }
                "cm" => match operand_nums::<6>(operands) {
                    Some([a, b, c, d, e, f]) => {
                        gs.ctm = Transform2D::new(a, b, c, d, e, f).then(&gs.ctm);
                        debug!("matrix {:?}", gs.ctm);
                    }
                    None => debug!("malformed cm {:?}", operands),
                },
                "q" => {
                    gs_stack.push(gs.clone());
                }
                "Q" => {
                    if let Some(s) = gs_stack.pop() {
                        gs = s;
                    } else {
                        warn!("No state to pop");
                    }
                }
                "Tc" => {
                    if let Some([v]) = operand_nums(operands) {
                        gs.ts.character_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some([v]) = operand_nums(operands) {
                        gs.ts.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some([v]) = operand_nums(operands) {
                        gs.ts.horizontal_scaling = v / 100.;
                    }
                }
                "TL" => {
                    if let Some([v]) = operand_nums(operands) {
                        gs.ts.leading = v;
                    }
                }
                "Ts" => {
                    if let Some([v]) = operand_nums(operands) {
                        gs.ts.rise = v;
                    }
                }
                "Tf" => {
                    let Some(name) = name_operand(operation) else {
                        debug!("malformed Tf {:?}", operands);
                        continue;
                    };
                    gs.ts.font = match font_table.get(name) {
                        Some(font) => Some(font.clone()),
                        None => {
                            let font = maybe_get::<&Dictionary>(doc, resources, b"Font")
                                .and_then(|fonts| maybe_get::<&Dictionary>(doc, fonts, name))
                                .map(|dict| make_font(doc, dict));
                            match &font {
                                Some(font) => {
                                    font_table.insert(name.to_owned(), font.clone());
                                }
                                None => warn!("font {} not found in resources", pdf_to_utf8(name)),
                            }
                            font
                        }
                    };
                    if let Some(size) = operands.get(1).and_then(as_num) {
                        gs.ts.font_size = size;
                    }
                    debug!("font {} size: {}", pdf_to_utf8(name), gs.ts.font_size);
                }
                "Tm" => match operand_nums::<6>(operands) {
                    Some([a, b, c, d, e, f]) => {
                        tlm = Transform2D::new(a, b, c, d, e, f);
                        gs.ts.tm = tlm;
                        debug!("Tm: matrix {:?}", gs.ts.tm);
                    }
                    None => debug!("malformed Tm {:?}", operands),
                },
                "Td" | "TD" => match operand_nums::<2>(operands) {
                    Some([tx, ty]) => {
                        if operation.operator == "TD" {
                            gs.ts.leading = -ty;
                        }
                        tlm = Transform2D::translation(tx, ty).then(&tlm);
                        gs.ts.tm = tlm;
                    }
                    None => debug!("malformed {} {:?}", operation.operator, operands),
                },
                "T*" => {
                    tlm = Transform2D::translation(0., -gs.ts.leading).then(&tlm);
                    gs.ts.tm = tlm;
                }
                "Tj" => match operands.first() {
                    Some(Object::String(s, _)) => show_text(&mut gs, s, output),
                    _ => debug!("unexpected Tj operand {:?}", operation),
                },
                "'" => {
                    tlm = Transform2D::translation(0., -gs.ts.leading).then(&tlm);
                    gs.ts.tm = tlm;
                    if let Some(Object::String(s, _)) = operands.first() {
                        show_text(&mut gs, s, output);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac)) = (
                        operands.first().and_then(as_num),
                        operands.get(1).and_then(as_num),
                    ) {
                        gs.ts.word_spacing = aw;
                        gs.ts.character_spacing = ac;
                    }
                    tlm = Transform2D::translation(0., -gs.ts.leading).then(&tlm);
                    gs.ts.tm = tlm;
                    if let Some(Object::String(s, _)) = operands.get(2) {
                        show_text(&mut gs, s, output);
                    }
                }
                "TJ" => match operands.first() {
                    Some(Object::Array(array)) => {
                        for e in array {
                            match e {
                                Object::String(s, _) => show_text(&mut gs, s, output),
                                Object::Integer(_) | Object::Real(_) => {
                                    if let Some(tj) = as_num(e) {
                                        adjust_text(&mut gs, tj, output);
                                    }
                                }
                                _ => {
                                    debug!("kind of {:?}", e);
                                }
                            }
                        }
                    }
                    _ => debug!("unexpected TJ operand {:?}", operation),
                },
                "Do" => {
                    // `Do` runs a whole form XObject, so recurse into `process_stream`
                    // with its content and resources
                    let Some(name) = name_operand(operation) else {
                        continue;
                    };
                    let Some(xf) = maybe_get::<&Dictionary>(doc, resources, b"XObject")
                        .and_then(|xobjects| maybe_get::<&Stream>(doc, xobjects, name))
                    else {
                        debug!("XObject {} not found", pdf_to_utf8(name));
                        continue;
                    };
                    if maybe_get::<&[u8]>(doc, &xf.dict, b"Subtype") != Some(b"Form".as_slice()) {
                        continue;
                    }
                    if self.depth >= MAX_FORM_DEPTH {
                        warn!("form XObjects nested too deeply on page {}", page_num);
                        continue;
                    }
                    let form_resources =
                        maybe_get::<&Dictionary>(doc, &xf.dict, b"Resources").unwrap_or(resources);
                    // Forms draw in the space of the invoking stream, adjusted by their Matrix
                    let matrix = maybe_get::<Vec<f32>>(doc, &xf.dict, b"Matrix")
                        .and_then(|m| <[f32; 6]>::try_from(m).ok())
                        .map(|[a, b, c, d, e, f]| Transform2D::new(a, b, c, d, e, f))
                        .unwrap_or_else(Transform2D::identity);
                    let contents = get_contents(xf);
                    self.depth += 1;
                    let result = self.process_with_ctm(
                        doc,
                        &contents,
                        form_resources,
                        matrix.then(&gs.ctm),
                        output,
                        page_num,
                    );
                    self.depth -= 1;
                    result?;
                }
                _ => {
                    debug!("unhandled operation {:?}", operation.operator);
                }
            }
        }
        Ok(())
    }
}
