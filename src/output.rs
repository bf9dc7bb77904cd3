use unicode_normalization::UnicodeNormalization;

/// Accumulates the text of each page, deciding where line breaks and word
/// spaces go from the device-space position of consecutive text runs.
pub(crate) struct PlainTextOutput {
    buf: String,
    last_x: f32,
    last_y: f32,
    last_font_size: f32,
    has_text: bool,
    normalize_ligatures: bool,
    pages: Vec<String>,
}

impl PlainTextOutput {
    // A run whose baseline moved more than this fraction of the font size starts a new line.
    const LINE_BREAK_RATIO: f32 = 0.5;
    // Horizontal gap, as a fraction of the font size, that separates two words.
    const WORD_GAP_RATIO: f32 = 0.15;

    pub(crate) fn new(normalize_ligatures: bool) -> PlainTextOutput {
        PlainTextOutput {
            buf: String::new(),
            last_x: 0.,
            last_y: 0.,
            last_font_size: 0.,
            has_text: false,
            normalize_ligatures,
            pages: Vec::new(),
        }
    }

    pub(crate) fn into_pages(self) -> Vec<String> {
        self.pages
    }

    pub(crate) fn begin_page(&mut self) {
        self.buf.clear();
        self.has_text = false;
    }

    pub(crate) fn end_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.buf));
    }

    fn ends_with_whitespace(&self) -> bool {
        self.buf.chars().last().map_or(true, |c| c.is_whitespace())
    }

    /// A text run is about to start at `(x, y)` with the given device-space font size.
    pub(crate) fn begin_run(&mut self, x: f32, y: f32, font_size: f32) {
        if !self.has_text {
            return;
        }
        let size = font_size.max(self.last_font_size);
        let y_gap = (y - self.last_y).abs();
        if y_gap > size * Self::LINE_BREAK_RATIO {
            self.buf.push('\n');
        } else if x - self.last_x > size * Self::WORD_GAP_RATIO && !self.ends_with_whitespace() {
            self.buf.push(' ');
        }
    }

    pub(crate) fn output_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\t' => self.buf.push(' '),
                '\u{fb00}'..='\u{fb06}' if self.normalize_ligatures => {
                    self.buf.extend(std::iter::once(c).nfkc())
                }
                _ => self.buf.push(c),
            }
        }
    }

    /// The run ended at `(x, y)`.
    pub(crate) fn end_run(&mut self, x: f32, y: f32, font_size: f32) {
        self.last_x = x;
        self.last_y = y;
        self.last_font_size = font_size;
        self.has_text = true;
    }

    /// An explicit positioning adjustment wide enough to read as a word break.
    pub(crate) fn word_break(&mut self) {
        if self.has_text && !self.ends_with_whitespace() {
            self.buf.push(' ');
        }
    }
}
