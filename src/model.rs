//! Plain data shared by the classifier, the layout engine and the PDF writer.
//!
//! Layout coordinates are millimetres measured from the top-left corner of the page, with `y`
//! growing downward. Font sizes are PostScript points.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRole {
    MajorSeparator,
    MinorSeparator,
    SectionHeader,
    FieldValue,
    Blank,
    Paragraph,
}

/// One summary line together with its role. `field` and `value` are set only for
/// [`LineRole::FieldValue`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedLine {
    pub role: LineRole,
    pub raw: String,
    pub field: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub size: f32, // points
}

impl Style {
    pub const BODY: Style = Style::new(false, false, 10.0);
    pub const SECTION_HEADER: Style = Style::new(true, false, 12.0);
    pub const FIELD_LABEL: Style = Style::new(true, false, 10.0);
    pub const FOOTER: Style = Style::new(false, true, 8.0);
    pub const TITLE: Style = Style::new(true, false, 18.0);
    pub const SUBTITLE: Style = Style::new(false, false, 10.0);
    pub const DATE_LINE: Style = Style::new(false, true, 9.0);

    pub const fn new(bold: bool, italic: bool, size: f32) -> Self {
        Style { bold, italic, size }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// `x` is the left edge of the run, `y` its baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        style: Style,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
    },
}

impl DrawOp {
    pub fn text(&self) -> Option<&str> {
        match self {
            DrawOp::Text { text, .. } => Some(text),
            DrawOp::Rule { .. } => None,
        }
    }

    pub fn y(&self) -> f32 {
        match self {
            DrawOp::Text { y, .. } | DrawOp::Rule { y, .. } => *y,
        }
    }
}

/// Body instructions only grow; the footer list is owned by the finalizer and replaced as a
/// whole.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    ops: Vec<DrawOp>,
    footer: Vec<DrawOp>,
}

impl Page {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn footer(&self) -> &[DrawOp] {
        &self.footer
    }

    /// Body text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::text)
    }

    pub fn footer_texts(&self) -> impl Iterator<Item = &str> {
        self.footer.iter().filter_map(DrawOp::text)
    }

    /// Body and footer instructions in painting order.
    pub fn all_ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().chain(self.footer.iter())
    }

    pub(crate) fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub(crate) fn set_footer(&mut self, footer: Vec<DrawOp>) {
        self.footer = footer;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub page_width: f32,
    pub page_height: f32,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(page_width: f32, page_height: f32, pages: Vec<Page>) -> Self {
        Document {
            page_width,
            page_height,
            pages,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }
}

/// Layout position: 1-based page number and the baseline `y` of the next element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f32,
}

/// Page geometry and vertical rhythm. Defaults describe an A4 page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSetup {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// First baseline on continuation pages.
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// First body baseline on page 1, below the document header.
    pub content_top: f32,
    pub line_height: f32,
    pub header_gap: f32,
    pub separator_advance: f32,
    pub blank_advance: f32,
    /// x of the value column of `field: value` rows.
    pub value_x: f32,
    pub value_width: f32,
    pub major_rule_width: f32,
    pub minor_rule_width: f32,
    /// Distances of the two footer baselines from the bottom edge.
    pub footer_page_offset: f32,
    pub footer_attribution_offset: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        PageSetup {
            page_width: 210.0,
            page_height: 297.0,
            margin_left: 15.0,
            margin_right: 15.0,
            margin_top: 20.0,
            margin_bottom: 20.0,
            content_top: 50.0,
            line_height: 6.0,
            header_gap: 2.0,
            separator_advance: 4.0,
            blank_advance: 3.0,
            value_x: 70.0,
            value_width: 120.0,
            major_rule_width: 0.3,
            minor_rule_width: 0.1,
            footer_page_offset: 10.0,
            footer_attribution_offset: 6.0,
        }
    }
}

impl PageSetup {
    pub fn body_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    pub fn right_edge(&self) -> f32 {
        self.page_width - self.margin_right
    }

    /// Lowest `y` any body element may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.page_height - self.margin_bottom
    }

    pub fn center_x(&self) -> f32 {
        self.page_width / 2.0
    }
}

/// Title block drawn at the top of page 1.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportHeader {
    pub title: String,
    pub subtitle: String,
    pub date_line: Option<String>,
}

impl Default for ReportHeader {
    fn default() -> Self {
        ReportHeader {
            title: "PATIENT ANAMNESIS RESULT".to_string(),
            subtitle: "Chatbot PUSTU - Puskesmas Pembantu".to_string(),
            date_line: None,
        }
    }
}

impl ReportHeader {
    pub fn english(timestamp: Option<&str>) -> Self {
        ReportHeader {
            date_line: timestamp.map(|t| format!("Date: {t}")),
            ..ReportHeader::default()
        }
    }

    pub fn indonesian(timestamp: Option<&str>) -> Self {
        ReportHeader {
            title: "HASIL ANAMNESIS PASIEN".to_string(),
            subtitle: "Chatbot PUSTU - Puskesmas Pembantu".to_string(),
            date_line: timestamp.map(|t| format!("Tanggal: {t}")),
        }
    }
}

/// Footer wording. `page_template` understands `{page}` and `{total}`.
#[derive(Clone, Debug, PartialEq)]
pub struct Labels {
    pub page_template: String,
    pub attribution: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels::english()
    }
}

impl Labels {
    pub fn english() -> Self {
        Labels {
            page_template: "Page {page} of {total}".to_string(),
            attribution: "This document was generated automatically by Chatbot PUSTU".to_string(),
        }
    }

    pub fn indonesian() -> Self {
        Labels {
            page_template: "Halaman {page} dari {total}".to_string(),
            attribution: "Dokumen ini dihasilkan secara otomatis oleh Chatbot PUSTU".to_string(),
        }
    }

    pub fn page_line(&self, page: usize, total: usize) -> String {
        self.page_template
            .replace("{page}", &page.to_string())
            .replace("{total}", &total.to_string())
    }
}

/// What to do with an empty or whitespace-only summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyInput {
    /// Lay out a single page carrying only the document header and footer.
    #[default]
    SinglePage,
    Reject,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportOptions {
    pub setup: PageSetup,
    pub header: ReportHeader,
    pub labels: Labels,
    pub empty_input: EmptyInput,
}
