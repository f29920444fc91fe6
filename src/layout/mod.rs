mod draw;
mod finalize;
mod wrap;

pub use finalize::finalize;
pub use wrap::wrap;

use crate::error::Error;
use crate::fonts::TextMeasure;
use crate::model::{
    ClassifiedLine, Cursor, Document, EmptyInput, LineRole, Page, PageSetup, ReportHeader,
    ReportOptions, Style,
};
use crate::report::classify_report;

/// Forward-pass page flow over classified lines.
///
/// Owns the cursor and the page set. Every element's total height is known before anything is
/// drawn, and an element that does not fit below the cursor moves to a new page as a whole.
/// Only an element taller than an entire page is split, at line boundaries.
pub struct PageFlow<'a> {
    setup: &'a PageSetup,
    measure: &'a dyn TextMeasure,
    cursor: Cursor,
    pages: Vec<Page>,
}

impl<'a> PageFlow<'a> {
    /// Start on page 1 below the document header.
    pub fn new(setup: &'a PageSetup, header: &ReportHeader, measure: &'a dyn TextMeasure) -> Self {
        let mut first = Page::default();
        draw::document_header(&mut first, setup, header, measure);
        PageFlow {
            setup,
            measure,
            cursor: Cursor {
                page: 1,
                y: setup.content_top,
            },
            pages: vec![first],
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn place(&mut self, line: &ClassifiedLine) {
        match line.role {
            LineRole::MajorSeparator => self.place_rule(self.setup.major_rule_width),
            LineRole::MinorSeparator => self.place_rule(self.setup.minor_rule_width),
            LineRole::SectionHeader => self.place_section_header(line.raw.trim()),
            LineRole::FieldValue => self.place_field_value(
                line.field.as_deref().unwrap_or_default(),
                line.value.as_deref().unwrap_or_default(),
            ),
            LineRole::Blank => self.place_blank(),
            LineRole::Paragraph => self.place_paragraph(&line.raw),
        }
    }

    /// Seal the page set. Footers are added afterwards by [`finalize`].
    pub fn finish(self) -> Document {
        log::debug!("Layout finished on page {}", self.pages.len());
        Document::new(self.setup.page_width, self.setup.page_height, self.pages)
    }

    fn page(&mut self) -> &mut Page {
        &mut self.pages[self.cursor.page - 1]
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor.y + height <= self.setup.bottom_limit()
    }

    fn break_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = Cursor {
            page: self.cursor.page + 1,
            y: self.setup.margin_top,
        };
        log::debug!("Page break → page {}", self.cursor.page);
    }

    /// Move to a new page unless `height` fits below the cursor.
    fn reserve(&mut self, height: f32) {
        if !self.fits(height) {
            self.break_page();
        }
    }

    fn advance(&mut self, height: f32) {
        self.cursor.y += height;
    }

    /// Height available on a continuation page.
    fn page_capacity(&self) -> f32 {
        self.setup.bottom_limit() - self.setup.margin_top
    }

    fn rows_that_fit(&self) -> usize {
        let room = self.setup.bottom_limit() - self.cursor.y;
        ((room / self.setup.line_height) + 1e-4).floor().max(1.0) as usize
    }

    fn place_rule(&mut self, width: f32) {
        let advance = self.setup.separator_advance;
        self.reserve(advance);
        let (x1, x2, y) = (self.setup.margin_left, self.setup.right_edge(), self.cursor.y);
        draw::rule(self.page(), x1, x2, y, width);
        self.advance(advance);
    }

    fn place_section_header(&mut self, title: &str) {
        let advance = self.setup.line_height + self.setup.header_gap;
        self.reserve(advance);
        let (x, y) = (self.setup.margin_left, self.cursor.y);
        draw::text(self.page(), x, y, title, Style::SECTION_HEADER);
        self.advance(advance);
    }

    fn place_blank(&mut self) {
        if !self.fits(self.setup.blank_advance) {
            // The gap is dropped and never opens a page; whatever follows starts the next one.
            self.cursor.y = self.setup.bottom_limit();
            return;
        }
        self.advance(self.setup.blank_advance);
    }

    fn place_field_value(&mut self, label: &str, value: &str) {
        let setup = self.setup;
        let value_lines = wrap(value, setup.value_width, &Style::BODY, self.measure);
        self.place_rows(&value_lines, |page, y, rows, first| {
            draw::field_value(page, setup, y, first.then_some(label), rows);
        });
    }

    fn place_paragraph(&mut self, text: &str) {
        let setup = self.setup;
        let lines = wrap(text, setup.body_width(), &Style::BODY, self.measure);
        self.place_rows(&lines, |page, y, rows, _| {
            draw::stacked_lines(page, setup.margin_left, y, rows, Style::BODY, setup.line_height);
        });
    }

    /// Place a block of `rows` text rows (at least one row tall). `draw` receives the page, the
    /// first baseline, the rows of this fragment and whether it is the first fragment.
    ///
    /// A block taller than a whole page cannot be kept together, so it starts at the cursor
    /// (once a single row fits) and continues on as many pages as it needs.
    fn place_rows<F>(&mut self, rows: &[String], mut draw: F)
    where
        F: FnMut(&mut Page, f32, &[String], bool),
    {
        let line_h = self.setup.line_height;
        let height = line_h * rows.len().max(1) as f32;
        if height > self.page_capacity() {
            self.reserve(line_h);
        } else {
            self.reserve(height);
        }

        if rows.is_empty() {
            let y = self.cursor.y;
            draw(self.page(), y, rows, true);
            self.advance(line_h);
            return;
        }

        let mut start = 0;
        while start < rows.len() {
            let end = (start + self.rows_that_fit()).min(rows.len());
            let y = self.cursor.y;
            draw(self.page(), y, &rows[start..end], start == 0);
            self.advance(line_h * (end - start) as f32);
            start = end;
            if start < rows.len() {
                log::debug!(
                    "Block of {} rows taller than a page; continuing on the next page",
                    rows.len()
                );
                self.break_page();
            }
        }
    }
}

/// Lay out a summary and stamp its footers.
pub fn layout_report(
    summary: &str,
    options: &ReportOptions,
    measure: &dyn TextMeasure,
) -> Result<Document, Error> {
    let is_empty = summary.trim().is_empty();
    if is_empty && options.empty_input == EmptyInput::Reject {
        return Err(Error::EmptyReport);
    }

    let mut flow = PageFlow::new(&options.setup, &options.header, measure);
    if !is_empty {
        for line in classify_report(summary) {
            flow.place(&line);
        }
    }
    let doc = flow.finish();
    Ok(finalize(doc, &options.setup, &options.labels, measure))
}
