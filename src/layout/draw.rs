//! Draw-instruction emitters. Each function appends to a page and never touches what is
//! already there.

use crate::fonts::TextMeasure;
use crate::model::{DrawOp, Page, PageSetup, ReportHeader, Style};

const TITLE_Y: f32 = 20.0;
const SUBTITLE_Y: f32 = 28.0;
const HEADER_RULE_Y: f32 = 33.0;
const HEADER_RULE_WIDTH: f32 = 0.5;
const DATE_LINE_Y: f32 = 40.0;

pub(crate) fn text(page: &mut Page, x: f32, y: f32, text: &str, style: Style) {
    if text.is_empty() {
        return;
    }
    page.push(DrawOp::Text {
        x,
        y,
        text: text.to_string(),
        style,
    });
}

/// Text whose horizontal midpoint lies at `center_x`.
pub(crate) fn centered_text(
    page: &mut Page,
    center_x: f32,
    y: f32,
    content: &str,
    style: Style,
    measure: &dyn TextMeasure,
) {
    let w = measure.measure(content, &style);
    text(page, center_x - w / 2.0, y, content, style);
}

pub(crate) fn rule(page: &mut Page, x1: f32, x2: f32, y: f32, width: f32) {
    page.push(DrawOp::Rule { x1, x2, y, width });
}

/// Consecutive lines starting at `first_baseline`, one `line_height` apart.
pub(crate) fn stacked_lines(
    page: &mut Page,
    x: f32,
    first_baseline: f32,
    lines: &[String],
    style: Style,
    line_height: f32,
) {
    for (i, line) in lines.iter().enumerate() {
        text(page, x, first_baseline + i as f32 * line_height, line, style);
    }
}

/// One `label: value` row. The bold label and the first value line share the baseline `y`;
/// further value lines continue below in the value column.
pub(crate) fn field_value(
    page: &mut Page,
    setup: &PageSetup,
    y: f32,
    label: Option<&str>,
    value_lines: &[String],
) {
    if let Some(label) = label {
        text(
            page,
            setup.margin_left,
            y,
            &format!("{label}:"),
            Style::FIELD_LABEL,
        );
    }
    stacked_lines(
        page,
        setup.value_x,
        y,
        value_lines,
        Style::BODY,
        setup.line_height,
    );
}

/// Title block at the top of the first page.
pub(crate) fn document_header(
    page: &mut Page,
    setup: &PageSetup,
    header: &ReportHeader,
    measure: &dyn TextMeasure,
) {
    let center = setup.center_x();
    centered_text(page, center, TITLE_Y, &header.title, Style::TITLE, measure);
    centered_text(
        page,
        center,
        SUBTITLE_Y,
        &header.subtitle,
        Style::SUBTITLE,
        measure,
    );
    rule(
        page,
        setup.margin_left,
        setup.right_edge(),
        HEADER_RULE_Y,
        HEADER_RULE_WIDTH,
    );
    if let Some(date_line) = &header.date_line {
        text(page, setup.margin_left, DATE_LINE_Y, date_line, Style::DATE_LINE);
    }
}
