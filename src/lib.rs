mod error;
mod fonts;
mod layout;
mod meta;
mod model;
mod pdf;
mod report;

pub use error::Error;
pub use fonts::{FontSet, FontVariant, MonospaceMeasure, PT_PER_MM, TextMeasure, font_directories};
pub use layout::{PageFlow, finalize, layout_report, wrap};
pub use meta::{export_filename, format_timestamp};
pub use model::{
    ClassifiedLine, Cursor, Document, DrawOp, EmptyInput, Labels, LineRole, Page, PageSetup,
    ReportHeader, ReportOptions, Style,
};
pub use pdf::render as render_document;
pub use report::{SECTION_KEYWORDS, classify, classify_report, extract_patient_name};

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;

/// Inputs of one export, as handed over by the chat front end.
pub struct ExportRequest<'a> {
    pub patient_name: &'a str,
    pub summary: &'a str,
    pub date: NaiveDate,
}

/// Lay out `summary`, stamp footers and serialise the result to PDF bytes.
pub fn render_report(
    summary: &str,
    options: &ReportOptions,
    fonts: &FontSet,
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let doc = layout_report(summary, options, fonts)?;
    let t_layout = t0.elapsed();

    let bytes = pdf::render(&doc, fonts, &options.header.title)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, render={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        doc.page_count(),
        bytes.len(),
    );

    Ok(bytes)
}

/// Render a report and write it into `out_dir` under [`export_filename`]. Returns the path
/// written.
pub fn export_report(
    request: &ExportRequest<'_>,
    options: &ReportOptions,
    fonts: &FontSet,
    out_dir: &Path,
) -> Result<PathBuf, Error> {
    let bytes = render_report(request.summary, options, fonts)?;

    let path = out_dir.join(export_filename(request.patient_name, request.date));
    std::fs::write(&path, &bytes).map_err(Error::Io)?;

    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
