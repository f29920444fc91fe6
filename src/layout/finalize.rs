use crate::fonts::TextMeasure;
use crate::model::{Document, DrawOp, Labels, PageSetup, Style};

/// Stamp the page-number and attribution footers on every page.
///
/// Runs after layout because each footer names the total page count. Any footer from an earlier
/// run is replaced, so finalizing twice gives the same document. A document without pages is
/// returned unchanged.
pub fn finalize(
    mut doc: Document,
    setup: &PageSetup,
    labels: &Labels,
    measure: &dyn TextMeasure,
) -> Document {
    let total = doc.page_count();
    let center = doc.page_width / 2.0;
    let page_y = doc.page_height - setup.footer_page_offset;
    let attribution_y = doc.page_height - setup.footer_attribution_offset;

    for (idx, page) in doc.pages_mut().iter_mut().enumerate() {
        let footer = [
            (labels.page_line(idx + 1, total), page_y),
            (labels.attribution.clone(), attribution_y),
        ]
        .into_iter()
        .filter(|(text, _)| !text.is_empty())
        .map(|(text, y)| {
            let w = measure.measure(&text, &Style::FOOTER);
            DrawOp::Text {
                x: center - w / 2.0,
                y,
                text,
                style: Style::FOOTER,
            }
        })
        .collect();
        page.set_footer(footer);
    }

    log::debug!("Finalized {total} page(s)");
    doc
}
