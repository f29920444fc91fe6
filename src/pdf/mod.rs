use std::collections::{BTreeMap, BTreeSet};

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{FontEntry, FontSet, FontVariant, PT_PER_MM};
use crate::model::{Document, DrawOp};

const PRODUCER: &str = concat!("anamnesis-pdf ", env!("CARGO_PKG_VERSION"));

/// Converts layout millimetres (origin top-left, y down) into PDF points (origin bottom-left).
struct Transform {
    page_height: f32,
}

impl Transform {
    fn x(&self, x: f32) -> f32 {
        x * PT_PER_MM
    }

    fn y(&self, y: f32) -> f32 {
        (self.page_height - y) * PT_PER_MM
    }

    fn len(&self, l: f32) -> f32 {
        l * PT_PER_MM
    }
}

fn write_op(
    content: &mut Content,
    op: &DrawOp,
    tf: &Transform,
    fonts: &BTreeMap<FontVariant, FontEntry>,
) -> Result<(), Error> {
    match op {
        DrawOp::Text { x, y, text, style } => {
            if text.is_empty() {
                return Ok(());
            }
            let variant = FontVariant::of(style);
            let entry = fonts
                .get(&variant)
                .ok_or_else(|| Error::Pdf(format!("font {variant:?} was not registered")))?;
            let bytes = entry.encode(text);
            content
                .begin_text()
                .set_font(Name(entry.pdf_name.as_bytes()), style.size)
                .next_line(tf.x(*x), tf.y(*y))
                .show(Str(&bytes))
                .end_text();
        }
        DrawOp::Rule { x1, x2, y, width } => {
            content.save_state();
            content.set_line_width(tf.len(*width));
            content.move_to(tf.x(*x1), tf.y(*y));
            content.line_to(tf.x(*x2), tf.y(*y));
            content.stroke();
            content.restore_state();
        }
    }
    Ok(())
}

/// Serialise a finalized document to PDF bytes.
pub fn render(doc: &Document, fonts: &FontSet, title: &str) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    // Phase 1: collect used characters per font variant and register the fonts
    let mut used_chars: BTreeMap<FontVariant, BTreeSet<char>> = BTreeMap::new();
    for page in doc.pages() {
        for op in page.all_ops() {
            if let DrawOp::Text { text, style, .. } = op {
                let chars = used_chars.entry(FontVariant::of(style)).or_default();
                chars.extend(text.chars());
                chars.insert(' ');
            }
        }
    }

    let mut font_entries: BTreeMap<FontVariant, FontEntry> = BTreeMap::new();
    for (i, (variant, chars)) in used_chars.iter().enumerate() {
        let entry = fonts.register(&mut pdf, *variant, format!("F{}", i + 1), &mut alloc, chars);
        font_entries.insert(*variant, entry);
    }

    let t_fonts = t0.elapsed();

    // Phase 2: one content stream per page, body first, then footer
    let tf = Transform {
        page_height: doc.page_height,
    };
    let mut contents: Vec<Content> = Vec::with_capacity(doc.page_count());
    for page in doc.pages() {
        let mut content = Content::new();
        for op in page.all_ops() {
            write_op(&mut content, op, &tf, &font_entries)?;
        }
        contents.push(content);
    }

    let t_content = t0.elapsed();

    // Phase 3: page tree
    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let media_box = Rect::new(0.0, 0.0, tf.len(doc.page_width), tf.len(doc.page_height));
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(media_box)
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for entry in font_entries.values() {
            font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
        }
    }

    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));

    let t_assembly = t0.elapsed();

    log::info!(
        "Render phases: fonts={:.1}ms, content={:.1}ms, assembly={:.1}ms ({n} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_content - t_fonts).as_secs_f64() * 1000.0,
        (t_assembly - t_content).as_secs_f64() * 1000.0,
    );

    Ok(pdf.finish())
}
