#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use anamnesis_pdf::{Document, DrawOp, MonospaceMeasure, Page};

pub const SCENARIO: &str =
    "IDENTITAS PASIEN\n===\nNama: Budi\nUmur: 30\n\nANAMNESIS\nKeluhan: Demam";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn mono() -> MonospaceMeasure {
    MonospaceMeasure::default()
}

/// `count` single-row paragraphs, one per line.
pub fn numbered_lines(prefix: &str, count: usize) -> String {
    (1..=count)
        .map(|i| format!("{prefix} {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

pub fn find_text<'a>(page: &'a Page, needle: &str) -> Option<&'a DrawOp> {
    page.ops().iter().find(|op| op.text() == Some(needle))
}

/// Text runs on `page` containing `needle`.
pub fn texts_containing<'a>(page: &'a Page, needle: &str) -> Vec<&'a DrawOp> {
    page.ops()
        .iter()
        .filter(|op| op.text().is_some_and(|t| t.contains(needle)))
        .collect()
}

pub fn word_count(doc: &Document, word: &str) -> usize {
    doc.pages()
        .iter()
        .flat_map(|p| p.texts())
        .flat_map(|t| t.split_whitespace())
        .filter(|w| *w == word)
        .count()
}

/// Output directory: tests/output/<name>/
pub fn output_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(name);
    fs::create_dir_all(&dir).expect("create output dir");
    dir
}

/// Inflate every FlateDecode stream in a PDF and return the decoded content as text.
pub fn inflate_streams(pdf: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(rel) = find(&pdf[pos..], b"stream\n") {
        let start = pos + rel + b"stream\n".len();
        let is_end_marker = pos + rel >= 3 && &pdf[pos + rel - 3..pos + rel] == b"end";
        pos = start;
        if is_end_marker {
            continue;
        }
        let Some(len) = find(&pdf[start..], b"\nendstream") else {
            break;
        };
        if let Ok(data) = miniz_oxide::inflate::decompress_to_vec_zlib(&pdf[start..start + len]) {
            out.push(String::from_utf8_lossy(&data).into_owned());
        }
        pos = start + len;
    }
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Families commonly installed on Linux, macOS and Windows hosts.
pub const CANDIDATE_FAMILIES: [&str; 5] = [
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Verdana",
];

/// First installed regular face (a single `.ttf`/`.otf`, not a collection) of one of
/// [`CANDIDATE_FAMILIES`], as (family, path).
pub fn installed_regular_face() -> Option<(String, PathBuf)> {
    let dirs = anamnesis_pdf::font_directories(&[]);
    for family in CANDIDATE_FAMILIES {
        let wanted = family.to_lowercase();
        let mut visited = std::collections::HashSet::new();
        let mut stack = dirs.clone();
        while let Some(dir) = stack.pop() {
            if !visited.insert(dir.clone()) {
                continue;
            }
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                let single_face = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
                if !single_face {
                    continue;
                }
                let Ok(data) = fs::read(&path) else {
                    continue;
                };
                let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
                    continue;
                };
                let name = face
                    .names()
                    .into_iter()
                    .filter(|n| n.name_id == ttf_parser::name_id::FAMILY && n.is_unicode())
                    .find_map(|n| n.to_string());
                if name.is_some_and(|n| n.to_lowercase() == wanted)
                    && !face.is_bold()
                    && !face.is_italic()
                {
                    return Some((family.to_string(), path));
                }
            }
        }
    }
    None
}

/// Advance of `ch` in the face at `path`, in millimetres at `size` points.
pub fn face_advance_mm(path: &std::path::Path, ch: char, size: f32) -> f32 {
    let data = fs::read(path).expect("read font");
    let face = ttf_parser::Face::parse(&data, 0).expect("parse font");
    let gid = face.glyph_index(ch).expect("glyph present");
    let advance = face.glyph_hor_advance(gid).expect("advance present") as f32;
    advance / face.units_per_em() as f32 * size / anamnesis_pdf::PT_PER_MM
}
