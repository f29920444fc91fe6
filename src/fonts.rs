use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref, Str};
use ttf_parser::Face;

use crate::error::Error;
use crate::model::Style;

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Width measurement used by the wrapper and the layout engine.
pub trait TextMeasure {
    /// Advance width of `text` set in `style`, in millimetres.
    fn measure(&self, text: &str, style: &Style) -> f32;
}

/// Fixed advance per character. Useful for headless layout and for tests that need exact
/// arithmetic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    /// Advance of one character as a fraction of the font size.
    pub advance_em: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        MonospaceMeasure { advance_em: 0.6 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, style: &Style) -> f32 {
        text.chars().count() as f32 * self.advance_em * style.size / PT_PER_MM
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontVariant {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    pub fn of(style: &Style) -> Self {
        match (style.bold, style.italic) {
            (false, false) => FontVariant::Regular,
            (true, false) => FontVariant::Bold,
            (false, true) => FontVariant::Italic,
            (true, true) => FontVariant::BoldItalic,
        }
    }

    fn index(self) -> usize {
        match self {
            FontVariant::Regular => 0,
            FontVariant::Bold => 1,
            FontVariant::Italic => 2,
            FontVariant::BoldItalic => 3,
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, FontVariant::Bold | FontVariant::BoldItalic)
    }

    fn is_italic(self) -> bool {
        matches!(self, FontVariant::Italic | FontVariant::BoldItalic)
    }

    fn builtin_name(self) -> &'static str {
        match self {
            FontVariant::Regular => "Helvetica",
            FontVariant::Bold => "Helvetica-Bold",
            FontVariant::Italic => "Helvetica-Oblique",
            FontVariant::BoldItalic => "Helvetica-BoldOblique",
        }
    }
}

/// Helvetica advance widths (1000 units/em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

/// Width of a WinAnsi character in the standard Helvetica family. Characters outside
/// printable ASCII use an average width; unmappable characters are not drawn and measure 0.
fn helvetica_width_1000(ch: char, bold: bool) -> f32 {
    let byte = char_to_winansi(ch);
    match byte {
        32..=126 => {
            let table = if bold {
                &HELVETICA_BOLD_WIDTHS
            } else {
                &HELVETICA_WIDTHS
            };
            table[(byte - 32) as usize] as f32
        }
        0..=31 => 0.0,
        _ => 556.0,
    }
}

/// The single typeface family a report is set in: the standard Helvetica family, or one
/// TrueType family loaded from disk.
pub struct FontSet {
    family: String,
    embedded: Option<[Arc<TrueTypeFace>; 4]>,
}

pub(crate) struct TrueTypeFace {
    ps_name: String,
    italic: bool,
    data: Vec<u8>,
    face_index: u32,
    units_per_em: f32,
    widths_1000: HashMap<char, f32>,
}

impl Default for FontSet {
    fn default() -> Self {
        FontSet::builtin()
    }
}

impl FontSet {
    /// Standard Helvetica, not embedded.
    pub fn builtin() -> Self {
        FontSet {
            family: "Helvetica".to_string(),
            embedded: None,
        }
    }

    /// Locate `family` in `dirs` (searched recursively) and load its regular, bold, italic and
    /// bold italic faces. Missing styled faces fall back to the regular face.
    pub fn load_family(family: &str, dirs: &[PathBuf]) -> Result<Self, Error> {
        let t0 = std::time::Instant::now();
        let found = scan_family(family, dirs);

        let Some(regular_loc) = found.get(&(false, false)) else {
            return Err(Error::Font(format!(
                "no regular face of '{family}' found in {} font directories",
                dirs.len()
            )));
        };
        let regular = Arc::new(TrueTypeFace::load(regular_loc, family, false)?);

        let mut faces: Vec<Arc<TrueTypeFace>> = vec![regular.clone()];
        for variant in [FontVariant::Bold, FontVariant::Italic, FontVariant::BoldItalic] {
            let key = (variant.is_bold(), variant.is_italic());
            let face = match found.get(&key) {
                Some(loc) => Arc::new(TrueTypeFace::load(loc, family, variant.is_italic())?),
                None => {
                    log::warn!("Font {family} has no {variant:?} face; using the regular face");
                    regular.clone()
                }
            };
            faces.push(face);
        }
        let embedded: [Arc<TrueTypeFace>; 4] = [
            faces[0].clone(),
            faces[1].clone(),
            faces[2].clone(),
            faces[3].clone(),
        ];

        log::info!(
            "Loaded font family {family} in {:.1}ms ({} distinct faces)",
            t0.elapsed().as_secs_f64() * 1000.0,
            found.len(),
        );

        Ok(FontSet {
            family: family.to_string(),
            embedded: Some(embedded),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded.is_some()
    }

    fn face(&self, variant: FontVariant) -> Option<&TrueTypeFace> {
        self.embedded.as_ref().map(|faces| faces[variant.index()].as_ref())
    }

    fn char_width_1000(&self, ch: char, variant: FontVariant) -> f32 {
        match self.face(variant) {
            Some(face) => face.char_width_1000(ch),
            None => helvetica_width_1000(ch, variant.is_bold()),
        }
    }

    /// Register one variant with the PDF. Embedded faces are subset to `used_chars`; if
    /// embedding fails the variant degrades to the matching standard Helvetica font.
    pub(crate) fn register(
        &self,
        pdf: &mut Pdf,
        variant: FontVariant,
        pdf_name: String,
        alloc: &mut impl FnMut() -> Ref,
        used_chars: &BTreeSet<char>,
    ) -> FontEntry {
        let t0 = std::time::Instant::now();
        let font_ref = alloc();

        let char_to_gid = self
            .face(variant)
            .and_then(|face| embed_truetype(pdf, font_ref, face, used_chars, alloc));

        if char_to_gid.is_none() {
            if self.is_embedded() {
                log::warn!(
                    "Embedding {} {variant:?} failed — using {}",
                    self.family,
                    variant.builtin_name()
                );
            }
            pdf.type1_font(font_ref)
                .base_font(Name(variant.builtin_name().as_bytes()))
                .encoding_predefined(Name(b"WinAnsiEncoding"));
        }

        log::debug!(
            "register_font: {} {variant:?} as {pdf_name} → {:.1}ms",
            self.family,
            t0.elapsed().as_secs_f64() * 1000.0,
        );

        FontEntry {
            pdf_name,
            font_ref,
            char_to_gid,
        }
    }
}

impl TextMeasure for FontSet {
    fn measure(&self, text: &str, style: &Style) -> f32 {
        let variant = FontVariant::of(style);
        let w_1000: f32 = text
            .chars()
            .map(|ch| self.char_width_1000(ch, variant))
            .sum();
        w_1000 * style.size / 1000.0 / PT_PER_MM
    }
}

impl TrueTypeFace {
    fn load((path, face_index): &(PathBuf, u32), family: &str, italic: bool) -> Result<Self, Error> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        let face = Face::parse(&data, *face_index)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        let units_per_em = face.units_per_em() as f32;

        let mut widths_1000 = HashMap::new();
        for byte in 32u8..=255 {
            let ch = winansi_to_char(byte);
            if let Some(adv) = face.glyph_index(ch).and_then(|gid| face.glyph_hor_advance(gid)) {
                widths_1000.insert(ch, adv as f32 / units_per_em * 1000.0);
            }
        }

        let ps_name = postscript_name(&face).unwrap_or_else(|| family.replace(' ', ""));

        Ok(TrueTypeFace {
            ps_name,
            italic,
            data,
            face_index: *face_index,
            units_per_em,
            widths_1000,
        })
    }

    fn char_width_1000(&self, ch: char) -> f32 {
        if let Some(&w) = self.widths_1000.get(&ch) {
            return w;
        }
        Face::parse(&self.data, self.face_index)
            .ok()
            .and_then(|face| {
                face.glyph_index(ch)
                    .and_then(|gid| face.glyph_hor_advance(gid))
            })
            .map(|adv| adv as f32 / self.units_per_em * 1000.0)
            .unwrap_or(0.0)
    }
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    char_to_gid: Option<BTreeMap<char, u16>>,
}

impl FontEntry {
    /// Bytes for a `Tj` operand: 2-byte glyph IDs for embedded fonts, WinAnsi otherwise.
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// Font search path: `ANAMNESIS_FONTS` entries first, then `extra`, then the platform's
/// system font directories.
pub fn font_directories(extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("ANAMNESIS_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    dirs.extend(extra.iter().cloned());

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            let e = e.to_ascii_lowercase();
            e == "ttf" || e == "otf" || e == "ttc" || e == "otc"
        })
}

fn is_font_collection(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttc") || e.eq_ignore_ascii_case("otc"))
}

fn font_family_name(face: &Face) -> Option<String> {
    // Name ID 1 keeps "Noto Sans" and "Noto Sans Display" apart.
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

fn postscript_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && name.is_unicode())
        .find_map(|name| name.to_string())
}

/// Walk `dirs` and return the faces of `family`, keyed by (bold, italic). The first face
/// found for a style wins.
fn scan_family(family: &str, dirs: &[PathBuf]) -> HashMap<(bool, bool), (PathBuf, u32)> {
    let t0 = std::time::Instant::now();
    let wanted = family.to_lowercase();
    let mut found: HashMap<(bool, bool), (PathBuf, u32)> = HashMap::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files_scanned = 0u32;

    let mut stack: Vec<PathBuf> = dirs.to_vec();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            files_scanned += 1;
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            let face_count = if is_font_collection(&path) {
                ttf_parser::fonts_in_collection(&data).unwrap_or(1)
            } else {
                1
            };
            for face_idx in 0..face_count {
                let Ok(face) = Face::parse(&data, face_idx) else {
                    continue;
                };
                if font_family_name(&face).is_some_and(|f| f.to_lowercase() == wanted) {
                    found
                        .entry((face.is_bold(), face.is_italic()))
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }

    log::debug!(
        "Font scan for {family}: {:.1}ms, {} dirs, {files_scanned} files → {} faces",
        t0.elapsed().as_secs_f64() * 1000.0,
        visited.len(),
        found.len(),
    );

    found
}

/// Windows-1252 (WinAnsi) byte to Unicode char mapping.
/// Bytes 0x80-0x9F are remapped; all others map directly to their Unicode codepoint.
fn winansi_to_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        _ => byte as char,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi bytes, dropping characters the encoding cannot express.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
fn encode_as_gids(text: &str, char_to_gid: &BTreeMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.extend_from_slice(&gid.to_be_bytes());
    }
    out
}

/// Embed a TrueType/OpenType face as a Type0 font with Identity-H encoding, subset to
/// `used_chars`. Returns the char → new glyph id map used to encode text.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font: &TrueTypeFace,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<BTreeMap<char, u16>> {
    let face = Face::parse(&font.data, font.face_index).ok()?;
    let units = font.units_per_em;
    let to_1000 = |v: f32| v / units * 1000.0;

    let cap_height = face
        .capital_height()
        .map(|h| to_1000(h as f32))
        .unwrap_or(700.0);
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        to_1000(bb.x_min as f32),
        to_1000(bb.y_min as f32),
        to_1000(bb.x_max as f32),
        to_1000(bb.y_max as f32),
    );

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = BTreeMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| to_1000(adv as f32))
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(&font.data, font.face_index, &remapper)
        .unwrap_or_else(|e| {
            log::warn!("Font subsetting failed for {}: {e} — embedding full font", font.ps_name);
            font.data.clone()
        });

    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();

    let data_len = i32::try_from(subset_data.len()).ok()?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let mut flags = pdf_writer::types::FontFlags::NON_SYMBOLIC;
    if font.italic {
        flags |= pdf_writer::types::FontFlags::ITALIC;
    }
    pdf.font_descriptor(descriptor_ref)
        .name(Name(font.ps_name.as_bytes()))
        .flags(flags)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(to_1000(face.ascender() as f32))
        .descent(to_1000(face.descender() as f32))
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(font.ps_name.as_bytes()));
        cid.system_info(pdf_writer::types::SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{}-UTF16", font.ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &new_gid) in &char_to_gid {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(font.ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}
