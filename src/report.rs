use crate::model::{ClassifiedLine, LineRole};

/// Section titles emitted by the anamnesis summary. A line containing any of them is a
/// section header, even if it also carries a colon.
pub const SECTION_KEYWORDS: [&str; 3] = ["IDENTITAS PASIEN", "ANAMNESIS", "RIWAYAT MEDIS"];

const DEFAULT_PATIENT_NAME: &str = "Pasien";

/// Assign a role to one summary line. First match wins: `===` prefix, `---` prefix, section
/// keyword, colon, blank, paragraph.
pub fn classify(line: &str) -> ClassifiedLine {
    let role = if line.starts_with("===") {
        LineRole::MajorSeparator
    } else if line.starts_with("---") {
        LineRole::MinorSeparator
    } else if SECTION_KEYWORDS.iter().any(|k| line.contains(k)) {
        LineRole::SectionHeader
    } else if line.contains(':') {
        LineRole::FieldValue
    } else if line.trim().is_empty() {
        LineRole::Blank
    } else {
        LineRole::Paragraph
    };

    let (field, value) = match role {
        LineRole::FieldValue => match line.split_once(':') {
            Some((field, value)) => (
                Some(field.trim().to_string()),
                Some(value.trim().to_string()),
            ),
            None => (None, None),
        },
        _ => (None, None),
    };

    ClassifiedLine {
        role,
        raw: line.to_string(),
        field,
        value,
    }
}

/// Split a summary into lines (`\n`, with a trailing `\r` dropped) and classify each one.
pub fn classify_report(text: &str) -> Vec<ClassifiedLine> {
    text.split('\n')
        .map(|line| classify(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// Value of the first `Nama` row, or `"Pasien"` when the summary has none.
///
/// Any spacing around the colon is accepted: the backend's padded `Nama          : Budi` rows as
/// well as `Nama: Budi` and `Nama :Budi`.
pub fn extract_patient_name(summary: &str) -> String {
    classify_report(summary)
        .into_iter()
        .filter(|line| line.role == LineRole::FieldValue)
        .find(|line| line.field.as_deref() == Some("Nama"))
        .and_then(|line| line.value)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_PATIENT_NAME.to_string())
}
