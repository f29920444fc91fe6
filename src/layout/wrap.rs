use crate::fonts::TextMeasure;
use crate::model::Style;

/// Greedy word wrap of `text` into lines no wider than `max_width` (millimetres).
///
/// Words are the whitespace-separated tokens of `text`; consecutive whitespace collapses to a
/// single space. A word that is wider than `max_width` on its own occupies a line by itself and
/// is never broken. Blank input produces no lines.
pub fn wrap(text: &str, max_width: f32, style: &Style, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_w: f32 = 0.0;
    let space_w = measure.measure(" ", style);

    for word in text.split_whitespace() {
        let ww = measure.measure(word, style);

        if !current.is_empty() && current_w + space_w + ww > max_width {
            lines.push(std::mem::take(&mut current));
            current_w = 0.0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_w += space_w;
        }
        current.push_str(word);
        current_w += ww;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
