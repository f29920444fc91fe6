mod common;

use anamnesis_pdf::{FontSet, PT_PER_MM, Style, TextMeasure, wrap};

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deterministic mix of short and long words with irregular whitespace.
fn corpus() -> Vec<String> {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzWMil.,";
    const GAPS: [&str; 4] = [" ", "  ", "\t", " \t "];

    let mut state: u32 = 0x2545_f491;
    let mut next = move |bound: u32| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state % bound
    };

    let mut texts = vec![
        String::new(),
        "   ".to_string(),
        "Pneumonoultramicroscopicsilicovolcanoconiosis".to_string(),
        "nyeri kepala sejak tiga hari yang lalu disertai mual".to_string(),
    ];
    for _ in 0..40 {
        let words = next(60);
        let mut text = String::new();
        if next(3) == 0 {
            text.push_str("  ");
        }
        for i in 0..words {
            if i > 0 {
                text.push_str(GAPS[next(GAPS.len() as u32) as usize]);
            }
            for _ in 0..=next(14) {
                text.push(ALPHABET[next(ALPHABET.len() as u32) as usize] as char);
            }
        }
        texts.push(text);
    }
    texts
}

#[test]
fn wrapped_lines_fit_and_keep_every_word() {
    let mono = common::mono();
    let helvetica = FontSet::builtin();
    let measures: [&dyn TextMeasure; 2] = [&mono, &helvetica];

    for measure in measures {
        for width in [20.0, 45.0, 120.0, 180.0] {
            for text in corpus() {
                let lines = wrap(&text, width, &Style::BODY, measure);
                for line in &lines {
                    assert!(!line.is_empty(), "empty line for {text:?}");
                    let w = measure.measure(line, &Style::BODY);
                    assert!(
                        w <= width + 1e-3 || !line.contains(' '),
                        "{line:?} is {w}mm wide, limit {width}mm"
                    );
                }
                assert_eq!(normalize(&lines.join(" ")), normalize(&text));
                assert_eq!(lines.is_empty(), text.trim().is_empty());
            }
        }
    }
}

#[test]
fn overlong_word_occupies_its_own_line() {
    let mono = common::mono();
    let lines = wrap("ab supercalifragilistic cd", 20.0, &Style::BODY, &mono);
    assert_eq!(lines, ["ab", "supercalifragilistic", "cd"]);
}

#[test]
fn greedy_fill_takes_as_many_words_as_fit() {
    let mono = common::mono();
    let width = mono.measure("aaa bbb", &Style::BODY) + 0.01;
    let lines = wrap("aaa bbb ccc ddd e", width, &Style::BODY, &mono);
    assert_eq!(lines, ["aaa bbb", "ccc ddd", "e"]);
}

#[test]
fn blank_input_yields_no_lines() {
    let mono = common::mono();
    assert!(wrap("", 180.0, &Style::BODY, &mono).is_empty());
    assert!(wrap(" \t  ", 180.0, &Style::BODY, &mono).is_empty());
}

#[test]
fn wrapping_is_repeatable() {
    let fonts = FontSet::builtin();
    let text = "Keluhan utama demam tinggi sejak tiga hari disertai batuk berdahak dan pilek";
    let a = wrap(text, 120.0, &Style::BODY, &fonts);
    let b = wrap(text, 120.0, &Style::BODY, &fonts);
    assert_eq!(a, b);
    assert!(a.len() > 1);
}

#[test]
fn builtin_metrics_follow_helvetica_widths() {
    let fonts = FontSet::builtin();
    // H e l l o = 722 + 556 + 222 + 222 + 556
    let expected = 2278.0 * 10.0 / 1000.0 / PT_PER_MM;
    let got = fonts.measure("Hello", &Style::BODY);
    assert!((got - expected).abs() < 1e-4, "{got} vs {expected}");

    assert!(
        fonts.measure("Keluhan", &Style::FIELD_LABEL) > fonts.measure("Keluhan", &Style::BODY)
    );
}

#[test]
fn monospace_measure_scales_with_size() {
    let mono = common::mono();
    let ten = mono.measure("abcd", &Style::BODY);
    let eighteen = mono.measure("abcd", &Style::TITLE);
    assert!((ten - 4.0 * 0.6 * 10.0 / PT_PER_MM).abs() < 1e-4);
    assert!((eighteen / ten - 1.8).abs() < 1e-4);
}
