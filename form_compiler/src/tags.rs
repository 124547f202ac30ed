//! Extraction and classification of the bracketed annotations of a line.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{MatrixMode, QuestionType, ScaleSpec};

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]").unwrap());

/// A tag together with the whitespace around it.
static STRIP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\[.*?\]\s*").unwrap());

static MATRIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^matrix\s+(single|multiple)\s+(\d+)$").unwrap());

static RANKING_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^ranking\s+(\d+)$").unwrap());

static SCALE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^scale\s*(\d+)(?:\((.*?)\))?\s*-\s*(\d+)(?:\((.*?)\))?$").unwrap()
});

static HINT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)^hint:\s*(.*)$").unwrap());

const NOTE_PREFIX: &str = "[note]";

/// The annotations of one line, once interpreted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TagSet {
    pub question_type: QuestionType,
    pub hint: Option<String>,
    pub randomize: bool,
    /// The line carried at least one bracketed span, understood or not.
    pub has_tags: bool,
}

/// Returns the content of every well-formed `[...]` span, in order.
pub fn extract_tags(line: &str) -> Vec<&str> {
    TAG_REGEX
        .captures_iter(line)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Interprets the tags of a line.
///
/// Tags are read in order and later tags override earlier ones: `[single] [multiple]`
/// is a multiple choice question. Unknown tags are ignored.
pub fn classify_tags(tags: &[&str]) -> TagSet {
    let mut res = TagSet {
        question_type: QuestionType::None,
        hint: None,
        randomize: false,
        has_tags: !tags.is_empty(),
    };
    for tag in tags {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("random") {
            res.randomize = true;
        } else if let Some(c) = HINT_REGEX.captures(tag) {
            res.hint = c.get(1).map(|m| m.as_str().trim().to_string());
        } else if let Some(qt) = classify_type(tag) {
            res.question_type = qt;
        }
    }
    res
}

pub fn classify_line(line: &str) -> TagSet {
    classify_tags(&extract_tags(line))
}

/// True if the line introduces a question. This is the stop condition when
/// collecting options, matrix rows and ranking items.
pub fn starts_question(line: &str) -> bool {
    classify_line(line).question_type.is_question()
}

fn classify_type(tag: &str) -> Option<QuestionType> {
    if let Some(c) = MATRIX_REGEX.captures(tag) {
        let mode = if c[1].eq_ignore_ascii_case("single") {
            MatrixMode::Single
        } else {
            MatrixMode::Multiple
        };
        let columns = c[2].parse::<u32>().ok()?;
        return Some(QuestionType::Matrix { mode, columns });
    }
    if let Some(c) = RANKING_REGEX.captures(tag) {
        let count = c[1].parse::<u32>().ok()?;
        return Some(QuestionType::Ranking { count });
    }
    if let Some(c) = SCALE_REGEX.captures(tag) {
        let label = |idx: usize| {
            c.get(idx)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };
        return Some(QuestionType::Scale(ScaleSpec {
            start: c[1].parse::<u32>().ok()?,
            end: c[3].parse::<u32>().ok()?,
            min_label: label(2),
            max_label: label(4),
        }));
    }
    match tag.to_lowercase().as_str() {
        "single" => Some(QuestionType::Single),
        "multiple" => Some(QuestionType::Multiple),
        "text" | "string" => Some(QuestionType::Text),
        "numeric" => Some(QuestionType::Numeric),
        "note" => Some(QuestionType::Note),
        "other" => Some(QuestionType::Other),
        _ => None,
    }
}

/// Removes all the tags of a line, along with the whitespace that surrounds them.
pub fn strip_tags(line: &str) -> String {
    STRIP_REGEX.replace_all(line, "").trim().to_string()
}

/// The `[note] text` shorthand. Returns the note text.
pub fn note_shorthand(line: &str) -> Option<&str> {
    let prefix = line.get(..NOTE_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(NOTE_PREFIX) {
        line.get(NOTE_PREFIX.len()..).map(str::trim)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_order() {
        assert_eq!(
            extract_tags("Q1. How [single] [Random] [hint: pick one]"),
            vec!["single", "Random", "hint: pick one"]
        );
        assert!(extract_tags("").is_empty());
        assert_eq!(extract_tags("broken [single and [text]"), vec!["single and [text"]);
        assert!(extract_tags("no closing [single").is_empty());
    }

    #[test]
    fn simple_types() {
        assert_eq!(classify_line("A [Single]").question_type, QuestionType::Single);
        assert_eq!(classify_line("A [string]").question_type, QuestionType::Text);
        assert_eq!(classify_line("A [NUMERIC]").question_type, QuestionType::Numeric);
        assert_eq!(classify_line("A [other]").question_type, QuestionType::Other);
        assert_eq!(classify_line("A [note]").question_type, QuestionType::Note);
        assert_eq!(classify_line("Yes").question_type, QuestionType::None);
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let ts = classify_line("Some option [specify]");
        assert_eq!(ts.question_type, QuestionType::None);
        assert!(ts.has_tags);
        let ts = classify_line("Q [single] [whatever]");
        assert_eq!(ts.question_type, QuestionType::Single);
    }

    #[test]
    fn last_type_wins() {
        assert_eq!(
            classify_line("Q [single] [multiple]").question_type,
            QuestionType::Multiple
        );
        assert_eq!(
            classify_line("Q [ranking 3] [numeric]").question_type,
            QuestionType::Numeric
        );
    }

    #[test]
    fn parameterized_types() {
        assert_eq!(
            classify_line("Q [matrix multiple 4]").question_type,
            QuestionType::Matrix {
                mode: MatrixMode::Multiple,
                columns: 4
            }
        );
        assert_eq!(
            classify_line("Q [Ranking 3]").question_type,
            QuestionType::Ranking { count: 3 }
        );
        assert_eq!(
            classify_line("Q [scale 1(Not at all)-5(Very much)]").question_type,
            QuestionType::Scale(ScaleSpec {
                start: 1,
                end: 5,
                min_label: Some("Not at all".to_string()),
                max_label: Some("Very much".to_string()),
            })
        );
        assert_eq!(
            classify_line("Q [scale 0 - 10]").question_type,
            QuestionType::Scale(ScaleSpec {
                start: 0,
                end: 10,
                min_label: None,
                max_label: None,
            })
        );
        // Missing count
        assert_eq!(classify_line("Q [ranking]").question_type, QuestionType::None);
    }

    #[test]
    fn hint_and_random() {
        let ts = classify_line("Q [single] [hint:  Select one  ] [random]");
        assert_eq!(ts.hint, Some("Select one".to_string()));
        assert!(ts.randomize);
        let ts = classify_line("Q [hint: first] [hint: second]");
        assert_eq!(ts.hint, Some("second".to_string()));
        assert_eq!(ts.question_type, QuestionType::None);
    }

    #[test]
    fn stripping() {
        assert_eq!(strip_tags("1. Tea? [single] [random]"), "1. Tea?");
        assert_eq!(strip_tags("[note] Hello"), "Hello");
        assert_eq!(strip_tags("broken ] [text"), "broken ] [text");
    }

    #[test]
    fn shorthand_note() {
        assert_eq!(note_shorthand("[NOTE] Welcome"), Some("Welcome"));
        assert_eq!(note_shorthand("Welcome [note]"), None);
        assert_eq!(note_shorthand("[no"), None);
        assert_eq!(note_shorthand("ëëëëëëë"), None);
    }
}
