use std::collections::HashSet;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::tags::strip_tags;

/// A question number (`D2.`, `Q12a`, `7`) followed by the question text.
static NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+\d+[a-zA-Z.]*|\d+)[.)]?\s*(.+)").unwrap());

static FILL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[|_]+").unwrap());

static SPACES_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

static DOTS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\.+").unwrap());

static OPTION_PREFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[(\[]?[a-zA-Z0-9]+[.)\]]\s*").unwrap());

static PUNCTUATION_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?:]+").unwrap());

static BLANKS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\s]{2,}").unwrap());

/// The text of a question line, once the tags are removed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionText {
    /// The leading question number, without trailing dots.
    pub number: Option<String>,
    /// The question itself, without the number.
    pub text: String,
    /// The label shown in the form.
    pub label: String,
}

impl QuestionText {
    pub fn parse(line: &str) -> QuestionText {
        let stripped = strip_tags(line);
        match NUMBER_REGEX.captures(&stripped) {
            Some(c) => {
                let number = DOTS_REGEX.replace_all(&c[1], ".");
                let number = number.trim_end_matches('.').to_string();
                let text = FILL_REGEX.replace_all(&c[2], "");
                let text = SPACES_REGEX.replace_all(text.trim(), " ").trim().to_string();
                QuestionText {
                    label: format!("{}. {}", number, text),
                    number: Some(number),
                    text,
                }
            }
            None => QuestionText {
                number: None,
                text: stripped.clone(),
                label: stripped,
            },
        }
    }
}

/// The label of an option line, without its enumerator (`a)`, `1.`, `(b)`) and
/// without the blanks left for open answers.
pub fn clean_option_label(line: &str) -> String {
    let s = OPTION_PREFIX_REGEX.replace(line, "");
    let s = PUNCTUATION_REGEX.replace_all(&s, "");
    let s = BLANKS_REGEX.replace_all(&s, "");
    s.trim().to_string()
}

/// Hands out the field names of the questions.
///
/// Demographic questions (`D3`) keep their number, `Q` numbers become `P` numbers
/// and everything else is numbered `P1`, `P2`... in order of appearance.
/// The names handed out are unique: a clash is resolved with a `__2`, `__3`...
/// suffix. Question names never contain `_`, so a suffixed name never collides
/// with the derived names (`P1_2`, `P1_group`...) of another question.
#[derive(Debug, Clone)]
pub struct NameAllocator {
    counter: u32,
    issued: HashSet<String>,
}

impl Default for NameAllocator {
    fn default() -> NameAllocator {
        NameAllocator::new()
    }
}

impl NameAllocator {
    pub fn new() -> NameAllocator {
        NameAllocator {
            counter: 1,
            issued: HashSet::new(),
        }
    }

    pub fn allocate(&mut self, number: Option<&str>) -> String {
        let base = match number {
            Some(n) if n.starts_with('D') => n.to_string(),
            Some(n) if n.len() > 1 && (n.starts_with('Q') || n.starts_with('q')) => {
                format!("P{}", &n[1..])
            }
            _ => self.next_counter(),
        };
        let base = base.trim_end_matches('.').to_string();
        self.reserve(base)
    }

    fn next_counter(&mut self) -> String {
        let name = format!("P{}", self.counter);
        self.counter += 1;
        name
    }

    fn reserve(&mut self, base: String) -> String {
        if self.issued.insert(base.clone()) {
            return base;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{}__{}", base, suffix);
            if self.issued.insert(candidate.clone()) {
                debug!("reserve: name {} already used, renamed to {}", base, candidate);
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_question() {
        let q = QuestionText::parse("1. Do you like tea? [single]");
        assert_eq!(q.number.as_deref(), Some("1"));
        assert_eq!(q.text, "Do you like tea?");
        assert_eq!(q.label, "1. Do you like tea?");
    }

    #[test]
    fn demographic_question() {
        let q = QuestionText::parse("D2. Age [numeric]");
        assert_eq!(q.number.as_deref(), Some("D2"));
        assert_eq!(q.label, "D2. Age");
    }

    #[test]
    fn unnumbered_question() {
        let q = QuestionText::parse("How old are you? [numeric]");
        assert_eq!(q.number, None);
        assert_eq!(q.label, "How old are you?");
    }

    #[test]
    fn question_text_cleanup() {
        let q = QuestionText::parse("Q3) Name the |brand| ____   you use [text]");
        assert_eq!(q.number.as_deref(), Some("Q3"));
        assert_eq!(q.label, "Q3. Name the brand you use");
        let q = QuestionText::parse("Q4a.. Why? [text]");
        assert_eq!(q.number.as_deref(), Some("Q4a"));
        assert_eq!(q.label, "Q4a. Why?");
    }

    #[test]
    fn option_labels() {
        assert_eq!(clean_option_label("a) Yes"), "Yes");
        assert_eq!(clean_option_label("(2) No"), "No");
        assert_eq!(clean_option_label("[c] Maybe?"), "Maybe");
        assert_eq!(clean_option_label("Other, specify: ________"), "Other, specify");
        assert_eq!(clean_option_label("Tea"), "Tea");
    }

    #[test]
    fn allocation() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate(Some("1")), "P1");
        assert_eq!(names.allocate(Some("D2")), "D2");
        assert_eq!(names.allocate(Some("Q7b")), "P7b");
        assert_eq!(names.allocate(None), "P2");
        assert_eq!(names.allocate(Some("A3")), "P3");
    }

    #[test]
    fn allocation_is_unique() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate(Some("Q2")), "P2");
        assert_eq!(names.allocate(None), "P1");
        assert_eq!(names.allocate(None), "P2__2");
        assert_eq!(names.allocate(Some("D1")), "D1");
        assert_eq!(names.allocate(Some("D1")), "D1__2");
        assert_eq!(names.allocate(Some("D1")), "D1__3");
    }
}
