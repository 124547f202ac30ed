// ********* Question data structures ***********

use std::collections::HashSet;
use std::fmt::Display;

use serde::{Serialize, Serializer};
use snafu::Snafu;

/// Whether a matrix accepts one or several columns per row.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MatrixMode {
    Single,
    Multiple,
}

/// Bounds and end labels of a `[scale A(low)-B(high)]` annotation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScaleSpec {
    pub start: u32,
    pub end: u32,
    pub min_label: Option<String>,
    pub max_label: Option<String>,
}

/// The kind of question introduced by a line, as resolved from its tags.
///
/// `None` is not an error: it means the line does not introduce a question
/// (an option, a matrix row, free text...).
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum QuestionType {
    Note,
    Single,
    Multiple,
    Numeric,
    Text,
    Scale(ScaleSpec),
    Matrix { mode: MatrixMode, columns: u32 },
    Ranking { count: u32 },
    /// Questions that the author flagged to be handled by hand.
    Other,
    None,
}

impl QuestionType {
    pub fn is_question(&self) -> bool {
        !matches!(self, QuestionType::None)
    }
}

// ******** Output data structures *********

/// The `type` column of a survey row.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum FieldKind {
    Start,
    End,
    Geopoint,
    Note,
    Text,
    Integer,
    SelectOne(String),
    SelectMultiple(String),
    BeginGroup,
    EndGroup,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Start => write!(f, "start"),
            FieldKind::End => write!(f, "end"),
            FieldKind::Geopoint => write!(f, "geopoint"),
            FieldKind::Note => write!(f, "note"),
            FieldKind::Text => write!(f, "text"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::SelectOne(list_name) => write!(f, "select_one {}", list_name),
            FieldKind::SelectMultiple(list_name) => write!(f, "select_multiple {}", list_name),
            FieldKind::BeginGroup => write!(f, "begin_group"),
            FieldKind::EndGroup => write!(f, "end_group"),
        }
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the survey table.
///
/// The order of the rows is the display order of the form.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct FieldRow {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_required"
    )]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice_filter: Option<String>,
}

fn serialize_required<S: Serializer>(required: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
    match required {
        Some(r) => serializer.serialize_str(required_cell(*r)),
        None => serializer.serialize_none(),
    }
}

/// The spreadsheet rendering of the `required` column.
pub fn required_cell(required: bool) -> &'static str {
    if required {
        "yes"
    } else {
        "no"
    }
}

impl FieldRow {
    pub fn new(kind: FieldKind, name: impl Into<String>) -> FieldRow {
        FieldRow {
            kind,
            name: name.into(),
            label: None,
            required: None,
            appearance: None,
            parameters: None,
            relevant: None,
            hint: None,
            choice_filter: None,
        }
    }

    pub fn label(self, label: impl Into<String>) -> FieldRow {
        FieldRow {
            label: Some(label.into()),
            ..self
        }
    }

    pub fn required(self, required: bool) -> FieldRow {
        FieldRow {
            required: Some(required),
            ..self
        }
    }

    pub fn appearance(self, appearance: impl Into<String>) -> FieldRow {
        FieldRow {
            appearance: Some(appearance.into()),
            ..self
        }
    }

    pub fn parameters(self, parameters: Option<String>) -> FieldRow {
        FieldRow { parameters, ..self }
    }

    pub fn relevant(self, relevant: impl Into<String>) -> FieldRow {
        FieldRow {
            relevant: Some(relevant.into()),
            ..self
        }
    }

    pub fn hint(self, hint: Option<String>) -> FieldRow {
        FieldRow { hint, ..self }
    }

    pub fn choice_filter(self, choice_filter: Option<String>) -> FieldRow {
        FieldRow {
            choice_filter,
            ..self
        }
    }
}

/// One selectable option of a named list.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ChoiceEntry {
    pub list_name: String,
    pub name: String,
    pub label: String,
}

/// The single row of the settings table.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Settings {
    pub style: String,
}

/// The three tables of a compiled form.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct SurveyForm {
    pub survey: Vec<FieldRow>,
    pub choices: Vec<ChoiceEntry>,
    #[serde(serialize_with = "serialize_single_row")]
    pub settings: Settings,
}

fn serialize_single_row<S: Serializer>(settings: &Settings, serializer: S) -> Result<S::Ok, S::Error> {
    std::slice::from_ref(settings).serialize(serializer)
}

impl SurveyForm {
    /// The choices registered under the given list, in emission order.
    pub fn choices_of<'a>(&'a self, list_name: &'a str) -> impl Iterator<Item = &'a ChoiceEntry> {
        self.choices.iter().filter(move |c| c.list_name == list_name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldRow> {
        self.survey.iter().find(|f| f.name == name)
    }
}

/// The result of a successful compilation pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CompileOutput {
    pub form: SurveyForm,
    /// Labels of the questions tagged `[other]`, which are left out of the form.
    pub skipped: Vec<String>,
}

// ********* Configuration **********

/// Fixed texts that appear in every compiled form.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FixedLabels {
    pub enumerator: String,
    pub full_name: String,
    pub phone_number: String,
    /// Labels of the ranking positions, starting at the first choice.
    pub ranking_positions: Vec<String>,
    /// Label used for the positions beyond `ranking_positions`.
    pub ranking_overflow: String,
    pub style: String,
}

impl Default for FixedLabels {
    fn default() -> FixedLabels {
        let positions = [
            "First", "Second", "Third", "Fourth", "Fifth", "Sixth", "Seventh", "Eighth", "Ninth",
            "Tenth", "Eleventh", "Twelfth", "Thirteenth", "Fourteenth", "Fifteenth", "Sixteenth",
            "Seventeenth", "Eighteenth", "Nineteenth", "Twentieth",
        ];
        FixedLabels {
            enumerator: "Enumerator".to_string(),
            full_name: "Full name:".to_string(),
            phone_number: "Phone number:".to_string(),
            ranking_positions: positions.iter().map(|p| format!("{} choice", p)).collect(),
            ranking_overflow: "Extra".to_string(),
            style: "theme-grid no-text-transform".to_string(),
        }
    }
}

impl FixedLabels {
    /// The label of the ranking position `position` (1-based).
    pub fn ranking_position(&self, position: usize) -> &str {
        position
            .checked_sub(1)
            .and_then(|idx| self.ranking_positions.get(idx))
            .unwrap_or(&self.ranking_overflow)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CompileOptions {
    /// Face to face collection: adds a GPS field at the top of the form.
    pub collect_geolocation: bool,
    /// Visible labels of the questions that should not be compiled.
    pub excluded_labels: HashSet<String>,
    /// Fails on tagged lines whose tags are not understood, instead of skipping them.
    pub strict: bool,
    pub labels: FixedLabels,
}

impl CompileOptions {
    pub fn is_excluded(&self, label: &str) -> bool {
        !self.excluded_labels.is_empty() && self.excluded_labels.contains(label.trim())
    }
}

// ********* Errors **********

/// Errors reported by a roster provider.
pub type RosterError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a compilation pass. No partial form is returned.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
    #[snafu(display("Could not load the enumerator roster: {source}"))]
    RosterUnavailable { source: RosterError },
    #[snafu(display(
        "Line {line}: question {name} declares {declared} lines but only {available} remain"
    ))]
    StructuralUnderrun {
        line: usize,
        name: String,
        declared: u32,
        available: usize,
    },
    #[snafu(display("Line {line}: question {name} has no options"))]
    EmptyChoiceList { line: usize, name: String },
    #[snafu(display(
        "Line {line}: question {name} asks for {requested} entries but at most {limit} are possible"
    ))]
    OversizedQuestion {
        line: usize,
        name: String,
        requested: usize,
        limit: usize,
    },
    #[snafu(display("Line {line}: could not understand the annotations in {content:?}"))]
    UnrecognizedBlockingLine { line: usize, content: String },
}

pub type CompileResult<T> = Result<T, CompileError>;
