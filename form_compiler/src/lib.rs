/*!
Compiles a survey written as annotated text into the three tables of an
XLSForm: the survey fields, the choice lists and the settings.

Questions are introduced by a line carrying a bracketed annotation, such as
`1. Do you like tea? [single]`. The lines that follow, up to the next
question, are its options. See the [manual] for the full list of annotations.

```
use form_compiler::roster::{RosterEntry, StaticRoster};
use form_compiler::{compile_document, normalize_lines, CompileOptions};

let lines = normalize_lines("1. Do you like tea? [single]\nYes\nNo\n");
let roster = StaticRoster::new(vec![RosterEntry::new("1", "Anna")]);
let res = compile_document(&lines, &roster, &CompileOptions::default())?;
assert_eq!(res.form.choices_of("P1_list").count(), 2);
# Ok::<(), form_compiler::CompileError>(())
```
*/

mod config;

pub mod builder;
pub mod manual;
pub mod naming;
pub mod roster;
pub mod tags;

use log::{debug, info, warn};
use snafu::{ensure, ResultExt};

pub use crate::config::*;

use crate::builder::FormBuilder;
use crate::naming::{clean_option_label, NameAllocator, QuestionText};
use crate::roster::RosterProvider;
use crate::tags::{classify_line, note_shorthand, starts_question, strip_tags, TagSet};

/// The widest likert scale accepted, `[scale 0-100]`.
pub const MAX_SCALE_POINTS: usize = 101;

/// Splits a document into trimmed, non-empty lines.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compiles the lines of a document into a form.
///
/// Arguments:
/// * `lines` the normalized lines of the document (see [normalize_lines])
/// * `roster` the source of the enumerators, queried once before compiling
/// * `options` the collection mode and the questions to leave out
pub fn compile_document(
    lines: &[String],
    roster: &dyn RosterProvider,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    info!(
        "compile_document: Processing {:?} lines, geolocation: {:?}, excluded: {:?}",
        lines.len(),
        options.collect_geolocation,
        options.excluded_labels.len()
    );

    let enumerators = roster.fetch_enumerators().context(RosterUnavailableSnafu {})?;
    if enumerators.is_empty() {
        return Err(CompileError::RosterUnavailable {
            source: "the roster provider returned no enumerator".into(),
        });
    }
    debug!("compile_document: {:?} enumerators", enumerators.len());

    let mut builder = FormBuilder::new(&options.labels, options.collect_geolocation, &enumerators);
    let mut state = CompileState::default();
    let mut cursor = 0;
    while cursor < lines.len() {
        cursor = compile_line(lines, cursor, options, &mut state, &mut builder)?;
    }

    let form = builder.finish();
    info!(
        "compile_document: {:?} fields, {:?} choices, {:?} questions skipped",
        form.survey.len(),
        form.choices.len(),
        state.skipped.len()
    );
    Ok(CompileOutput {
        form,
        skipped: state.skipped,
    })
}

// **** Private structures ****

/// The counters carried from one question to the next.
#[derive(Debug, Default)]
struct CompileState {
    names: NameAllocator,
    note_index: u32,
    skipped: Vec<String>,
}

impl CompileState {
    fn next_note_name(&mut self) -> String {
        self.note_index += 1;
        format!("note{}", self.note_index)
    }

    /// Names a question, unless it has been excluded by the caller.
    fn open_question(
        &mut self,
        line: &str,
        lineno: usize,
        tags: &TagSet,
        options: &CompileOptions,
    ) -> Option<Question> {
        let text = QuestionText::parse(line);
        // The name is allocated even for excluded questions, so that the
        // numbering of the other questions does not depend on the exclusions.
        let name = self.names.allocate(text.number.as_deref());
        if options.is_excluded(&text.label) {
            warn!(
                "open_question: line {}: question {:?} excluded",
                lineno, text.label
            );
            return None;
        }
        debug!("open_question: line {}: {} {:?}", lineno, name, text.label);
        Some(Question {
            name,
            label: text.label,
            hint: tags.hint.clone(),
            randomize: tags.randomize,
            lineno,
        })
    }
}

/// A question being compiled.
#[derive(Debug, Clone)]
struct Question {
    name: String,
    label: String,
    hint: Option<String>,
    randomize: bool,
    // 1-based position of the question line in the document
    lineno: usize,
}

impl Question {
    fn parameters(&self) -> Option<String> {
        self.randomize.then(|| "randomize=true".to_string())
    }

    /// The main field of the question.
    fn field(&self, kind: FieldKind) -> FieldRow {
        FieldRow::new(kind, self.name.clone())
            .label(self.label.clone())
            .required(true)
            .parameters(self.parameters())
            .hint(self.hint.clone())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum SelectMode {
    Single,
    Multiple,
}

impl SelectMode {
    fn field_kind(self, list_name: &str) -> FieldKind {
        match self {
            SelectMode::Single => FieldKind::SelectOne(list_name.to_string()),
            SelectMode::Multiple => FieldKind::SelectMultiple(list_name.to_string()),
        }
    }
}

impl From<MatrixMode> for SelectMode {
    fn from(mode: MatrixMode) -> SelectMode {
        match mode {
            MatrixMode::Single => SelectMode::Single,
            MatrixMode::Multiple => SelectMode::Multiple,
        }
    }
}

/// Compiles the question starting at `cursor`, and returns the position of the
/// first line after it.
fn compile_line(
    lines: &[String],
    cursor: usize,
    options: &CompileOptions,
    state: &mut CompileState,
    builder: &mut FormBuilder,
) -> CompileResult<usize> {
    let line = lines[cursor].as_str();
    let lineno = cursor + 1;
    let next = cursor + 1;

    if let Some(text) = note_shorthand(line) {
        emit_note(state, builder, text);
        return Ok(next);
    }

    let tags = classify_line(line);
    match &tags.question_type {
        QuestionType::None => {
            ensure!(
                !(options.strict && tags.has_tags),
                UnrecognizedBlockingLineSnafu {
                    line: lineno,
                    content: line.to_string(),
                }
            );
            debug!("compile_line: line {}: skipping {:?}", lineno, line);
            Ok(next)
        }
        QuestionType::Other => {
            let text = QuestionText::parse(line);
            warn!(
                "compile_line: line {}: question {:?} left for manual handling",
                lineno, text.label
            );
            state.skipped.push(text.label);
            Ok(next)
        }
        QuestionType::Note => {
            emit_note(state, builder, &strip_tags(line));
            Ok(next)
        }
        QuestionType::Single => match state.open_question(line, lineno, &tags, options) {
            Some(q) => emit_select(lines, cursor, &q, SelectMode::Single, builder),
            None => Ok(skip_excluded(lines, cursor, &tags.question_type)),
        },
        QuestionType::Multiple => match state.open_question(line, lineno, &tags, options) {
            Some(q) => emit_select(lines, cursor, &q, SelectMode::Multiple, builder),
            None => Ok(skip_excluded(lines, cursor, &tags.question_type)),
        },
        QuestionType::Numeric => {
            if let Some(q) = state.open_question(line, lineno, &tags, options) {
                builder.add_field(q.field(FieldKind::Integer));
            }
            Ok(next)
        }
        QuestionType::Text => {
            if let Some(q) = state.open_question(line, lineno, &tags, options) {
                builder.add_field(q.field(FieldKind::Text));
            }
            Ok(next)
        }
        QuestionType::Scale(scale) => {
            if let Some(q) = state.open_question(line, lineno, &tags, options) {
                emit_scale(&q, scale, builder)?;
            }
            Ok(next)
        }
        QuestionType::Matrix { mode, columns } => {
            match state.open_question(line, lineno, &tags, options) {
                Some(q) => emit_matrix(lines, cursor, &q, (*mode).into(), *columns, builder),
                None => Ok(skip_excluded(lines, cursor, &tags.question_type)),
            }
        }
        QuestionType::Ranking { count } => match state.open_question(line, lineno, &tags, options) {
            Some(q) => emit_ranking(lines, cursor, &q, *count, builder),
            None => Ok(skip_excluded(lines, cursor, &tags.question_type)),
        },
    }
}

/// The position after the lines an excluded question would have consumed. Its options,
/// matrix headers and rows are dropped with it.
fn skip_excluded(lines: &[String], cursor: usize, question_type: &QuestionType) -> usize {
    match question_type {
        QuestionType::Single | QuestionType::Multiple | QuestionType::Ranking { .. } => {
            collect_until_question(lines, cursor + 1)
        }
        QuestionType::Matrix { columns, .. } => {
            // Nothing is emitted, so a short document is not an error here.
            let header_end = (cursor + 1 + *columns as usize).min(lines.len());
            collect_until_question(lines, header_end)
        }
        _ => cursor + 1,
    }
}

/// The end (exclusive) of the lines following `start` that do not introduce a question.
fn collect_until_question(lines: &[String], start: usize) -> usize {
    let start = start.min(lines.len());
    lines[start..]
        .iter()
        .position(|l| starts_question(l))
        .map_or(lines.len(), |p| start + p)
}

fn emit_note(state: &mut CompileState, builder: &mut FormBuilder, text: &str) {
    let name = state.next_note_name();
    builder.add_field(FieldRow::new(FieldKind::Note, name).label(text));
}

fn emit_select(
    lines: &[String],
    cursor: usize,
    question: &Question,
    mode: SelectMode,
    builder: &mut FormBuilder,
) -> CompileResult<usize> {
    let list_name = format!("{}_list", question.name);
    let end = collect_until_question(lines, cursor + 1);
    let options = &lines[cursor + 1..end];
    ensure!(
        !options.is_empty(),
        EmptyChoiceListSnafu {
            line: question.lineno,
            name: question.name.clone(),
        }
    );

    builder.add_field(question.field(mode.field_kind(&list_name)));
    for (idx, option) in options.iter().enumerate() {
        let label = clean_option_label(option);
        let code = match mode {
            SelectMode::Single => format!("{}", idx + 1),
            SelectMode::Multiple => format!("_{}", idx + 1),
        };
        // A blank in the option asks for an open answer.
        if option.contains('_') {
            let relevant = match mode {
                SelectMode::Single => format!("${{{}}} = '{}'", question.name, code),
                SelectMode::Multiple => format!("selected(${{{}}}, '{}')", question.name, code),
            };
            builder.add_field(
                FieldRow::new(FieldKind::Text, format!("{}_{}", question.name, idx + 1))
                    .label(label.clone())
                    .relevant(relevant)
                    .required(true),
            );
        }
        builder.add_choice(&list_name, code, label);
    }
    debug!(
        "emit_select: {}: {:?} options",
        question.name,
        options.len()
    );
    Ok(end)
}

fn emit_scale(question: &Question, scale: &ScaleSpec, builder: &mut FormBuilder) -> CompileResult<()> {
    ensure!(
        scale.start <= scale.end,
        EmptyChoiceListSnafu {
            line: question.lineno,
            name: question.name.clone(),
        }
    );
    let points = (scale.end - scale.start) as usize + 1;
    ensure!(
        points <= MAX_SCALE_POINTS,
        OversizedQuestionSnafu {
            line: question.lineno,
            name: question.name.clone(),
            requested: points,
            limit: MAX_SCALE_POINTS,
        }
    );
    let list_name = format!("scale_{}_{}", scale.start, scale.end);
    builder.add_field(
        question
            .field(FieldKind::SelectOne(list_name.clone()))
            .appearance("likert"),
    );

    if builder.has_list(&list_name) {
        debug!("emit_scale: {}: reusing {}", question.name, list_name);
        return Ok(());
    }
    for j in scale.start..=scale.end {
        let label = match (&scale.min_label, &scale.max_label) {
            (Some(min_label), _) if j == scale.start => format!("{} - {}", j, min_label),
            (_, Some(max_label)) if j == scale.end => format!("{} - {}", j, max_label),
            _ => j.to_string(),
        };
        builder.add_choice(&list_name, j.to_string(), label);
    }
    Ok(())
}

fn emit_matrix(
    lines: &[String],
    cursor: usize,
    question: &Question,
    mode: SelectMode,
    columns: u32,
    builder: &mut FormBuilder,
) -> CompileResult<usize> {
    let list_name = format!("{}_matrix", question.name);
    let header_start = cursor + 1;
    let header_end = header_start + columns as usize;
    ensure!(
        header_end <= lines.len(),
        StructuralUnderrunSnafu {
            line: question.lineno,
            name: question.name.clone(),
            declared: columns,
            available: lines.len() - header_start,
        }
    );
    ensure!(
        columns > 0,
        EmptyChoiceListSnafu {
            line: question.lineno,
            name: question.name.clone(),
        }
    );
    let headers = &lines[header_start..header_end];
    let end = collect_until_question(lines, header_end);
    let rows = &lines[header_end..end];

    builder.add_field(
        FieldRow::new(FieldKind::BeginGroup, format!("{}_group", question.name))
            .appearance("field-list")
            .required(false),
    );
    builder.add_field(
        FieldRow::new(mode.field_kind(&list_name), format!("{}_matrix_label", question.name))
            .label(question.label.clone())
            .appearance("label")
            .required(false)
            .hint(question.hint.clone()),
    );
    for (idx, row) in rows.iter().enumerate() {
        builder.add_field(
            FieldRow::new(mode.field_kind(&list_name), format!("{}_{}", question.name, idx + 1))
                .label(row.clone())
                .appearance("list-nolabel")
                .required(true)
                .parameters(question.parameters()),
        );
    }
    builder.add_field(FieldRow::new(
        FieldKind::EndGroup,
        format!("{}_group_end", question.name),
    ));

    for (idx, header) in headers.iter().enumerate() {
        builder.add_choice(&list_name, format!("{}", idx + 1), header.clone());
    }
    debug!(
        "emit_matrix: {}: {:?} columns, {:?} rows",
        question.name,
        headers.len(),
        rows.len()
    );
    Ok(end)
}

/// The filter that hides the items already picked at the previous positions.
fn ranking_filter(name: &str, position: u32) -> Option<String> {
    if position <= 1 {
        return None;
    }
    let clauses: Vec<String> = (1..position)
        .map(|j| format!("not(selected(${{{}_{}}}, name))", name, j))
        .collect();
    Some(clauses.join(" and "))
}

fn emit_ranking(
    lines: &[String],
    cursor: usize,
    question: &Question,
    count: u32,
    builder: &mut FormBuilder,
) -> CompileResult<usize> {
    let list_name = format!("{}_list", question.name);
    let end = collect_until_question(lines, cursor + 1);
    let items = &lines[cursor + 1..end];
    ensure!(
        !items.is_empty(),
        EmptyChoiceListSnafu {
            line: question.lineno,
            name: question.name.clone(),
        }
    );
    ensure!(
        count as usize <= items.len(),
        OversizedQuestionSnafu {
            line: question.lineno,
            name: question.name.clone(),
            requested: count as usize,
            limit: items.len(),
        }
    );

    builder.add_field(
        FieldRow::new(FieldKind::BeginGroup, format!("{}_group", question.name))
            .appearance("field-list"),
    );
    builder.add_field(
        FieldRow::new(FieldKind::Note, format!("{}_label", question.name))
            .label(question.label.clone())
            .hint(question.hint.clone()),
    );
    for position in 1..=count {
        let label = builder.labels().ranking_position(position as usize).to_string();
        builder.add_field(
            FieldRow::new(
                FieldKind::SelectOne(list_name.clone()),
                format!("{}_{}", question.name, position),
            )
            .label(label)
            .required(true)
            .appearance("minimal")
            .parameters(question.parameters())
            .choice_filter(ranking_filter(&question.name, position)),
        );
    }
    builder.add_field(FieldRow::new(
        FieldKind::EndGroup,
        format!("{}_group_end", question.name),
    ));

    for (idx, item) in items.iter().enumerate() {
        builder.add_choice(&list_name, format!("{}", idx + 1), clean_option_label(item));
    }
    debug!(
        "emit_ranking: {}: {:?} positions, {:?} items",
        question.name,
        count,
        items.len()
    );
    Ok(end)
}
