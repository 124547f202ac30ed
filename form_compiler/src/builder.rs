use std::collections::HashSet;

use crate::config::*;
use crate::roster::{RosterEntry, ROSTER_LIST};

/// Accumulates the rows of a form.
///
/// The builder starts with the rows every form carries (start and end markers,
/// the optional GPS field and the enumerator question) and appends the
/// closing contact fields when finished. Rows are only ever appended.
///
/// ```
/// use form_compiler::builder::FormBuilder;
/// use form_compiler::roster::RosterEntry;
/// use form_compiler::{FieldKind, FieldRow, FixedLabels};
///
/// let mut builder = FormBuilder::new(&FixedLabels::default(), false, &[RosterEntry::new("1", "Anna")]);
/// builder.add_field(FieldRow::new(FieldKind::Integer, "P1").label("1. Age").required(true));
/// let form = builder.finish();
/// assert_eq!(form.survey.len(), 6);
/// ```
pub struct FormBuilder {
    survey: Vec<FieldRow>,
    choices: Vec<ChoiceEntry>,
    lists: HashSet<String>,
    labels: FixedLabels,
}

impl FormBuilder {
    pub fn new(labels: &FixedLabels, collect_geolocation: bool, roster: &[RosterEntry]) -> FormBuilder {
        let mut builder = FormBuilder {
            survey: Vec::new(),
            choices: Vec::new(),
            lists: HashSet::new(),
            labels: labels.clone(),
        };
        builder.add_field(FieldRow::new(FieldKind::Start, "start"));
        builder.add_field(FieldRow::new(FieldKind::End, "end"));
        if collect_geolocation {
            builder.add_field(
                FieldRow::new(FieldKind::Geopoint, "GPS")
                    .label("GPS")
                    .required(true),
            );
        }
        builder.add_field(
            FieldRow::new(FieldKind::SelectOne(ROSTER_LIST.to_string()), "enumerator")
                .label(labels.enumerator.clone())
                .required(true)
                .appearance("search"),
        );
        for entry in roster {
            builder.add_choice(ROSTER_LIST, entry.code.clone(), entry.label.clone());
        }
        builder
    }

    pub fn add_field(&mut self, field: FieldRow) {
        self.survey.push(field);
    }

    pub fn add_choice(&mut self, list_name: &str, name: impl Into<String>, label: impl Into<String>) {
        self.lists.insert(list_name.to_string());
        self.choices.push(ChoiceEntry {
            list_name: list_name.to_string(),
            name: name.into(),
            label: label.into(),
        });
    }

    /// True if some choices were already added to this list.
    pub fn has_list(&self, list_name: &str) -> bool {
        self.lists.contains(list_name)
    }

    pub fn labels(&self) -> &FixedLabels {
        &self.labels
    }

    pub fn finish(mut self) -> SurveyForm {
        let full_name = self.labels.full_name.clone();
        let phone_number = self.labels.phone_number.clone();
        self.add_field(
            FieldRow::new(FieldKind::Text, "full_name")
                .label(full_name)
                .required(true),
        );
        self.add_field(
            FieldRow::new(FieldKind::Text, "phone_number")
                .label(phone_number)
                .required(true),
        );
        SurveyForm {
            survey: self.survey,
            choices: self.choices,
            settings: Settings {
                style: self.labels.style,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<RosterEntry> {
        vec![RosterEntry::new("1", "Anna"), RosterEntry::new("2", "Bob")]
    }

    fn names(form: &SurveyForm) -> Vec<&str> {
        form.survey.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn fixed_rows_without_geolocation() {
        let form = FormBuilder::new(&FixedLabels::default(), false, &roster()).finish();
        assert_eq!(
            names(&form),
            vec!["start", "end", "enumerator", "full_name", "phone_number"]
        );
        let enumerator = form.field("enumerator").unwrap();
        assert_eq!(
            enumerator.kind,
            FieldKind::SelectOne("enumerators_list".to_string())
        );
        assert_eq!(enumerator.appearance.as_deref(), Some("search"));
        assert_eq!(form.choices_of(ROSTER_LIST).count(), 2);
        assert_eq!(form.settings.style, "theme-grid no-text-transform");
    }

    #[test]
    fn fixed_rows_with_geolocation() {
        let form = FormBuilder::new(&FixedLabels::default(), true, &roster()).finish();
        assert_eq!(
            names(&form),
            vec!["start", "end", "GPS", "enumerator", "full_name", "phone_number"]
        );
        assert_eq!(form.survey[2].kind, FieldKind::Geopoint);
    }

    #[test]
    fn compiled_rows_go_between_header_and_closing_fields() {
        let mut builder = FormBuilder::new(&FixedLabels::default(), false, &roster());
        builder.add_field(FieldRow::new(FieldKind::Note, "note1").label("Hello"));
        assert!(!builder.has_list("scale_1_5"));
        builder.add_choice("scale_1_5", "1", "1");
        assert!(builder.has_list("scale_1_5"));
        assert!(builder.has_list(ROSTER_LIST));
        let form = builder.finish();
        assert_eq!(form.survey[3].name, "note1");
        assert_eq!(form.survey[4].name, "full_name");
        assert_eq!(form.choices.len(), 3);
    }
}
