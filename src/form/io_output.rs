// Writers for the generated form.

use std::fs;
use std::path::Path;

use form_compiler::{required_cell, SurveyForm};
use log::info;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::form::*;

pub const SURVEY_COLUMNS: [&str; 9] = [
    "type",
    "name",
    "label",
    "required",
    "appearance",
    "parameters",
    "relevant",
    "hint",
    "choice_filter",
];

pub fn form_to_json(form: &SurveyForm) -> FormResult<JSValue> {
    serde_json::to_value(form).context(SerializingJsonSnafu {})
}

/// Writes the form as pretty JSON, to the standard output if no path is given.
pub fn write_json(form_js: &JSValue, path: Option<&str>) -> FormResult<()> {
    let pretty = serde_json::to_string_pretty(form_js).context(SerializingJsonSnafu {})?;
    match path {
        None | Some("stdout") => println!("{}", pretty),
        Some(p) => {
            info!("Writing the form to {:?}", p);
            fs::write(p, pretty).context(WritingFileSnafu { path: p })?;
        }
    }
    Ok(())
}

/// Writes the three tables of the form as survey.csv, choices.csv and settings.csv.
pub fn write_csv(form: &SurveyForm, out_dir: &Path) -> FormResult<()> {
    fs::create_dir_all(out_dir).context(WritingFileSnafu {
        path: out_dir.display().to_string(),
    })?;

    let survey_path = out_dir.join("survey.csv").display().to_string();
    let mut wtr = csv::Writer::from_path(&survey_path).context(CsvFileSnafu {
        path: survey_path.clone(),
    })?;
    wtr.write_record(SURVEY_COLUMNS).context(CsvFileSnafu {
        path: survey_path.clone(),
    })?;
    for row in form.survey.iter() {
        let kind = row.kind.to_string();
        let required = row.required.map(required_cell).unwrap_or_default();
        let record: [&str; 9] = [
            kind.as_str(),
            row.name.as_str(),
            row.label.as_deref().unwrap_or_default(),
            required,
            row.appearance.as_deref().unwrap_or_default(),
            row.parameters.as_deref().unwrap_or_default(),
            row.relevant.as_deref().unwrap_or_default(),
            row.hint.as_deref().unwrap_or_default(),
            row.choice_filter.as_deref().unwrap_or_default(),
        ];
        wtr.write_record(record).context(CsvFileSnafu {
            path: survey_path.clone(),
        })?;
    }
    wtr.flush().context(WritingFileSnafu {
        path: survey_path.clone(),
    })?;

    let choices_path = out_dir.join("choices.csv").display().to_string();
    let mut wtr = csv::Writer::from_path(&choices_path).context(CsvFileSnafu {
        path: choices_path.clone(),
    })?;
    wtr.write_record(["list_name", "name", "label"])
        .context(CsvFileSnafu {
            path: choices_path.clone(),
        })?;
    for choice in form.choices.iter() {
        wtr.write_record([
            choice.list_name.as_str(),
            choice.name.as_str(),
            choice.label.as_str(),
        ])
        .context(CsvFileSnafu {
            path: choices_path.clone(),
        })?;
    }
    wtr.flush().context(WritingFileSnafu {
        path: choices_path.clone(),
    })?;

    let settings_path = out_dir.join("settings.csv").display().to_string();
    let mut wtr = csv::Writer::from_path(&settings_path).context(CsvFileSnafu {
        path: settings_path.clone(),
    })?;
    wtr.write_record(["style"]).context(CsvFileSnafu {
        path: settings_path.clone(),
    })?;
    wtr.write_record([form.settings.style.as_str()])
        .context(CsvFileSnafu {
            path: settings_path.clone(),
        })?;
    wtr.flush().context(WritingFileSnafu {
        path: settings_path.clone(),
    })?;

    info!("Wrote the form to {:?}", out_dir);
    Ok(())
}
