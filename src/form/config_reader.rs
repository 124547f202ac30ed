use std::fs;
use std::path::Path;

use form_compiler::CompileOptions;
use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::args::Args;
use crate::form::io_common::resolve_path;
use crate::form::*;

pub const DEFAULT_ROSTER_PROVIDER: &str = "xlsx";

/// Where the list of enumerators comes from.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RosterSource {
    /// `xlsx` or `csv`
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    #[serde(rename = "codeColumn")]
    pub code_column: Option<String>,
    #[serde(rename = "labelColumn")]
    pub label_column: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(rename = "inputPath")]
    pub input_path: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "outputFormat")]
    pub output_format: Option<String>,
    #[serde(rename = "collectGeolocation")]
    pub collect_geolocation: Option<bool>,
    #[serde(rename = "excludedLabels")]
    pub excluded_labels: Option<Vec<String>>,
    pub strict: Option<bool>,
    pub roster: Option<RosterSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl FormConfig {
    pub fn output_format(&self) -> FormResult<OutputFormat> {
        match self.output_format.as_deref() {
            None | Some("json") => Ok(OutputFormat::Json),
            Some("csv") => Ok(OutputFormat::Csv),
            Some(x) => UnsupportedSnafu {
                what: "output format",
                value: x,
            }
            .fail(),
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            collect_geolocation: self.collect_geolocation.unwrap_or(false),
            excluded_labels: self
                .excluded_labels
                .iter()
                .flatten()
                .map(|l| l.trim().to_string())
                .collect(),
            strict: self.strict.unwrap_or(false),
            ..CompileOptions::default()
        }
    }

    /// Applies the options of the command line on top of the configuration.
    pub fn with_args(self, args: &Args) -> FormConfig {
        let roster = match (self.roster, &args.roster) {
            (Some(source), Some(path)) => Some(RosterSource {
                file_path: path.clone(),
                provider: args.roster_type.clone().unwrap_or(source.provider),
                ..source
            }),
            (None, Some(path)) => Some(RosterSource {
                provider: args
                    .roster_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ROSTER_PROVIDER.to_string()),
                file_path: path.clone(),
                worksheet_name: None,
                code_column: None,
                label_column: None,
            }),
            (source, None) => source.map(|s| RosterSource {
                provider: args.roster_type.clone().unwrap_or(s.provider),
                ..s
            }),
        };
        let roster = roster.map(|s| RosterSource {
            worksheet_name: args.worksheet.clone().or(s.worksheet_name),
            ..s
        });

        let mut excluded_labels = self.excluded_labels.unwrap_or_default();
        excluded_labels.extend(args.exclude.iter().flatten().cloned());

        FormConfig {
            input_path: args.input.clone().or(self.input_path),
            output_path: args.out.clone().or(self.output_path),
            output_format: args.output_format.clone().or(self.output_format),
            collect_geolocation: if args.geolocation {
                Some(true)
            } else {
                self.collect_geolocation
            },
            excluded_labels: Some(excluded_labels),
            strict: if args.strict { Some(true) } else { self.strict },
            roster,
        }
    }
}

/// Reads a configuration file. The relative paths it contains are relative to the
/// directory of the file.
pub fn read_config(path: &str) -> FormResult<FormConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: FormConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);

    let root = Path::new(path).parent().context(MissingParentDirSnafu {})?;
    Ok(FormConfig {
        input_path: config.input_path.map(|p| resolve_path(root, &p)),
        output_path: config.output_path.map(|p| match p.as_str() {
            "stdout" => p,
            _ => resolve_path(root, &p),
        }),
        roster: config.roster.map(|r| RosterSource {
            file_path: resolve_path(root, &r.file_path),
            ..r
        }),
        ..config
    })
}

/// Reads a reference form.
pub fn read_reference(path: &str) -> FormResult<serde_json::Value> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}
