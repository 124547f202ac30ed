use log::{debug, info, warn};

use form_compiler::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::path::Path;

use text_diff::print_diff;

use crate::args::Args;
use crate::form::config_reader::*;
use crate::form::io_output::*;
use crate::form::io_roster::roster_from_source;

pub mod config_reader;
mod io_common;
mod io_output;
mod io_roster;

#[derive(Debug, Snafu)]
pub enum FormError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the form"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {worksheet} not found in {path}"))]
    MissingWorksheet { worksheet: String, path: String },
    #[snafu(display("Error reading or writing the CSV file {path}"))]
    CsvFile { source: csv::Error, path: String },
    #[snafu(display("Could not find the column {column} in the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("The roster {path} does not list any enumerator"))]
    EmptyRoster { path: String },
    #[snafu(display("Unsupported {what}: {value}"))]
    Unsupported { what: String, value: String },
    #[snafu(display("No {what} provided, use the configuration file or the command line"))]
    MissingOption { what: String },
    #[snafu(display(""))]
    MissingParentDir {},
    #[snafu(display("Could not compile the survey"))]
    Compiling { source: CompileError },
    #[snafu(display("Difference detected between the generated form and the reference form"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type FormResult<T> = Result<T, FormError>;

/// Runs the generation described by the command line.
pub fn run(args: &Args) -> FormResult<()> {
    let config = match &args.config {
        Some(config_path) => read_config(config_path)?,
        None => FormConfig::default(),
    };
    let config = config.with_args(args);

    let output = generate_form(&config, args.reference.as_deref())?;

    if !output.skipped.is_empty() {
        eprintln!("Questions left out of the form (tagged [other]):");
        for label in output.skipped.iter() {
            eprintln!("  {}", label);
        }
    }
    Ok(())
}

/// Compiles the document of the configuration, writes the form and compares it with the
/// reference form, if one is given.
pub fn generate_form(config: &FormConfig, reference_path: Option<&str>) -> FormResult<CompileOutput> {
    info!("config: {:?}", config);

    let input_path = config.input_path.clone().context(MissingOptionSnafu {
        what: "input document",
    })?;
    let lines = io_common::read_lines(&input_path)?;
    info!("Read {:?} lines from {:?}", lines.len(), input_path);

    let source = config.roster.as_ref().context(MissingOptionSnafu { what: "roster" })?;
    let roster = roster_from_source(source)?;

    let options = config.compile_options();
    let output = compile_document(&lines, roster.as_ref(), &options).context(CompilingSnafu {})?;
    debug!("skipped questions: {:?}", output.skipped);

    let form_js = form_to_json(&output.form)?;
    match config.output_format()? {
        OutputFormat::Json => write_json(&form_js, config.output_path.as_deref())?,
        OutputFormat::Csv => {
            let out_dir = config.output_path.clone().context(MissingOptionSnafu {
                what: "output directory",
            })?;
            write_csv(&output.form, Path::new(&out_dir))?
        }
    }

    // The reference form, if provided for comparison
    if let Some(reference_p) = reference_path {
        let reference_js = read_reference(reference_p)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference_js).context(SerializingJsonSnafu {})?;
        let pretty_form = serde_json::to_string_pretty(&form_js).context(SerializingJsonSnafu {})?;
        if reference_js != form_js {
            warn!("Found differences with the reference form");
            print_diff(pretty_reference.as_str(), pretty_form.as_str(), "\n");
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(output)
}

/// Prints an error and all its causes.
pub fn print_error(e: &FormError) {
    eprintln!("An error occurred: {}", e);
    for (idx, cause) in ErrorCompat::iter_chain(e).enumerate().skip(1) {
        eprintln!("  {}: {}", idx, cause);
    }
}

#[cfg(test)]
fn run_generation_test(
    test_name: &str,
    config_lpath: &str,
    reference_lpath: &str,
) -> FormResult<CompileOutput> {
    let test_dir = option_env!("FORMGEN_TEST_DIR")
        .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data"));
    info!("Running test {}", test_name);
    let config = read_config(&format!("{}/{}/{}", test_dir, test_name, config_lpath))?;
    generate_form(
        &config,
        Some(format!("{}/{}/{}", test_dir, test_name, reference_lpath).as_str()),
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> CompileOutput {
    let _ = env_logger::builder().is_test(true).try_init();
    let res = run_generation_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected.json", test_name).as_str(),
    );
    match res {
        Ok(output) => output,
        Err(e) => {
            print_error(&e);
            panic!("test {} failed: {}", test_name, e);
        }
    }
}
