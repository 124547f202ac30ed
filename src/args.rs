use clap::Parser;

/// This program turns an annotated survey document into an XLSForm (survey, choices and settings tables).
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the generation. All the other options override
    /// the values given in this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey document, as plain text. Questions are annotated with tags such as
    /// [single], [multiple] or [scale 1-5]. See the manual for all the tags.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, directory, 'stdout' or empty) Where to write the form. With the JSON output, this is a
    /// file (stdout if not specified). With the CSV output, this is the directory receiving survey.csv,
    /// choices.csv and settings.csv.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default json) The output format: json or csv.
    #[clap(long, value_parser)]
    pub output_format: Option<String>,

    /// (file path) The list of enumerators.
    #[clap(long, value_parser)]
    pub roster: Option<String>,

    /// (default xlsx) The type of the roster file: xlsx or csv.
    #[clap(long, value_parser)]
    pub roster_type: Option<String>,

    /// (default lists) When using an Excel roster, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub worksheet: Option<String>,

    /// If passed as an argument, the form collects the GPS position (face to face surveys).
    #[clap(long, takes_value = false)]
    pub geolocation: bool,

    /// (label, repeatable) The label of a question to leave out of the form, for example '3. Age'.
    #[clap(long, value_parser)]
    pub exclude: Option<Vec<String>>,

    /// If passed as an argument, lines with annotations that are not understood are errors instead of being skipped.
    #[clap(long, takes_value = false)]
    pub strict: bool,

    /// (file path) A reference file containing the expected form in JSON format. If provided, formgen will
    /// check that the generated form matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
