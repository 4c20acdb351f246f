use clap::Parser;

/// This is a vote counting program for instant runoff (IR), open party list (OPL) and
/// popularity only (PO) elections.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, repeatable) A CSV ballot file. Several files of the same election are
    /// counted together. When no file is given here or in the configuration, the file names
    /// are asked for on the standard input.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (file path, optional) A JSON file with the settings of the run. The ballot files it
    /// lists are relative to its location.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, default '.') Where the audit file and the media report are written.
    #[clap(long, value_parser)]
    pub output_dir: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, votingsystem will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (integer) Seed for the coin tosses that resolve ties. Without it, every toss is seeded
    /// from the clock.
    #[clap(long, value_parser)]
    pub seed: Option<u64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
