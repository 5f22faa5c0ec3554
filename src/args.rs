use clap::Parser;

/// This is a ballot casting program: one vote per voter ID, for one of a fixed list of candidates.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the contest: candidates, data files and ID rules.
    /// If not provided, the default "Best Actor" contest is used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, optional) The directory holding the record files. Setting this option overrides
    /// what may be specified with the --config option.
    #[clap(long, value_parser)]
    pub data_dir: Option<String>,

    /// (voter ID) Casts a vote with this ID. Requires --candidate.
    #[clap(short, long, value_parser, requires = "candidate")]
    pub id: Option<String>,

    /// (candidate name or number) The candidate to vote for, either by name or by its position
    /// in the list of candidates (starting at 1).
    #[clap(long, value_parser, requires = "id")]
    pub candidate: Option<String>,

    /// (voter ID) Reports whether this ID has already voted.
    #[clap(long, value_parser)]
    pub check: Option<String>,

    /// If passed as an argument, prints the current vote counts.
    #[clap(long, takes_value = false)]
    pub results: bool,

    /// (file path, 'stdout' or empty) If specified, a summary of the tally will be written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// If passed as an argument, starts an interactive voting session on the console.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
