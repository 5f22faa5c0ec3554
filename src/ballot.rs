use log::{debug, error, info};

use ballot_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;

use crate::args::Args;
use crate::ballot::config_reader::*;
use crate::ballot::io_records::RecordStore;

mod config_reader;
mod io_common;
mod io_records;
mod session;

#[derive(Debug, Snafu)]
pub enum BallotError {
    #[snafu(display("Vote rejected: {source}"))]
    VoteRejected { source: VoteError },
    #[snafu(display("Invalid contest configuration: {source}"))]
    InvalidSetup { source: SetupError },
    #[snafu(display("Invalid stored record in {path}: {source}"))]
    InvalidRecords { source: SetupError, path: String },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error parsing JSON configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error serializing JSON summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Cannot find the directory of the configuration file"))]
    MissingParentDir {},

    #[snafu(display("Error reading records from {path}"))]
    ReadingRecords { source: csv::Error, path: String },
    #[snafu(display("Line {lineno} of {path} is malformed: {content}"))]
    MalformedRecord {
        path: String,
        lineno: u64,
        content: String,
    },
    #[snafu(display("Error creating data directory {path}"))]
    CreatingDataDir { source: io::Error, path: String },
    #[snafu(display("Error writing records to {path}"))]
    WritingRecords { source: csv::Error, path: String },
    #[snafu(display("Error flushing records to {path}"))]
    FlushingRecords { source: io::Error, path: String },

    #[snafu(display("Error writing summary to {path}"))]
    WritingOutput { source: io::Error, path: String },
    #[snafu(display("Console error"))]
    Console { source: io::Error },
}

pub type BallotResult<T> = Result<T, Box<BallotError>>;

/// The families of failures that the presentation distinguishes when reporting to the voter.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FailureKind {
    InvalidFormat,
    AlreadyVoted,
    UnknownCandidate,
    /// The vote may not have been durably recorded.
    IoFailure,
    Unexpected,
}

impl BallotError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BallotError::VoteRejected { source } => match source {
                VoteError::InvalidFormat(_) => FailureKind::InvalidFormat,
                VoteError::AlreadyVoted(_) => FailureKind::AlreadyVoted,
                VoteError::UnknownCandidate(_) => FailureKind::UnknownCandidate,
                VoteError::CountOverflow(_) => FailureKind::Unexpected,
            },
            BallotError::CreatingDataDir { .. }
            | BallotError::WritingRecords { .. }
            | BallotError::FlushingRecords { .. } => FailureKind::IoFailure,
            _ => FailureKind::Unexpected,
        }
    }

    /// A message that can be shown to a voter.
    pub fn user_message(&self) -> String {
        match (self.kind(), self) {
            (FailureKind::InvalidFormat, BallotError::VoteRejected { source }) => match source {
                VoteError::InvalidFormat(issue) => format!("Invalid ID. {}.", issue),
                _ => "Invalid ID.".to_string(),
            },
            (FailureKind::AlreadyVoted, _) => "This ID has already voted.".to_string(),
            (FailureKind::UnknownCandidate, _) => "Please select a valid candidate.".to_string(),
            (FailureKind::IoFailure, _) => {
                "Your vote could not be saved. Please contact the election staff.".to_string()
            }
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    /// The message for the terminal when a run stops on this error.
    ///
    /// Rejected votes get the voter-facing message, other failures their full description.
    pub fn console_message(&self) -> String {
        match self.kind() {
            FailureKind::IoFailure | FailureKind::Unexpected => self.to_string(),
            _ => self.user_message(),
        }
    }

    /// Logs the failure. Rejected votes are logged at debug level, without the voter ID.
    pub fn log(&self, what: &str) {
        match self.kind() {
            FailureKind::IoFailure | FailureKind::Unexpected => error!("{}: {:?}", what, self),
            _ => debug!("{}: {}", what, self),
        }
    }
}

/// The entry point for the presentation: validates and casts votes, and saves the
/// records after every accepted vote.
pub struct VoteManager {
    contest_name: String,
    tracker: VoteTracker,
    store: RecordStore,
}

impl VoteManager {
    /// Loads the stored records of the contest from the given data directory.
    pub fn open(config: &BallotConfig, data_dir: &Path) -> BallotResult<VoteManager> {
        let tracker_config = config.tracker_config()?;
        let (voters_path, votes_path) = config.record_paths(data_dir);
        let store = RecordStore::new(voters_path, votes_path);
        let tracker = store.load(&tracker_config)?;
        info!(
            "VoteManager::open: contest {:?}: {} voters so far",
            config.contest_name,
            tracker.voter_count()
        );
        Ok(VoteManager {
            contest_name: config.contest_name.clone(),
            tracker,
            store,
        })
    }

    pub fn validate(&self, identifier: &str) -> BallotResult<()> {
        self.tracker
            .validate(identifier)
            .context(VoteRejectedSnafu {})?;
        Ok(())
    }

    /// Validates and records a vote, then rewrites the records.
    ///
    /// If the records cannot be written, the error is returned with the kind
    /// [FailureKind::IoFailure]. The vote stays counted in memory and is written
    /// with the next successful save.
    pub fn cast_vote(&mut self, identifier: &str, candidate: &str) -> BallotResult<()> {
        self.tracker
            .add_vote(identifier, candidate)
            .context(VoteRejectedSnafu {})?;
        if let Err(e) = self.store.save(&self.tracker) {
            error!(
                "cast_vote: vote for {:?} accepted but not saved: {:?}",
                candidate, e
            );
            return Err(e);
        }
        info!("Vote cast successfully for {}", candidate);
        debug!("cast_vote: voter {:?}", identifier);
        Ok(())
    }

    pub fn has_voted(&self, identifier: &str) -> bool {
        self.tracker.has_voted(identifier)
    }

    pub fn get_tally(&self) -> Tally {
        self.tracker.get_tally()
    }

    pub fn candidates(&self) -> &[String] {
        self.tracker.candidates()
    }

    pub fn voter_count(&self) -> usize {
        self.tracker.voter_count()
    }

    pub fn contest_name(&self) -> &str {
        &self.contest_name
    }

    /// Turns a choice into a candidate name. A choice is either a name or the position
    /// of the candidate in the list, starting at 1.
    ///
    /// Anything else is returned as is and will be refused as an unknown candidate.
    pub fn resolve_candidate(&self, choice: &str) -> String {
        let choice = choice.trim();
        match choice.parse::<usize>() {
            Ok(x) if x >= 1 && x <= self.candidates().len() => self.candidates()[x - 1].clone(),
            _ => choice.to_string(),
        }
    }
}

/// The vote counts, one line per candidate, followed by the total.
pub fn format_results(tally: &Tally) -> String {
    let mut res = String::new();
    for (name, count) in tally.iter() {
        let unit = if count == 1 { "vote" } else { "votes" };
        res.push_str(&format!("{}: {} {}\n", name, count, unit));
    }
    res.push_str(&format!("Total: {}\n", tally.total()));
    res
}

fn build_summary_js(manager: &VoteManager) -> JSValue {
    let tally = manager.get_tally();
    let counts: Vec<JSValue> = tally
        .iter()
        .map(|(name, count)| json!({"candidate": name, "votes": count}))
        .collect();
    json!({
        "config": { "contest": manager.contest_name() },
        "results": {
            "tally": counts,
            "totalVotes": tally.total(),
            "voters": manager.voter_count()
        }
    })
}

fn write_summary(out: &str, summary: &JSValue) -> BallotResult<()> {
    let pretty_js = serde_json::to_string_pretty(summary).context(SerializingJsonSnafu {})?;
    if out == "stdout" || out.is_empty() {
        println!("{}", pretty_js);
    } else {
        info!("Writing summary to {:?}", out);
        fs::write(out, pretty_js).context(WritingOutputSnafu { path: out })?;
    }
    Ok(())
}

pub fn run_ballot(args: &Args) -> BallotResult<()> {
    let (config, root): (BallotConfig, PathBuf) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => {
            info!("No configuration provided, using the default contest");
            (BallotConfig::default_contest(), PathBuf::from("."))
        }
    };
    debug!("run_ballot: config: {:?}", config);

    let data_dir = match &args.data_dir {
        Some(d) => PathBuf::from(d),
        None => config.data_dir(&root),
    };
    let mut manager = VoteManager::open(&config, &data_dir)?;

    let mut has_action = false;
    if let (Some(id), Some(choice)) = (&args.id, &args.candidate) {
        has_action = true;
        let candidate = manager.resolve_candidate(choice);
        manager.cast_vote(id, &candidate)?;
        println!("Vote recorded for {}", candidate);
    }
    if let Some(id) = &args.check {
        has_action = true;
        if manager.has_voted(id) {
            println!("{} has voted", id);
        } else {
            println!("{} has not voted", id);
        }
    }
    if args.results {
        has_action = true;
        print!("{}", format_results(&manager.get_tally()));
    }
    if let Some(out) = &args.out {
        has_action = true;
        write_summary(out, &build_summary_js(&manager))?;
    }
    if args.interactive || !has_action {
        let stdin = io::stdin();
        let stdout = io::stdout();
        session::run_session(&mut manager, &mut stdin.lock(), &mut stdout.lock())?;
    }
    Ok(())
}
