// Reading and writing the record files.

use log::{debug, info, warn};

use std::fs::File;
use std::path::{Path, PathBuf};

use ballot_tally::builder::Builder;
use ballot_tally::{SetupError, TrackerConfig, VoteTracker};
use snafu::prelude::*;

use crate::ballot::{
    io_common::{display_path, ensure_parent_dir},
    *,
};

/// The two record files of a contest: the identifiers that voted, and the count for
/// each candidate.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecordStore {
    voters_path: PathBuf,
    votes_path: PathBuf,
}

impl RecordStore {
    pub fn new(voters_path: PathBuf, votes_path: PathBuf) -> RecordStore {
        RecordStore {
            voters_path,
            votes_path,
        }
    }

    /// Restores a tracker from the record files.
    ///
    /// Missing files, unreadable files and malformed lines all lead to an empty tracker.
    /// Only an invalid configuration is an error.
    pub fn load(&self, config: &TrackerConfig) -> BallotResult<VoteTracker> {
        let builder = Builder::new(config).context(InvalidSetupSnafu {})?;
        match self.restore(builder) {
            Ok(tracker) => {
                if !tracker.is_consistent() {
                    warn!(
                        "The vote counts in {} do not add up to the {} voters in {}",
                        display_path(&self.votes_path),
                        tracker.voter_count(),
                        display_path(&self.voters_path)
                    );
                }
                info!(
                    "Loaded {} voters from {}",
                    tracker.voter_count(),
                    display_path(&self.voters_path)
                );
                Ok(tracker)
            }
            Err(e) => {
                warn!(
                    "Error loading stored records, starting with no prior votes: {}",
                    e
                );
                debug!("load: {:?}", e);
                let tracker = VoteTracker::new(config).context(InvalidSetupSnafu {})?;
                Ok(tracker)
            }
        }
    }

    fn restore(&self, mut builder: Builder) -> BallotResult<VoteTracker> {
        let voters_p = display_path(&self.voters_path);
        for voter in read_voters(&self.voters_path)? {
            builder
                .add_voter(&voter)
                .context(InvalidRecordsSnafu {
                    path: voters_p.clone(),
                })?;
        }
        let votes_p = display_path(&self.votes_path);
        for (name, count) in read_tally(&self.votes_path)? {
            match builder.set_count(&name, count) {
                Ok(()) => {}
                Err(SetupError::UnknownRestoredCandidate(_)) => {
                    warn!(
                        "{}: skipping the {} votes of {:?}, which is not a candidate",
                        votes_p, count, name
                    );
                }
                Err(e) => {
                    return Err(Box::new(BallotError::InvalidRecords {
                        source: e,
                        path: votes_p,
                    }));
                }
            }
        }
        let tracker = builder
            .build()
            .context(InvalidRecordsSnafu { path: votes_p })?;
        Ok(tracker)
    }

    /// Rewrites both record files from the state of the tracker.
    pub fn save(&self, tracker: &VoteTracker) -> BallotResult<()> {
        ensure_parent_dir(&self.votes_path)?;
        ensure_parent_dir(&self.voters_path)?;

        let p = display_path(&self.votes_path);
        let mut wtr = writer(&self.votes_path)?;
        for (name, count) in tracker.get_tally().iter() {
            wtr.write_record([name, count.to_string().as_str()])
                .context(WritingRecordsSnafu { path: p.clone() })?;
        }
        wtr.flush().context(FlushingRecordsSnafu { path: p })?;

        // Sorted to keep the file stable between two saves.
        let mut voters: Vec<&str> = tracker.voters().collect();
        voters.sort_unstable();
        let p = display_path(&self.voters_path);
        let mut wtr = writer(&self.voters_path)?;
        for voter in voters {
            wtr.write_record([voter])
                .context(WritingRecordsSnafu { path: p.clone() })?;
        }
        wtr.flush().context(FlushingRecordsSnafu { path: p })?;

        info!("Vote data saved successfully");
        Ok(())
    }
}

/// Reads the voters file: one identifier per line.
///
/// A missing file contains no voters.
pub fn read_voters(path: &Path) -> BallotResult<Vec<String>> {
    let mut res: Vec<String> = Vec::new();
    let p = display_path(path);
    if let Some(rdr) = reader(path)? {
        for (idx, line_r) in rdr.into_records().enumerate() {
            let line = line_r.context(ReadingRecordsSnafu { path: p.clone() })?;
            let lineno = line_number(&line, idx);
            debug!("read_voters: {:?} {:?}", lineno, line);
            match (line.len(), line.get(0)) {
                (1, Some(id)) => res.push(id.to_string()),
                _ => {
                    return Err(Box::new(BallotError::MalformedRecord {
                        path: p,
                        lineno,
                        content: format!("expected one field, got {}", line.len()),
                    }));
                }
            }
        }
    }
    Ok(res)
}

/// Reads the votes file: one `name,count` line per candidate.
///
/// A missing file contains no counts.
pub fn read_tally(path: &Path) -> BallotResult<Vec<(String, u64)>> {
    let mut res: Vec<(String, u64)> = Vec::new();
    let p = display_path(path);
    if let Some(rdr) = reader(path)? {
        for (idx, line_r) in rdr.into_records().enumerate() {
            let line = line_r.context(ReadingRecordsSnafu { path: p.clone() })?;
            let lineno = line_number(&line, idx);
            debug!("read_tally: {:?} {:?}", lineno, line);
            let (name, count_s) = match (line.len(), line.get(0), line.get(1)) {
                (2, Some(name), Some(count_s)) => (name, count_s),
                _ => {
                    return Err(Box::new(BallotError::MalformedRecord {
                        path: p,
                        lineno,
                        content: format!("expected two fields, got {}", line.len()),
                    }));
                }
            };
            let count = match count_s.trim().parse::<u64>() {
                Ok(x) => x,
                Err(_) => {
                    return Err(Box::new(BallotError::MalformedRecord {
                        path: p,
                        lineno,
                        content: format!("count {:?} is not a non-negative integer", count_s),
                    }));
                }
            };
            res.push((name.to_string(), count));
        }
    }
    Ok(res)
}

fn reader(path: &Path) -> BallotResult<Option<csv::Reader<File>>> {
    if !path.exists() {
        info!("No record file at {}", display_path(path));
        return Ok(None);
    }
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(ReadingRecordsSnafu {
            path: display_path(path),
        })?;
    Ok(Some(rdr))
}

fn writer(path: &Path) -> BallotResult<csv::Writer<File>> {
    let wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(WritingRecordsSnafu {
            path: display_path(path),
        })?;
    Ok(wtr)
}

// The index starts at 1 to respect the conventions of text editors.
fn line_number(record: &csv::StringRecord, idx: usize) -> u64 {
    record
        .position()
        .map(|pos| pos.line())
        .unwrap_or(idx as u64 + 1)
}
