use log::{debug, warn};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;
use crate::{validate_id, VoteTracker};

/// A builder for restoring a tracker from previously saved records.
///
/// Candidates that are missing from the restored counts start at zero.
///
/// ```
/// pub use ballot_tally::builder::Builder;
/// pub use ballot_tally::{IdRules, TrackerConfig};
/// # use ballot_tally::SetupError;
///
/// let config = TrackerConfig::new(IdRules::DEFAULT_RULES, &["Anna", "Bob"])?;
/// let mut builder = Builder::new(&config)?;
///
/// builder.add_voter("ABCD")?;
/// builder.set_count("Anna", 1)?;
///
/// let tracker = builder.build()?;
/// assert!(tracker.has_voted("ABCD"));
/// assert_eq!(tracker.get_tally().get("Bob"), Some(0));
///
/// # Ok::<(), SetupError>(())
/// ```
pub struct Builder {
    pub(crate) _tracker: VoteTracker,
    pub(crate) _voters: HashSet<String>,
    pub(crate) _counts: HashMap<String, u64>,
}

impl Builder {
    pub fn new(config: &TrackerConfig) -> Result<Builder, SetupError> {
        Ok(Builder {
            _tracker: VoteTracker::new(config)?,
            _voters: HashSet::new(),
            _counts: HashMap::new(),
        })
    }

    /// Adds a voter that already voted.
    ///
    /// The identifier must follow the identifier rules of the configuration. Adding the
    /// same identifier twice is accepted and only counts once.
    pub fn add_voter(&mut self, identifier: &str) -> Result<(), SetupError> {
        validate_id(identifier, self._tracker.id_rules())
            .map_err(|issue| SetupError::InvalidRestoredId(identifier.to_string(), issue))?;
        if !self._voters.insert(identifier.to_string()) {
            warn!("Builder::add_voter: voter listed more than once in the stored records");
        }
        Ok(())
    }

    /// Sets the count of a candidate.
    ///
    /// A later call for the same candidate replaces the earlier count.
    pub fn set_count(&mut self, candidate: &str, count: u64) -> Result<(), SetupError> {
        if self._tracker.candidate_id(candidate).is_none() {
            return Err(SetupError::UnknownRestoredCandidate(candidate.to_string()));
        }
        if let Some(previous) = self._counts.insert(candidate.to_string(), count) {
            warn!(
                "Builder::set_count: count for {:?} given twice ({} then {}), keeping the last one",
                candidate, previous, count
            );
        }
        Ok(())
    }

    /// Fails if the counts add up to more than a count can hold.
    pub fn build(self) -> Result<VoteTracker, SetupError> {
        let mut tracker = self._tracker;
        let counts = self._counts;
        for (idx, name) in tracker.candidates.iter().enumerate() {
            let count = counts.get(name).cloned().unwrap_or(0);
            debug!("Builder::build: {:?} -> {}", name, count);
            tracker.counts[idx] = crate::VoteCount(count);
        }
        if tracker.total().is_none() {
            return Err(SetupError::RestoredCountOverflow);
        }
        tracker.voters = self._voters;
        Ok(tracker)
    }
}
