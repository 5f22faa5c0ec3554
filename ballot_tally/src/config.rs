// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// The length and character rules that a voter identifier must follow.
///
/// Lengths are counted in characters, bounds included.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct IdRules {
    pub min_length: usize,
    pub max_length: usize,
}

impl IdRules {
    pub const DEFAULT_RULES: IdRules = IdRules {
        min_length: 4,
        max_length: 10,
    };
}

impl Default for IdRules {
    fn default() -> Self {
        IdRules::DEFAULT_RULES
    }
}

/// The configuration of a tracker: the identifier rules and the fixed list of candidates.
///
/// The order of the candidates is preserved in all the tallies.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TrackerConfig {
    pub id_rules: IdRules,
    pub candidates: Vec<String>,
}

impl TrackerConfig {
    /// Builds a configuration after checking that the candidate list is usable.
    ///
    /// ```
    /// use ballot_tally::{IdRules, TrackerConfig};
    ///
    /// let config = TrackerConfig::new(IdRules::DEFAULT_RULES, &["Anna", "Bob"])?;
    /// assert_eq!(config.candidates.len(), 2);
    /// # Ok::<(), ballot_tally::SetupError>(())
    /// ```
    pub fn new<S: AsRef<str>>(id_rules: IdRules, candidates: &[S]) -> Result<TrackerConfig, SetupError> {
        if id_rules.min_length == 0 || id_rules.min_length > id_rules.max_length {
            return Err(SetupError::InvalidIdRules(id_rules));
        }
        if candidates.is_empty() {
            return Err(SetupError::NoCandidates);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for c in candidates.iter().map(|c| c.as_ref()) {
            if c.trim().is_empty() {
                return Err(SetupError::BlankCandidate);
            }
            if !seen.insert(c) {
                return Err(SetupError::DuplicateCandidate(c.to_string()));
            }
        }
        Ok(TrackerConfig {
            id_rules,
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        })
    }
}

// ******** Output data structures *********

/// A snapshot of the tally: one entry per configured candidate, in configuration order.
///
/// This is a copy. Changing it has no effect on the tracker it came from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tally {
    pub counts: Vec<(String, u64)>,
}

impl Tally {
    pub fn get(&self, candidate: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(name, _)| name == candidate)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| *count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

// ******** Errors *********

/// The reason an identifier was rejected.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FormatIssue {
    TooShort { length: usize, min_length: usize },
    TooLong { length: usize, max_length: usize },
    NotAlphanumeric(char),
}

impl Display for FormatIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatIssue::TooShort { length, min_length } => write!(
                f,
                "ID must have at least {} characters (got {})",
                min_length, length
            ),
            FormatIssue::TooLong { length, max_length } => write!(
                f,
                "ID must have at most {} characters (got {})",
                max_length, length
            ),
            FormatIssue::NotAlphanumeric(c) => {
                write!(f, "ID must contain only letters and numbers (found {:?})", c)
            }
        }
    }
}

/// The expected ways a vote can be refused.
///
/// None of them changes the state of the tracker.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VoteError {
    InvalidFormat(FormatIssue),
    AlreadyVoted(String),
    UnknownCandidate(String),
    /// The count of the candidate or the total cannot hold one more vote.
    CountOverflow(String),
}

impl Error for VoteError {}

impl Display for VoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteError::InvalidFormat(issue) => write!(f, "invalid ID: {}", issue),
            VoteError::AlreadyVoted(_) => write!(f, "this ID has already voted"),
            VoteError::UnknownCandidate(name) => write!(f, "unknown candidate {:?}", name),
            VoteError::CountOverflow(name) => {
                write!(f, "the vote count of {:?} is at its maximum", name)
            }
        }
    }
}

/// Errors when configuring a tracker or restoring its state.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SetupError {
    NoCandidates,
    BlankCandidate,
    DuplicateCandidate(String),
    InvalidIdRules(IdRules),
    InvalidRestoredId(String, FormatIssue),
    UnknownRestoredCandidate(String),
    RestoredCountOverflow,
}

impl Error for SetupError {}

impl Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::NoCandidates => write!(f, "at least one candidate is required"),
            SetupError::BlankCandidate => write!(f, "candidate names may not be blank"),
            SetupError::DuplicateCandidate(name) => {
                write!(f, "candidate {:?} is listed more than once", name)
            }
            SetupError::InvalidIdRules(rules) => write!(
                f,
                "invalid ID length bounds: min {} max {}",
                rules.min_length, rules.max_length
            ),
            SetupError::InvalidRestoredId(_, issue) => {
                write!(f, "stored voter ID is malformed: {}", issue)
            }
            SetupError::UnknownRestoredCandidate(name) => {
                write!(f, "stored tally refers to unknown candidate {:?}", name)
            }
            SetupError::RestoredCountOverflow => {
                write!(f, "stored vote counts add up to more than the maximum count")
            }
        }
    }
}
