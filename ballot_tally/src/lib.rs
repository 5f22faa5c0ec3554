/*!
Tracking of single-voter-per-identifier ballots.

A [VoteTracker] owns the set of identifiers that have voted and the count of votes
for each configured candidate. It validates the identifiers and refuses duplicate
voters. It does no I/O: the state is restored with the [builder::Builder] and read back
with [VoteTracker::voters] and [VoteTracker::get_tally].

```
use ballot_tally::*;

let config = TrackerConfig::new(IdRules::DEFAULT_RULES, &["Anna", "Bob"])?;
let mut tracker = VoteTracker::new(&config)?;

tracker.add_vote("ABCD", "Anna")?;
assert!(tracker.has_voted("ABCD"));
assert_eq!(tracker.get_tally().get("Anna"), Some(1));
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use std::collections::HashSet;

pub use crate::config::*;

// **** Private structures ****

// Index of a candidate in the configuration.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
    const ONE: VoteCount = VoteCount(1);

    fn checked_add(self, rhs: VoteCount) -> Option<VoteCount> {
        self.0.checked_add(rhs.0).map(VoteCount)
    }
}

// None if the sum does not fit in a count.
fn checked_total<'a, I: Iterator<Item = &'a VoteCount>>(counts: I) -> Option<VoteCount> {
    counts.fold(Some(VoteCount::EMPTY), |acc, c| acc.and_then(|t| t.checked_add(*c)))
}

/// Checks that an identifier follows the given rules.
///
/// The length is checked first, then the characters. Only ASCII letters and digits
/// are accepted.
pub fn validate_id(identifier: &str, rules: &IdRules) -> Result<(), FormatIssue> {
    let length = identifier.chars().count();
    if length < rules.min_length {
        return Err(FormatIssue::TooShort {
            length,
            min_length: rules.min_length,
        });
    }
    if length > rules.max_length {
        return Err(FormatIssue::TooLong {
            length,
            max_length: rules.max_length,
        });
    }
    if let Some(c) = identifier.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(FormatIssue::NotAlphanumeric(c));
    }
    Ok(())
}

/// The voters-seen set and the tally of an election.
///
/// Invariants:
/// - every configured candidate has a count, in configuration order
/// - the sum of the counts fits in a `u64`
/// - the sum of the counts equals the number of voters for all the votes cast
///   through [VoteTracker::add_vote]
///
/// The check-then-insert sequence of [VoteTracker::add_vote] is not protected against
/// concurrent callers: a tracker is meant to be driven from a single thread.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteTracker {
    id_rules: IdRules,
    candidates: Vec<String>,
    counts: Vec<VoteCount>,
    voters: HashSet<String>,
}

impl VoteTracker {
    /// Creates an empty tracker: nobody has voted and every candidate has zero votes.
    pub fn new(config: &TrackerConfig) -> Result<VoteTracker, SetupError> {
        let checked = TrackerConfig::new(config.id_rules, &config.candidates)?;
        info!(
            "VoteTracker::new: {} candidates, ID rules: {:?}",
            checked.candidates.len(),
            checked.id_rules
        );
        Ok(VoteTracker {
            id_rules: checked.id_rules,
            counts: vec![VoteCount::EMPTY; checked.candidates.len()],
            candidates: checked.candidates,
            voters: HashSet::new(),
        })
    }

    pub fn validate(&self, identifier: &str) -> Result<(), VoteError> {
        validate_id(identifier, &self.id_rules).map_err(VoteError::InvalidFormat)
    }

    /// Records the vote of a voter for a candidate.
    ///
    /// The checks are applied in order: format of the identifier, previous vote, and
    /// finally the candidate name. Nothing is changed if any of them fails, or if
    /// the counts cannot hold one more vote.
    pub fn add_vote(&mut self, identifier: &str, candidate: &str) -> Result<(), VoteError> {
        self.validate(identifier)?;
        if self.voters.contains(identifier) {
            debug!("add_vote: duplicate voter {:?}", identifier);
            return Err(VoteError::AlreadyVoted(identifier.to_string()));
        }
        let cid = self
            .candidate_id(candidate)
            .ok_or_else(|| VoteError::UnknownCandidate(candidate.to_string()))?;

        let total = self.total().and_then(|t| t.checked_add(VoteCount::ONE));
        let updated = match (total, self.counts[cid.0].checked_add(VoteCount::ONE)) {
            (Some(_), Some(c)) => c,
            _ => return Err(VoteError::CountOverflow(candidate.to_string())),
        };

        self.voters.insert(identifier.to_string());
        self.counts[cid.0] = updated;
        debug!(
            "add_vote: voter {:?} -> {:?} (now {})",
            identifier, candidate, self.counts[cid.0].0
        );
        Ok(())
    }

    pub fn has_voted(&self, identifier: &str) -> bool {
        self.voters.contains(identifier)
    }

    pub fn get_tally(&self) -> Tally {
        Tally {
            counts: self
                .candidates
                .iter()
                .zip(self.counts.iter())
                .map(|(name, count)| (name.clone(), count.0))
                .collect(),
        }
    }

    /// The identifiers that have voted, in no particular order.
    pub fn voters(&self) -> impl Iterator<Item = &str> {
        self.voters.iter().map(|s| s.as_str())
    }

    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn id_rules(&self) -> &IdRules {
        &self.id_rules
    }

    /// True when the sum of the counts matches the number of voters.
    ///
    /// This always holds for a tracker that only received votes through
    /// [VoteTracker::add_vote]. A restored tracker may break it if its records were
    /// written partially.
    pub fn is_consistent(&self) -> bool {
        self.total() == Some(VoteCount(self.voters.len() as u64))
    }

    fn total(&self) -> Option<VoteCount> {
        checked_total(self.counts.iter())
    }

    fn candidate_id(&self, name: &str) -> Option<CandidateId> {
        self.candidates
            .iter()
            .position(|c| c == name)
            .map(CandidateId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: [&str; 4] = [
        "Leonardo DiCaprio",
        "Marlon Brando",
        "Johnny Depp",
        "Christian Bale",
    ];

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn tracker() -> VoteTracker {
        init();
        let config = TrackerConfig::new(IdRules::DEFAULT_RULES, &CANDIDATES).unwrap();
        VoteTracker::new(&config).unwrap()
    }

    fn assert_invalid(tracker: &VoteTracker, id: &str) {
        assert!(
            matches!(tracker.validate(id), Err(VoteError::InvalidFormat(_))),
            "{:?} should be rejected",
            id
        );
    }

    #[test]
    fn validate_rejects_bad_lengths() {
        let t = tracker();
        assert_invalid(&t, "");
        assert_invalid(&t, "A");
        assert_invalid(&t, "AB");
        assert_invalid(&t, "ABC");
        assert_invalid(&t, "ABCDEFGHIJK");
        assert_invalid(&t, &"9".repeat(40));
    }

    #[test]
    fn validate_rejects_non_alphanumeric() {
        let t = tracker();
        assert_invalid(&t, "ABC-123");
        assert_invalid(&t, "ABC@123");
        assert_invalid(&t, "ABC 123");
        assert_invalid(&t, "ABCD\n");
        assert_invalid(&t, "ÄBCD");
        assert_invalid(&t, "ab_cd");
    }

    #[test]
    fn validate_accepts_alphanumeric() {
        let t = tracker();
        for id in ["ABCD", "abcd", "1234", "a1B2c3", "ABCDEFGHIJ", "0000000000"] {
            assert_eq!(t.validate(id), Ok(()), "{:?} should be accepted", id);
        }
    }

    #[test]
    fn format_issue_details() {
        let rules = IdRules::DEFAULT_RULES;
        assert_eq!(
            validate_id("AB", &rules),
            Err(FormatIssue::TooShort {
                length: 2,
                min_length: 4
            })
        );
        assert_eq!(
            validate_id("ABCDEFGHIJK", &rules),
            Err(FormatIssue::TooLong {
                length: 11,
                max_length: 10
            })
        );
        assert_eq!(
            validate_id("ABC-123", &rules),
            Err(FormatIssue::NotAlphanumeric('-'))
        );
    }

    #[test]
    fn empty_tracker_has_zero_tally() {
        let t = tracker();
        let tally = t.get_tally();
        assert_eq!(tally.counts.len(), CANDIDATES.len());
        for (idx, (name, count)) in tally.iter().enumerate() {
            assert_eq!(name, CANDIDATES[idx]);
            assert_eq!(count, 0);
        }
        assert_eq!(t.voter_count(), 0);
    }

    #[test]
    fn add_vote_simple() {
        let mut t = tracker();
        assert!(!t.has_voted("ABCD"));
        t.add_vote("ABCD", CANDIDATES[1]).unwrap();
        assert!(t.has_voted("ABCD"));
        let tally = t.get_tally();
        assert_eq!(tally.get(CANDIDATES[1]), Some(1));
        assert_eq!(tally.get(CANDIDATES[0]), Some(0));
        assert_eq!(tally.total(), 1);
    }

    #[test]
    fn duplicate_vote_counts_once() {
        let mut t = tracker();
        t.add_vote("ABC123", CANDIDATES[0]).unwrap();
        assert_eq!(
            t.add_vote("ABC123", CANDIDATES[2]),
            Err(VoteError::AlreadyVoted("ABC123".to_string()))
        );
        let tally = t.get_tally();
        assert_eq!(tally.get(CANDIDATES[0]), Some(1));
        assert_eq!(tally.get(CANDIDATES[2]), Some(0));
        assert_eq!(t.voter_count(), 1);
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        let mut t = tracker();
        t.add_vote("abcd", CANDIDATES[0]).unwrap();
        t.add_vote("ABCD", CANDIDATES[0]).unwrap();
        assert_eq!(t.get_tally().get(CANDIDATES[0]), Some(2));
    }

    #[test]
    fn unknown_candidate_leaves_state_unchanged() {
        let mut t = tracker();
        t.add_vote("GHI789", CANDIDATES[3]).unwrap();
        let before = t.get_tally();
        assert_eq!(
            t.add_vote("TEST123", "Invalid Candidate"),
            Err(VoteError::UnknownCandidate("Invalid Candidate".to_string()))
        );
        assert_eq!(t.get_tally(), before);
        assert!(!t.has_voted("TEST123"));
    }

    #[test]
    fn invalid_id_checked_before_duplicate_and_candidate() {
        let mut t = tracker();
        assert!(matches!(
            t.add_vote("A1", "Nobody"),
            Err(VoteError::InvalidFormat(_))
        ));
        t.add_vote("ABCD", CANDIDATES[0]).unwrap();
        assert!(matches!(
            t.add_vote("ABCD", "Nobody"),
            Err(VoteError::AlreadyVoted(_))
        ));
    }

    #[test]
    fn two_voters_same_candidate() {
        let mut t = tracker();
        t.add_vote("ABC123", CANDIDATES[0]).unwrap();
        t.add_vote("DEF456", CANDIDATES[0]).unwrap();
        let tally = t.get_tally();
        assert_eq!(tally.get(CANDIDATES[0]), Some(2));
        for c in &CANDIDATES[1..] {
            assert_eq!(tally.get(c), Some(0));
        }
    }

    #[test]
    fn tally_sum_matches_voters() {
        let mut t = tracker();
        let ids = [
            "ABC123", "DEF456", "GHI789", "ABC123", "xyz", "JKL012", "MNO345", "bad-id",
        ];
        for (idx, id) in ids.iter().enumerate() {
            let _ = t.add_vote(id, CANDIDATES[idx % CANDIDATES.len()]);
            assert!(t.is_consistent());
            assert_eq!(t.get_tally().total(), t.voter_count() as u64);
        }
        assert_eq!(t.voter_count(), 5);
    }

    #[test]
    fn tally_is_a_copy() {
        let mut t = tracker();
        t.add_vote("ABCD", CANDIDATES[0]).unwrap();
        let mut tally = t.get_tally();
        tally.counts[0].1 = 100;
        tally.counts.clear();
        assert_eq!(t.get_tally().get(CANDIDATES[0]), Some(1));
        assert_eq!(t.get_tally().counts.len(), CANDIDATES.len());
    }

    #[test]
    fn custom_id_rules() {
        init();
        let rules = IdRules {
            min_length: 2,
            max_length: 3,
        };
        let config = TrackerConfig::new(rules, &["Yes", "No"]).unwrap();
        let mut t = VoteTracker::new(&config).unwrap();
        t.add_vote("AB", "Yes").unwrap();
        assert!(matches!(
            t.add_vote("ABCD", "No"),
            Err(VoteError::InvalidFormat(FormatIssue::TooLong { .. }))
        ));
    }

    #[test]
    fn config_checks() {
        let no_candidates: [&str; 0] = [];
        assert_eq!(
            TrackerConfig::new(IdRules::DEFAULT_RULES, &no_candidates),
            Err(SetupError::NoCandidates)
        );
        assert_eq!(
            TrackerConfig::new(IdRules::DEFAULT_RULES, &["Anna", " "]),
            Err(SetupError::BlankCandidate)
        );
        assert_eq!(
            TrackerConfig::new(IdRules::DEFAULT_RULES, &["Anna", "Bob", "Anna"]),
            Err(SetupError::DuplicateCandidate("Anna".to_string()))
        );
        let bad_rules = IdRules {
            min_length: 5,
            max_length: 4,
        };
        assert_eq!(
            TrackerConfig::new(bad_rules, &["Anna"]),
            Err(SetupError::InvalidIdRules(bad_rules))
        );
        // Commas are allowed in names.
        assert!(TrackerConfig::new(IdRules::DEFAULT_RULES, &["Doe, Jane"]).is_ok());
    }

    #[test]
    fn tracker_rechecks_hand_built_config() {
        let config = TrackerConfig {
            id_rules: IdRules::DEFAULT_RULES,
            candidates: vec![],
        };
        assert_eq!(VoteTracker::new(&config), Err(SetupError::NoCandidates));
    }
}
