use log::debug;

use std::fs;
use std::path::{Path, PathBuf};

use ballot_tally::{IdRules, TrackerConfig};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::ballot::*;

pub const DEFAULT_CONTEST_NAME: &str = "Best Actor";
pub const DEFAULT_CANDIDATES: [&str; 4] = [
    "Leonardo DiCaprio",
    "Marlon Brando",
    "Johnny Depp",
    "Christian Bale",
];
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_VOTES_FILE: &str = "votes.csv";
pub const DEFAULT_VOTERS_FILE: &str = "voters.csv";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotIdRules {
    #[serde(rename = "minLength")]
    pub min_length: Option<usize>,
    #[serde(rename = "maxLength")]
    pub max_length: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotConfig {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    pub candidates: Vec<BallotCandidate>,
    #[serde(rename = "dataDirectory")]
    pub data_directory: Option<String>,
    #[serde(rename = "votesFile")]
    pub votes_file: Option<String>,
    #[serde(rename = "votersFile")]
    pub voters_file: Option<String>,
    #[serde(rename = "idRules")]
    pub id_rules: Option<BallotIdRules>,
}

impl BallotConfig {
    pub fn default_contest() -> BallotConfig {
        BallotConfig {
            contest_name: DEFAULT_CONTEST_NAME.to_string(),
            candidates: DEFAULT_CANDIDATES
                .iter()
                .map(|name| BallotCandidate {
                    name: name.to_string(),
                })
                .collect(),
            data_directory: None,
            votes_file: None,
            voters_file: None,
            id_rules: None,
        }
    }

    pub fn id_rules(&self) -> IdRules {
        let defaults = IdRules::DEFAULT_RULES;
        match &self.id_rules {
            Some(r) => IdRules {
                min_length: r.min_length.unwrap_or(defaults.min_length),
                max_length: r.max_length.unwrap_or(defaults.max_length),
            },
            None => defaults,
        }
    }

    pub fn tracker_config(&self) -> BallotResult<TrackerConfig> {
        let names: Vec<&str> = self.candidates.iter().map(|c| c.name.as_str()).collect();
        let config = TrackerConfig::new(self.id_rules(), &names).context(InvalidSetupSnafu {})?;
        Ok(config)
    }

    /// The data directory, relative to the directory of the configuration file.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(
            self.data_directory
                .as_deref()
                .unwrap_or(DEFAULT_DATA_DIR),
        )
    }

    /// The paths of the voters file and of the votes file in the given directory.
    pub fn record_paths(&self, data_dir: &Path) -> (PathBuf, PathBuf) {
        let voters = data_dir.join(self.voters_file.as_deref().unwrap_or(DEFAULT_VOTERS_FILE));
        let votes = data_dir.join(self.votes_file.as_deref().unwrap_or(DEFAULT_VOTES_FILE));
        (voters, votes)
    }
}

pub fn read_config(path: &str) -> BallotResult<BallotConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: BallotConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}
