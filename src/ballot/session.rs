// The interactive console session.

use log::info;

use std::io::{BufRead, Write};

use snafu::prelude::*;

use crate::ballot::*;

/// Runs the voting menu until the voter exits or the input ends.
pub fn run_session<R: BufRead, W: Write>(
    manager: &mut VoteManager,
    input: &mut R,
    output: &mut W,
) -> BallotResult<()> {
    info!("Starting console session for {:?}", manager.contest_name());
    loop {
        writeln!(output, "\n=== {} ===", manager.contest_name()).context(ConsoleSnafu {})?;
        writeln!(output, "1. Vote").context(ConsoleSnafu {})?;
        writeln!(output, "2. Show results").context(ConsoleSnafu {})?;
        writeln!(output, "3. Exit").context(ConsoleSnafu {})?;
        let choice = match prompt(input, output, "Choose an option: ")? {
            Some(c) => c,
            None => break,
        };
        match choice.as_str() {
            "1" => {
                if !vote(manager, input, output)? {
                    break;
                }
            }
            "2" => {
                write!(output, "{}", format_results(&manager.get_tally()))
                    .context(ConsoleSnafu {})?;
            }
            "3" => break,
            _ => {
                writeln!(output, "Invalid option.").context(ConsoleSnafu {})?;
            }
        }
    }
    writeln!(output, "Goodbye.").context(ConsoleSnafu {})?;
    Ok(())
}

// Returns false when the input ended.
fn vote<R: BufRead, W: Write>(
    manager: &mut VoteManager,
    input: &mut R,
    output: &mut W,
) -> BallotResult<bool> {
    let id = match prompt(input, output, "Enter your ID: ")? {
        Some(id) => id,
        None => return Ok(false),
    };
    // Refuse early, before showing the candidates.
    if let Err(e) = manager.validate(&id) {
        report(output, &e)?;
        return Ok(true);
    }
    if manager.has_voted(&id) {
        writeln!(output, "This ID has already voted.").context(ConsoleSnafu {})?;
        return Ok(true);
    }

    writeln!(output, "Candidates:").context(ConsoleSnafu {})?;
    for (idx, name) in manager.candidates().iter().enumerate() {
        writeln!(output, "  {}. {}", idx + 1, name).context(ConsoleSnafu {})?;
    }
    let text = format!("Enter your choice (1-{}): ", manager.candidates().len());
    let choice = match prompt(input, output, &text)? {
        Some(c) => c,
        None => return Ok(false),
    };
    let candidate = manager.resolve_candidate(&choice);
    match manager.cast_vote(&id, &candidate) {
        Ok(()) => {
            writeln!(output, "Your vote for {} has been recorded!", candidate)
                .context(ConsoleSnafu {})?;
        }
        Err(e) => report(output, &e)?,
    }
    Ok(true)
}

fn report<W: Write>(output: &mut W, e: &BallotError) -> BallotResult<()> {
    e.log("Error casting vote");
    writeln!(output, "{}", e.user_message()).context(ConsoleSnafu {})?;
    Ok(())
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> BallotResult<Option<String>> {
    write!(output, "{}", text).context(ConsoleSnafu {})?;
    output.flush().context(ConsoleSnafu {})?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context(ConsoleSnafu {})?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot::config_reader::BallotConfig;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn run(manager: &mut VoteManager, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output: Vec<u8> = Vec::new();
        run_session(manager, &mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn vote_then_show_results() {
        let dir = tempdir().unwrap();
        let mut manager = VoteManager::open(&BallotConfig::default_contest(), dir.path()).unwrap();
        let out = run(&mut manager, "1\nABCD\n2\n2\n3\n");
        assert!(out.contains("1. Leonardo DiCaprio"));
        assert!(out.contains("Your vote for Marlon Brando has been recorded!"));
        assert!(out.contains("Marlon Brando: 1 vote\n"));
        assert!(out.ends_with("Goodbye.\n"));
        assert!(manager.has_voted("ABCD"));
    }

    #[test]
    fn rejections_are_explained() {
        let dir = tempdir().unwrap();
        let mut manager = VoteManager::open(&BallotConfig::default_contest(), dir.path()).unwrap();
        manager.cast_vote("ABCD", "Johnny Depp").unwrap();
        let out = run(&mut manager, "1\nAB\n1\nABCD\n1\nEFGH\n9\n7\n");
        assert!(out.contains("Invalid ID."));
        assert!(out.contains("This ID has already voted."));
        assert!(out.contains("Please select a valid candidate."));
        assert!(out.contains("Invalid option."));
        assert!(!manager.has_voted("EFGH"));
        assert_eq!(manager.get_tally().total(), 1);
    }

    #[test]
    fn end_of_input_stops_session() {
        let dir = tempdir().unwrap();
        let mut manager = VoteManager::open(&BallotConfig::default_contest(), dir.path()).unwrap();
        let out = run(&mut manager, "1\nABCD\n");
        assert!(out.ends_with("Goodbye.\n"));
        assert!(!manager.has_voted("ABCD"));
    }
}
