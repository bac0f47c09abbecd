//! Lists the words of a Duolingo word list that aren't in an Anki collection yet.
//!
//! The word list comes in on stdin, one word per line in the form
//!
//! ```text
//! <Word>\t<Part of speech>\t<Last practiced>\t<anything>
//! ```
//!
//! Every line that survives is printed as `word - part of speech`, followed by
//! the number of lines printed.
use clap::Parser;
use log::info;
use std::path::PathBuf;

mod candidates;
mod error;
mod store;

use candidates::{write_report, Filter};
use error::FilterError;

/// Filters a Duolingo word list (on stdin) down to the words an Anki collection doesn't have
#[derive(Parser, Debug)]
struct Args {
    /// The database file for Anki
    anki_database: PathBuf,

    /// The parts of speech to get. Every part of speech is kept if none are given
    parts_of_speech: Vec<String>,
}

fn main() -> Result<(), FilterError> {
    term_macros::init_logger();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> Result<(), FilterError> {
    let fields = store::known_fields(&args.anki_database)?;
    info!("loaded {} fields from {:?}", fields.len(), args.anki_database);

    let filter = Filter::new(fields, args.parts_of_speech);
    info!("{} distinct known words", filter.known_words());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    write_report(stdin.lock(), &filter, &mut stdout.lock())?;
    Ok(())
}

#[test]
fn database_is_required() {
    assert!(Args::try_parse_from(["ankifilter"]).is_err());
}

#[test]
fn parts_of_speech_are_optional() {
    let args = Args::try_parse_from(["ankifilter", "collection.anki2"]).unwrap();
    assert_eq!(args.anki_database, PathBuf::from("collection.anki2"));
    assert!(args.parts_of_speech.is_empty());

    let args = Args::try_parse_from(["ankifilter", "collection.anki2", "Noun", "Verb"]).unwrap();
    assert_eq!(args.parts_of_speech, vec!["Noun", "Verb"]);
}

#[test]
fn cli_is_well_formed() {
    use clap::CommandFactory;
    Args::command().debug_assert();
}

#[test]
fn missing_database_fails_before_reading_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let args = Args {
        anki_database: dir.path().join("collection.anki2"),
        parts_of_speech: vec!["Noun".to_string()],
    };
    assert!(matches!(run(args), Err(FilterError::Store { .. })));
}
