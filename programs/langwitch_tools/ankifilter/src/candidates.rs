use crate::error::FilterError;
use fnv::FnvHashSet;
use log::debug;
use std::io::{Read, Write};
use term_macros::{for_each_line, trim_newline};

/// One line of a Duolingo word list.
#[derive(Debug, PartialEq, Clone)]
pub struct Candidate<'a> {
    pub word: &'a str,
    /// Noun, Verb, Adjective...
    pub part_of_speech: &'a str,
    /// When the word was last practiced. Unused.
    pub last_practiced: &'a str,
    pub extra: &'a str,
}

/// Splits a line (without its terminator) into exactly four tab-separated fields.
pub fn parse_candidate(line: &str, line_number: usize) -> Result<Candidate<'_>, FilterError> {
    let mut fields = line.split('\t');
    match (fields.next(), fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(word), Some(part_of_speech), Some(last_practiced), Some(extra), None) => Ok(Candidate {
            word,
            part_of_speech,
            last_practiced,
            extra,
        }),
        _ => Err(FilterError::Parse {
            line_number,
            fields: line.split('\t').count(),
            line: line.to_string(),
        }),
    }
}

pub struct Filter {
    known: FnvHashSet<String>,
    parts_of_speech: FnvHashSet<String>,
}

impl Filter {
    /// An empty `parts_of_speech` keeps every part of speech.
    pub fn new<K, P>(known: K, parts_of_speech: P) -> Self
    where
        K: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        Filter {
            known: known.into_iter().collect(),
            parts_of_speech: parts_of_speech.into_iter().collect(),
        }
    }

    pub fn known_words(&self) -> usize {
        self.known.len()
    }

    pub fn accepts(&self, candidate: &Candidate) -> bool {
        let wanted = self.parts_of_speech.is_empty()
            || self.parts_of_speech.contains(candidate.part_of_speech);
        wanted && !self.known.contains(candidate.word)
    }
}

/// Runs every line of `reader` through `filter`, calling `on_accept` for the
/// ones it keeps, in order. Empty lines are skipped; any other malformed line
/// ends the run. Returns how many candidates were accepted.
pub fn filter_lines<R, F>(reader: R, filter: &Filter, mut on_accept: F) -> Result<usize, FilterError>
where
    R: Read,
    F: FnMut(&Candidate) -> Result<(), FilterError>,
{
    let mut line_number = 0;
    let mut accepted = 0;
    for_each_line(reader, |raw| -> Result<(), FilterError> {
        line_number += 1;
        let raw = trim_newline(raw);
        if raw.is_empty() {
            debug!("skipping empty line {}", line_number);
            return Ok(());
        }
        let line = std::str::from_utf8(raw).map_err(|_| FilterError::Encoding { line_number })?;
        let candidate = parse_candidate(line, line_number)?;
        if filter.accepts(&candidate) {
            accepted += 1;
            on_accept(&candidate)?;
        }
        Ok(())
    })?;
    Ok(accepted)
}

/// Writes `word - part_of_speech` for each accepted line as soon as it's found,
/// then the count. On failure the count is left out.
pub fn write_report<R: Read, W: Write>(reader: R, filter: &Filter, out: &mut W) -> Result<usize, FilterError> {
    let count = filter_lines(reader, filter, |candidate| {
        writeln!(out, "{} - {}", candidate.word, candidate.part_of_speech)?;
        out.flush()?;
        Ok(())
    })?;
    debug!("accepted {} words", count);
    writeln!(out, "{}", count)?;
    out.flush()?;
    Ok(count)
}

#[cfg(test)]
fn filter(known: &[&str], parts_of_speech: &[&str]) -> Filter {
    Filter::new(
        known.iter().map(|s| s.to_string()),
        parts_of_speech.iter().map(|s| s.to_string()),
    )
}

#[cfg(test)]
fn report(input: &str, filter: &Filter) -> (Result<usize, FilterError>, String) {
    let mut out = Vec::new();
    let result = write_report(std::io::Cursor::new(input), filter, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn parses_four_fields() {
    let candidate = parse_candidate("Glas\tNoun\t33 minutes ago\t", 1).unwrap();
    assert_eq!(
        candidate,
        Candidate {
            word: "Glas",
            part_of_speech: "Noun",
            last_practiced: "33 minutes ago",
            extra: "",
        }
    );
}

#[test]
fn wrong_field_count_is_a_parse_error() {
    for (line, count) in [("Glas\tNoun\tnow", 3), ("Glas", 1), ("a\tb\tc\td\te", 5), ("a\tb\tc\td\t", 5)] {
        match parse_candidate(line, 7) {
            Err(FilterError::Parse { line_number, fields, line: reported }) => {
                assert_eq!(line_number, 7);
                assert_eq!(fields, count);
                assert_eq!(reported, line);
            }
            other => panic!("expected a parse error for {:?}, got {:?}", line, other),
        }
    }
}

#[test]
fn known_word_is_dropped() {
    let (result, out) = report("run\tverb\tx\ty\nwalk\tverb\tx\ty\n", &filter(&["run"], &[]));
    assert_eq!(result.unwrap(), 1);
    assert_eq!(out, "walk - verb\n1\n");
}

#[test]
fn allowed_part_of_speech_is_kept() {
    let (result, out) = report("jump\tverb\tx\ty\n", &filter(&[], &["verb"]));
    assert_eq!(result.unwrap(), 1);
    assert_eq!(out, "jump - verb\n1\n");
}

#[test]
fn other_part_of_speech_is_dropped() {
    let (result, out) = report("jump\tverb\tx\ty\n", &filter(&[], &["noun"]));
    assert_eq!(result.unwrap(), 0);
    assert_eq!(out, "0\n");
}

#[test]
fn no_allow_list_keeps_every_part_of_speech() {
    let input = "Hund\tNoun\tx\ty\nlaufen\tVerb\tx\ty\nschnell\tAdverb\tx\ty\n";
    let mut words = Vec::new();
    let count = filter_lines(std::io::Cursor::new(input), &filter(&["Hund"], &[]), |candidate| {
        words.push((candidate.word.to_string(), candidate.part_of_speech.to_string()));
        Ok(())
    })
    .unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        words,
        vec![
            ("laufen".to_string(), "Verb".to_string()),
            ("schnell".to_string(), "Adverb".to_string()),
        ]
    );
}

#[test]
fn overlong_field_never_becomes_known() {
    let long = "a".repeat(31);
    let known: Vec<String> = crate::store::split_fields(&format!("{}\x1fb", long))
        .map(str::to_string)
        .collect();
    let filter = Filter::new(known, Vec::new());
    let (result, out) = report(&format!("{}\tnoun\tx\ty\nb\tnoun\tx\ty\n", long), &filter);
    assert_eq!(result.unwrap(), 1);
    assert_eq!(out, format!("{} - noun\n1\n", long));
}

#[test]
fn empty_lines_are_skipped() {
    let (result, out) = report("eins\tnum\tx\ty\n\nzwei\tnum\tx\ty\n", &filter(&[], &[]));
    assert_eq!(result.unwrap(), 2);
    assert_eq!(out, "eins - num\nzwei - num\n2\n");
}

#[test]
fn crlf_lines_are_accepted() {
    let (result, out) = report("eins\tnum\tx\ty\r\n\r\nzwei\tnum\tx\ty", &filter(&[], &["num"]));
    assert_eq!(result.unwrap(), 2);
    assert_eq!(out, "eins - num\nzwei - num\n2\n");
}

#[test]
fn short_line_aborts_without_count() {
    let input = "eins\tnum\tx\ty\nzwei\tnum\tx\ndrei\tnum\tx\ty\n";
    let (result, out) = report(input, &filter(&[], &[]));
    match result {
        Err(FilterError::Parse { line_number, fields, .. }) => {
            assert_eq!(line_number, 2);
            assert_eq!(fields, 3);
        }
        other => panic!("expected a parse error, got {:?}", other),
    }
    assert_eq!(out, "eins - num\n");
}

#[test]
fn invalid_utf8_aborts() {
    let mut out = Vec::new();
    let input: &[u8] = b"eins\tnum\tx\ty\n\xff\tnum\tx\ty\n";
    let result = write_report(input, &filter(&[], &[]), &mut out);
    assert!(matches!(result, Err(FilterError::Encoding { line_number: 2 })));
    assert_eq!(out, b"eins - num\n");
}

#[test]
fn duplicates_are_kept_in_order() {
    let input = "b\tnoun\tx\ty\na\tnoun\tx\ty\nb\tnoun\tx\ty\n";
    let (result, out) = report(input, &filter(&["a", "a"], &[]));
    assert_eq!(result.unwrap(), 2);
    assert_eq!(out, "b - noun\nb - noun\n2\n");
}

#[test]
fn count_matches_printed_lines_and_output_is_repeatable() {
    let input = "Hund\tNoun\tx\ty\nKatze\tNoun\tx\ty\nlaufen\tVerb\tx\ty\n\nrot\tAdjective\tx\ty\n";
    let filter = filter(&["Katze"], &["Noun", "Adjective"]);
    let (first, out) = report(input, &filter);
    let (second, again) = report(input, &filter);
    assert_eq!(out, again);
    assert_eq!(first.unwrap(), second.unwrap());

    let lines: Vec<_> = out.lines().collect();
    let (count, records) = lines.split_last().unwrap();
    assert_eq!(count.parse::<usize>().unwrap(), records.len());
    assert_eq!(records, &["Hund - Noun", "rot - Adjective"]);
}

/// Remembers what had been written each time it was flushed.
#[cfg(test)]
#[derive(Default)]
struct FlushRecorder {
    pending: Vec<u8>,
    flushed: Vec<String>,
}

#[cfg(test)]
impl Write for FlushRecorder {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            self.flushed.push(String::from_utf8_lossy(&self.pending).to_string());
            self.pending.clear();
        }
        Ok(())
    }
}

#[test]
fn each_record_is_flushed_when_accepted() {
    let input = "jump\tverb\tx\ty\nHund\tnoun\tx\ty\nwalk\tverb\tx\ty\n";
    let mut out = FlushRecorder::default();
    let count = write_report(std::io::Cursor::new(input), &filter(&[], &["verb"]), &mut out).unwrap();
    assert_eq!(count, 2);
    assert_eq!(out.flushed, vec!["jump - verb\n", "walk - verb\n", "2\n"]);
    assert!(out.pending.is_empty());
}

#[test]
fn records_before_a_bad_line_are_already_flushed() {
    let mut out = FlushRecorder::default();
    let result = write_report(std::io::Cursor::new("jump\tverb\tx\ty\nbad\n"), &filter(&[], &[]), &mut out);
    assert!(matches!(result, Err(FilterError::Parse { line_number: 2, .. })));
    assert_eq!(out.flushed, vec!["jump - verb\n"]);
}
