use linereader::LineReader;
use std::io::{self, Read};

/// Feeds every line of `reader` to `f`, terminator included. Stops at the
/// first error, whether it came from reading or from the callback.
pub fn for_each_line<R, E, F>(reader: R, mut f: F) -> Result<(), E>
where
    R: Read,
    E: From<io::Error>,
    F: FnMut(&[u8]) -> Result<(), E>,
{
    let mut reader = LineReader::new(reader);
    while let Some(line) = reader.next_line() {
        f(line?)?;
    }
    Ok(())
}

/// Strips a trailing `\n` or `\r\n`.
pub fn trim_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[test]
fn trims_both_terminators() {
    assert_eq!(trim_newline(b"glas\tnoun\n"), b"glas\tnoun");
    assert_eq!(trim_newline(b"glas\tnoun\r\n"), b"glas\tnoun");
    assert_eq!(trim_newline(b"glas"), b"glas");
    assert_eq!(trim_newline(b"\n"), b"");
}

#[test]
fn reads_every_line_including_unterminated_last() {
    let input = std::io::Cursor::new("a\n\nb\nc");
    let mut seen = Vec::new();
    for_each_line(input, |line| -> Result<(), io::Error> {
        seen.push(String::from_utf8_lossy(line).to_string());
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, vec!["a\n", "\n", "b\n", "c"]);
}

#[test]
fn callback_error_stops_reading() {
    let input = std::io::Cursor::new("a\nb\nc\n");
    let mut count = 0;
    let result = for_each_line(input, |_| {
        count += 1;
        if count == 2 {
            Err(io::Error::new(io::ErrorKind::Other, "stop"))
        } else {
            Ok(())
        }
    });
    assert!(result.is_err());
    assert_eq!(count, 2);
}
