//! Line-oriented feed reader
//!
//! Feeds are plain text, one record per line, fields separated by `,`.
//! There is no quoting: a comma always splits. The reader yields every
//! line, header included; skipping the header is the pipeline's job.
//!
//! Bytes that are not valid UTF-8 (a Latin-1 surname, say) are replaced
//! with U+FFFD rather than failing the line.

use super::{FeedError, FeedResult};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::warn;
use std::path::{Path, PathBuf};

/// One physical line of a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLine {
    /// A line with content, split on `,` (fields are not trimmed)
    Fields { line: usize, fields: Vec<String> },
    /// An empty or whitespace-only line
    Blank { line: usize },
}

impl FeedLine {
    /// Parse a raw line; `line` is 1-based
    pub fn parse(line: usize, raw: &str) -> Self {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.trim().is_empty() {
            FeedLine::Blank { line }
        } else {
            FeedLine::Fields {
                line,
                fields: raw.split(',').map(str::to_string).collect(),
            }
        }
    }

    pub fn line(&self) -> usize {
        match self {
            FeedLine::Fields { line, .. } | FeedLine::Blank { line } => *line,
        }
    }
}

pub struct FeedReader<R> {
    path: PathBuf,
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl FeedReader<BufReader<File>> {
    /// Open a feed file
    pub fn open(path: impl AsRef<Path>) -> FeedResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| FeedError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self::with_path(BufReader::new(file), path))
    }
}

impl<R: BufRead> FeedReader<R> {
    /// Read a feed from any buffered source
    pub fn new(reader: R) -> Self {
        Self::with_path(reader, PathBuf::from("<memory>"))
    }

    fn with_path(reader: R, path: PathBuf) -> Self {
        Self {
            path,
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: BufRead> Iterator for FeedReader<R> {
    type Item = FeedResult<FeedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let bytes = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf);
                let raw = String::from_utf8_lossy(bytes);
                if let Cow::Owned(_) = raw {
                    warn!(
                        "Line {} of {:?} is not valid UTF-8; invalid bytes replaced",
                        self.line_no, self.path
                    );
                }
                Some(Ok(FeedLine::parse(self.line_no, &raw)))
            }
            Err(source) => Some(Err(FeedError::Io {
                path: self.path.clone(),
                source,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_fields() {
        let line = FeedLine::parse(3, "Paper A,Smith; Jones,SRDS,2014,Nara,Ruiz");
        match line {
            FeedLine::Fields { line, fields } => {
                assert_eq!(line, 3);
                assert_eq!(fields.len(), 6);
                assert_eq!(fields[1], "Smith; Jones");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_blank_and_crlf() {
        assert_eq!(FeedLine::parse(2, ""), FeedLine::Blank { line: 2 });
        assert_eq!(FeedLine::parse(2, "   \r"), FeedLine::Blank { line: 2 });
        assert_eq!(
            FeedLine::parse(4, "Ruiz,Smith\r"),
            FeedLine::Fields { line: 4, fields: vec!["Ruiz".into(), "Smith".into()] }
        );
    }

    #[test]
    fn test_reader_yields_every_line_numbered() {
        let input = "reviewer,author\nRuiz,Smith\n\nLee,Kim\n";
        let lines: Vec<FeedLine> = FeedReader::new(Cursor::new(input))
            .collect::<FeedResult<_>>()
            .unwrap();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].line(), 1);
        assert_eq!(lines[2], FeedLine::Blank { line: 3 });
        assert_eq!(lines[3].line(), 4);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let input: &[u8] = b"reviewer,author\nN\xfa\xf1ez,Smith\nLee,Kim";
        let lines: Vec<FeedLine> = FeedReader::new(Cursor::new(input))
            .collect::<FeedResult<_>>()
            .unwrap();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            FeedLine::Fields {
                line: 2,
                fields: vec!["N\u{FFFD}\u{FFFD}ez".into(), "Smith".into()]
            }
        );
        // Last line without a trailing newline
        assert_eq!(
            lines[2],
            FeedLine::Fields { line: 3, fields: vec!["Lee".into(), "Kim".into()] }
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = FeedReader::open("/definitely/not/here.csv").err().unwrap();
        assert!(matches!(err, FeedError::Io { .. }));
    }
}
