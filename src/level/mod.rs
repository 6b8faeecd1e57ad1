//! Level maps
//!
//! A level is a plain text file: one character per track cell, one line per
//! row. The bottom line of the file is the start of the track. Optional
//! `<start>` and `<end>` marker lines bound the playable region.
//!
//! Rows are padded with gaps or truncated to `TRACK_COLUMNS` cells; nothing
//! about a row's content is an error.

pub mod manifest;
pub mod palette;

pub use manifest::{LevelManifest, ManifestEntry};
pub use palette::Palette;

use crate::consts::TRACK_COLUMNS;

const START_MARKER: &str = "<start>";
const END_MARKER: &str = "<end>";

/// Errors raised while loading level data
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("invalid level manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid color {value:?} for tile {key:?}")]
    BadColor { key: String, value: String },
    #[error("level {name:?} has no rows")]
    Empty { name: String },
    #[error("level manifest lists no levels")]
    EmptyManifest,
}

/// A parsed level, rows ordered from track start to track end
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub name: String,
    rows: Vec<Vec<char>>,
    pub palette: Palette,
}

impl Level {
    /// Parse level text
    pub fn parse(name: &str, text: &str, palette: Palette) -> Result<Self, LevelError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();

        let body = playable_region(&lines);

        let rows: Vec<Vec<char>> = body
            .iter()
            .rev()
            .map(|line| {
                let mut row: Vec<char> = line.chars().take(TRACK_COLUMNS).collect();
                row.resize(TRACK_COLUMNS, ' ');
                row
            })
            .collect();

        if rows.is_empty() {
            return Err(LevelError::Empty {
                name: name.to_string(),
            });
        }

        log::debug!("Parsed level {:?}: {} rows", name, rows.len());
        Ok(Self {
            name: name.to_string(),
            rows,
            palette,
        })
    }

    /// Number of rows (track length in segments)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index`, counted from the track start; always `TRACK_COLUMNS` wide
    pub fn row(&self, index: usize) -> &[char] {
        &self.rows[index]
    }
}

/// Lines between the markers; without markers, the whole file minus blank
/// lines at either end (a trailing newline must not become a gap at the start)
fn playable_region<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let start = lines
        .iter()
        .position(|line| line.trim() == START_MARKER)
        .map(|i| i + 1);
    let end = lines
        .iter()
        .rposition(|line| line.trim() == END_MARKER);

    match (start, end) {
        (None, None) => {
            let first = lines.iter().position(|line| !line.is_empty());
            let last = lines.iter().rposition(|line| !line.is_empty());
            match (first, last) {
                (Some(first), Some(last)) => &lines[first..=last],
                _ => &[],
            }
        }
        (start, end) => {
            let start = start.unwrap_or(0);
            let end = end.unwrap_or(lines.len());
            if start <= end { &lines[start..end] } else { &[] }
        }
    }
}

/// All levels of a run, in play order
#[derive(Debug, Clone)]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyManifest);
        }
        Ok(Self { levels })
    }

    /// A set holding a single level
    pub fn single(level: Level) -> Self {
        Self {
            levels: vec![level],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at `index` (wraps around)
    pub fn get(&self, index: usize) -> &Level {
        &self.levels[index % self.levels.len()]
    }

    /// Index of the level after `index`, wrapping to the first
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Level {
        Level::parse("test", text, Palette::default()).unwrap()
    }

    #[test]
    fn test_rows_reversed_so_file_bottom_is_start() {
        let level = parse("5555555\n1111111\n");
        assert_eq!(level.len(), 2);
        assert_eq!(level.row(0)[0], '1');
        assert_eq!(level.row(1)[0], '5');
    }

    #[test]
    fn test_rows_padded_and_truncated() {
        let level = parse("12\n123456789\n");
        assert_eq!(level.row(0), &['1', '2', '3', '4', '5', '6', '7']);
        assert_eq!(level.row(1), &['1', '2', ' ', ' ', ' ', ' ', ' ']);
    }

    #[test]
    fn test_markers_bound_region() {
        let level = parse("title text\n<start>\n3333333\n\n1111111\n<end>\ncredits\n");
        assert_eq!(level.len(), 3);
        assert_eq!(level.row(0)[0], '1');
        assert!(level.row(1).iter().all(|&c| c == ' '));
        assert_eq!(level.row(2)[0], '3');
    }

    #[test]
    fn test_only_start_marker() {
        let level = parse("junk\n<start>\n2222222\n");
        assert_eq!(level.len(), 1);
        assert_eq!(level.row(0)[0], '2');
    }

    #[test]
    fn test_blank_edges_trimmed_without_markers() {
        let level = parse("\n\n1111111\n   \n1111111\n\n");
        assert_eq!(level.len(), 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let level = parse("1111111\r\n2222222\r\n");
        assert_eq!(level.row(0)[6], '2');
    }

    #[test]
    fn test_empty_level_is_error() {
        assert!(matches!(
            Level::parse("void", "\n\n", Palette::default()),
            Err(LevelError::Empty { .. })
        ));
        assert!(matches!(
            Level::parse("void", "<start>\n<end>\n", Palette::default()),
            Err(LevelError::Empty { .. })
        ));
    }

    #[test]
    fn test_level_set_wraps() {
        let set = LevelSet::new(vec![parse("1\n"), parse("2\n")]).unwrap();
        assert_eq!(set.next_index(0), 1);
        assert_eq!(set.next_index(1), 0);
        assert!(LevelSet::new(Vec::new()).is_err());
    }
}
