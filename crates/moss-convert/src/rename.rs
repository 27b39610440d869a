//! The rename table.
//!
//! A CSV file with two columns maps detected source names to output
//! names. Blank lines and `#` comments are ignored; when a source name
//! appears twice, the last assignment wins.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Source-name to target-name mapping.
#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    map: HashMap<String, String>,
}

impl RenameTable {
    /// Creates an empty table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses CSV text into a table.
    pub fn from_csv(text: &str) -> PipelineResult<Self> {
        let mut map = HashMap::new();
        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split(',');
            let (Some(source), Some(target), None) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(PipelineError::RenameSyntax { line: index + 1 });
            };
            map.insert(source.trim().to_string(), target.trim().to_string());
        }
        Ok(Self { map })
    }

    /// Reads and parses a CSV file.
    pub fn from_csv_file(path: &Path) -> PipelineResult<Self> {
        Self::from_csv(&std::fs::read_to_string(path)?)
    }

    /// Looks up the target name for a source name.
    pub fn lookup(&self, source_name: &str) -> Option<&str> {
        self.map.get(source_name).map(String::as_str)
    }

    /// Returns true if no mapping is defined.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let table = RenameTable::from_csv("# header\n\nOld Name,New Name\n  \n").unwrap();
        assert_eq!(table.lookup("Old Name"), Some("New Name"));
        assert_eq!(table.lookup("Other"), None);
    }

    #[test]
    fn test_last_assignment_wins() {
        let table = RenameTable::from_csv("A,First\nA,Second").unwrap();
        assert_eq!(table.lookup("A"), Some("Second"));
    }

    #[test]
    fn test_fields_are_trimmed() {
        let table = RenameTable::from_csv(" A , B ").unwrap();
        assert_eq!(table.lookup("A"), Some("B"));
    }

    #[test]
    fn test_wrong_field_count_is_an_error() {
        assert!(matches!(
            RenameTable::from_csv("only-one-field"),
            Err(PipelineError::RenameSyntax { line: 1 })
        ));
        assert!(matches!(
            RenameTable::from_csv("a,b\nx,y,z"),
            Err(PipelineError::RenameSyntax { line: 2 })
        ));
    }
}
