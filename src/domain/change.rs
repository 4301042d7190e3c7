use std::fmt;

/// Classification of a single working-tree change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

impl ChangeStatus {
    /// Classify a two-column short status code (`"M "`, `" D"`, `"??"`, ...).
    ///
    /// The staged column wins over the worktree column when both are set.
    pub fn from_short_code(code: &str) -> Self {
        let mut chars = code.chars();
        let index = chars.next().unwrap_or(' ');
        let worktree = chars.next().unwrap_or(' ');

        if index == '?' && worktree == '?' {
            return ChangeStatus::Added;
        }

        let primary = if index != ' ' { index } else { worktree };
        match primary {
            'A' => ChangeStatus::Added,
            'M' => ChangeStatus::Modified,
            'D' => ChangeStatus::Deleted,
            'R' => ChangeStatus::Renamed,
            _ => ChangeStatus::Other,
        }
    }

    /// Single-letter code used in previews and prompts.
    pub fn code(&self) -> char {
        match self {
            ChangeStatus::Added => 'A',
            ChangeStatus::Modified => 'M',
            ChangeStatus::Deleted => 'D',
            ChangeStatus::Renamed => 'R',
            ChangeStatus::Other => '?',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Renamed => "renamed",
            ChangeStatus::Other => "other",
        }
    }
}

/// One entry of the working-tree status, in status-report order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub status: ChangeStatus,
    pub path: String,
}

impl ChangeEntry {
    pub fn new(status: ChangeStatus, path: impl Into<String>) -> Self {
        ChangeEntry {
            status,
            path: path.into(),
        }
    }

    /// Parse one line of short-form status output (`XY path`).
    ///
    /// Rename lines (`R  old -> new`) keep the new path.
    pub fn parse_short_line(line: &str) -> Option<Self> {
        if line.trim().is_empty() || line.len() < 3 {
            return None;
        }

        let code = line.get(..2)?;
        let path = line.get(2..)?.trim();
        if path.is_empty() {
            return None;
        }

        let status = ChangeStatus::from_short_code(code);
        let path = match (status, path.split_once(" -> ")) {
            (ChangeStatus::Renamed, Some((_, new_path))) => new_path,
            _ => path,
        };

        Some(ChangeEntry::new(status, path))
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.code(), self.path)
    }
}

/// Per-status counts over a change set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub renamed: usize,
    pub other: usize,
}

impl ChangeSummary {
    pub fn from_changes(changes: &[ChangeEntry]) -> Self {
        let mut summary = ChangeSummary::default();
        for change in changes {
            match change.status {
                ChangeStatus::Added => summary.added += 1,
                ChangeStatus::Modified => summary.modified += 1,
                ChangeStatus::Deleted => summary.deleted += 1,
                ChangeStatus::Renamed => summary.renamed += 1,
                ChangeStatus::Other => summary.other += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.added + self.modified + self.deleted + self.renamed + self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ChangeStatus::from_short_code("M "), ChangeStatus::Modified);
        assert_eq!(ChangeStatus::from_short_code(" M"), ChangeStatus::Modified);
        assert_eq!(ChangeStatus::from_short_code("A "), ChangeStatus::Added);
        assert_eq!(ChangeStatus::from_short_code("??"), ChangeStatus::Added);
        assert_eq!(ChangeStatus::from_short_code(" D"), ChangeStatus::Deleted);
        assert_eq!(ChangeStatus::from_short_code("R "), ChangeStatus::Renamed);
        assert_eq!(ChangeStatus::from_short_code("UU"), ChangeStatus::Other);
    }

    #[test]
    fn test_parse_short_line() {
        let entry = ChangeEntry::parse_short_line(" M src/main.rs").unwrap();
        assert_eq!(entry, ChangeEntry::new(ChangeStatus::Modified, "src/main.rs"));
    }

    #[test]
    fn test_parse_rename_keeps_new_path() {
        let entry = ChangeEntry::parse_short_line("R  old.txt -> new.txt").unwrap();
        assert_eq!(entry.status, ChangeStatus::Renamed);
        assert_eq!(entry.path, "new.txt");
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(ChangeEntry::parse_short_line("").is_none());
        assert!(ChangeEntry::parse_short_line("   ").is_none());
    }

    #[test]
    fn test_summary_counts() {
        let changes = vec![
            ChangeEntry::new(ChangeStatus::Added, "a"),
            ChangeEntry::new(ChangeStatus::Modified, "b"),
            ChangeEntry::new(ChangeStatus::Modified, "c"),
            ChangeEntry::new(ChangeStatus::Deleted, "d"),
        ];
        let summary = ChangeSummary::from_changes(&changes);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.modified, 2);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_display() {
        let entry = ChangeEntry::new(ChangeStatus::Deleted, "old/file.rs");
        assert_eq!(entry.to_string(), "D old/file.rs");
    }
}
