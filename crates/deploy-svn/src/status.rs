//! Parsing of `svn status --quiet --ignore-externals`

/// Locally modified entries of a working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalStatus {
    /// Raw status lines of versioned entries with local changes
    pub modified: Vec<String>,
}

impl LocalStatus {
    /// Collect modified entries from quiet status output.
    ///
    /// Unversioned (`?`) entries and externals definitions (`X`) are not
    /// local modifications; neither are the blank separator lines or the
    /// headers printed for externals.
    pub fn parse(output: &str) -> Self {
        let modified = output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| !line.starts_with("Performing status on external item"))
            .filter(|line| !matches!(line.chars().next(), Some('?') | Some('X')))
            .map(str::to_string)
            .collect();

        Self { modified }
    }

    pub fn is_dirty(&self) -> bool {
        !self.modified.is_empty()
    }
}
