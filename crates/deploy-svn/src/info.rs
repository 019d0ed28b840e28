//! Parsing of `svn info` and revision-reporting output

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Fields of `svn info` the reconciler relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnInfo {
    pub url: String,
    pub repository_root: Option<String>,
    pub revision: u64,
}

impl SvnInfo {
    /// Parse the `Key: Value` block printed by `svn info` (C locale).
    ///
    /// Only the first entry is read when several targets were queried.
    pub fn parse(output: &str) -> Result<Self> {
        let mut url = None;
        let mut repository_root = None;
        let mut revision = None;

        for line in output.lines() {
            if line.trim().is_empty() {
                if url.is_some() || revision.is_some() {
                    break;
                }
                continue;
            }
            let Some((key, value)) = line.split_once(": ") else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "URL" => url = Some(value.to_string()),
                "Repository Root" => repository_root = Some(value.to_string()),
                "Revision" => {
                    revision = Some(value.parse::<u64>().map_err(|_| Error::Parse {
                        what: "info".into(),
                        message: format!("revision '{}' is not a number", value),
                    })?)
                }
                _ => {}
            }
        }

        let missing = |field: &str| Error::Parse {
            what: "info".into(),
            message: format!("missing '{}' field", field),
        };

        Ok(Self {
            url: url.ok_or_else(|| missing("URL"))?,
            repository_root,
            revision: revision.ok_or_else(|| missing("Revision"))?,
        })
    }
}

static REPORTED_REVISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:Checked out|Exported|Updated to|At) revision (\d+)\.\s*$")
        .expect("Invalid reported revision regex")
});

/// Extract the revision announced at the end of a checkout, export,
/// update or switch (`Checked out revision 12.`, `Exported revision 12.`,
/// `Updated to revision 12.`, `At revision 12.`).
///
/// The last announcement wins; externals print their own lines first.
pub fn reported_revision(stdout: &str) -> Option<u64> {
    REPORTED_REVISION
        .captures_iter(stdout)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
