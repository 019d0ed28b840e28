//! Subversion revision identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A revision as accepted by `svn -r`.
///
/// Keywords are case-insensitive on input and rendered upper-case. Numbers
/// may carry an `r` prefix (`r42`). Dates keep their braces (`{2024-01-31}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRevision", into = "String")]
pub enum Revision {
    #[default]
    Head,
    Base,
    Committed,
    Prev,
    Number(u64),
    Date(String),
}

impl Revision {
    /// The revision number, if this is a concrete revision.
    pub fn number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the revision must be resolved against the repository
    /// before it can be compared with a working copy revision.
    pub fn is_symbolic(&self) -> bool {
        !matches!(self, Self::Number(_))
    }
}

impl FromStr for Revision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let invalid = || Error::InvalidRevision {
            value: s.to_string(),
        };

        match value.to_ascii_uppercase().as_str() {
            "HEAD" => return Ok(Self::Head),
            "BASE" => return Ok(Self::Base),
            "COMMITTED" => return Ok(Self::Committed),
            "PREV" => return Ok(Self::Prev),
            _ => {}
        }

        if value.starts_with('{') && value.ends_with('}') && value.len() > 2 {
            return Ok(Self::Date(value.to_string()));
        }

        let digits = value
            .strip_prefix('r')
            .or_else(|| value.strip_prefix('R'))
            .unwrap_or(value);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.parse().map(Self::Number).map_err(|_| invalid())
    }
}

/// Revision as written in request files, where bare numbers are common.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRevision {
    Number(u64),
    Text(String),
}

impl TryFrom<RawRevision> for Revision {
    type Error = Error;

    fn try_from(value: RawRevision) -> Result<Self, Self::Error> {
        match value {
            RawRevision::Number(n) => Ok(Self::Number(n)),
            RawRevision::Text(text) => text.parse(),
        }
    }
}

impl TryFrom<String> for Revision {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Revision> for String {
    fn from(value: Revision) -> Self {
        value.to_string()
    }
}

impl From<u64> for Revision {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("HEAD"),
            Self::Base => f.write_str("BASE"),
            Self::Committed => f.write_str("COMMITTED"),
            Self::Prev => f.write_str("PREV"),
            Self::Number(n) => write!(f, "{}", n),
            Self::Date(d) => f.write_str(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("HEAD", Revision::Head)]
    #[case("head", Revision::Head)]
    #[case("BASE", Revision::Base)]
    #[case("Committed", Revision::Committed)]
    #[case("PREV", Revision::Prev)]
    #[case("42", Revision::Number(42))]
    #[case("r1337", Revision::Number(1337))]
    #[case(" 7 ", Revision::Number(7))]
    #[case("{2024-01-31}", Revision::Date("{2024-01-31}".into()))]
    fn parses_valid_revisions(#[case] input: &str, #[case] expected: Revision) {
        assert_eq!(input.parse::<Revision>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("r")]
    #[case("-1")]
    #[case("12abc")]
    #[case("{}")]
    #[case("tip")]
    fn rejects_invalid_revisions(#[case] input: &str) {
        assert!(matches!(
            input.parse::<Revision>(),
            Err(Error::InvalidRevision { .. })
        ));
    }

    #[test]
    fn default_is_head() {
        assert_eq!(Revision::default(), Revision::Head);
        assert!(Revision::default().is_symbolic());
        assert!(!Revision::Number(3).is_symbolic());
    }

    #[test]
    fn serde_uses_svn_spelling() {
        let json = serde_json::to_string(&Revision::Number(12)).unwrap();
        assert_eq!(json, "\"12\"");
        let parsed: Revision = serde_json::from_str("\"r12\"").unwrap();
        assert_eq!(parsed, Revision::Number(12));
        assert!(serde_json::from_str::<Revision>("\"tip\"").is_err());
    }

    #[test]
    fn bare_numbers_deserialize() {
        let parsed: Revision = serde_json::from_str("1234").unwrap();
        assert_eq!(parsed, Revision::Number(1234));
    }
}
