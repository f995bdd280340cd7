use std::{
    borrow::Borrow,
    fmt::Display,
};

use serde::{Deserialize, Serialize};

/// A canonically formatted, cadence-aligned period key.
///
/// Keys are opaque strings such as `20240105` (daily), `202401`
/// (monthly), `2024Q1` (quarterly) or `2024` (annual). Their ordering is
/// defined by [`Cadence::compare_periods`](crate::Cadence::compare_periods),
/// never by the string itself.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(String);

impl Period {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Period {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for Period {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for Period {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Period {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Period {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Period {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
