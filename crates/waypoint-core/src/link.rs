use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

/// The short, case-sensitive key a caller is redirected through.
///
/// Names are stored and compared verbatim; the registry does not impose a
/// character set or length on them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkName(String);

impl LinkName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LinkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The redirect target of a link. Stored and returned verbatim, never
/// validated as a well-formed URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteUrl(String);

impl RemoteUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Wraps a stored value, treating the empty string as absent.
    pub fn non_empty(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        (!url.is_empty()).then_some(Self(url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for RemoteUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every entry of a store keyed by name.
pub type LinkTable = BTreeMap<LinkName, RemoteUrl>;

/// A single `name -> url` mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkEntry {
    pub name: LinkName,
    pub url: RemoteUrl,
}

impl LinkEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: LinkName::new(name),
            url: RemoteUrl::new(url),
        }
    }

    /// Converts the entry into a one-element table, the shape it takes on
    /// the wire.
    pub fn into_table(self) -> LinkTable {
        LinkTable::from([(self.name, self.url)])
    }
}
