use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

pub(crate) const SQLITE_TAG: &str = "sqlite";
pub(crate) const ESV6_TAG: &str = "esv6";
pub(crate) const ESV7_TAG: &str = "esv7";
pub(crate) const MEMKV_TAG: &str = "memkv";

/// Tag naming a kind of backend (e.g. `"sqlite"`, `"esv7"`).
///
/// Tags are compared as lower-cased, trimmed strings, so a tag read from a
/// config file as `"ESv7"` is the same tag as [`BackendType::ESV7`].
///
/// # Examples
///
/// ```
/// use dbfactory::registry::BackendType;
///
/// let tag = BackendType::new("  SQLite ");
/// assert_eq!(tag, BackendType::SQLITE);
/// assert_eq!(tag.as_str(), "sqlite");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendType(Cow<'static, str>);

impl BackendType {
    /// Embedded relational database (SQLite).
    pub const SQLITE: BackendType = BackendType(Cow::Borrowed(SQLITE_TAG));
    /// Elasticsearch 6.x cluster.
    pub const ESV6: BackendType = BackendType(Cow::Borrowed(ESV6_TAG));
    /// Elasticsearch 7.x cluster.
    pub const ESV7: BackendType = BackendType(Cow::Borrowed(ESV7_TAG));
    /// In-process key-value cache.
    pub const MEMKV: BackendType = BackendType(Cow::Borrowed(MEMKV_TAG));

    /// Create a tag from text, trimming and lower-casing it.
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Cow::Owned(tag.as_ref().trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for BackendType {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl From<&BackendType> for BackendType {
    fn from(tag: &BackendType) -> Self {
        tag.clone()
    }
}

impl FromStr for BackendType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl Serialize for BackendType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BackendType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::new(tag))
    }
}
