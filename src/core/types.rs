//! core::types
//!
//! Strong types for repository facts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier, stored as raw hash bytes
//! - [`RefName`] - Validated Git reference name
//! - [`Ref`] - A named pointer to an object id
//!
//! # Validation
//!
//! These types enforce validity at construction time. Values read back from
//! a repository go through the same constructors, so a malformed ref never
//! reaches build logic.
//!
//! # Examples
//!
//! ```
//! use gitfacts::core::types::{Oid, RefName};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short(7), "abc123d");
//!
//! let tag = RefName::new("refs/tags/v1.0.0").unwrap();
//! assert_eq!(tag.short(), "v1.0.0");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! assert!(RefName::new("refs/heads/bad..name").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// The hash is held as raw bytes. Equality is an exact comparison of the
/// full hash; two ids that share a prefix are still different ids.
///
/// # Example
///
/// ```
/// use gitfacts::core::types::Oid;
///
/// // Parsing is case-insensitive, display is lowercase
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.to_string(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.as_bytes().len(), 20);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(Vec<u8>);

impl Oid {
    /// Byte length of a SHA-1 object id.
    pub const SHA1_LEN: usize = 20;

    /// Byte length of a SHA-256 object id.
    pub const SHA256_LEN: usize = 32;

    /// Parse an object id from its hex form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not 40 or 64 hex
    /// characters.
    pub fn new(hex_id: impl AsRef<str>) -> Result<Self, TypeError> {
        let hex_id = hex_id.as_ref();
        let bytes = hex::decode(hex_id)
            .map_err(|e| TypeError::InvalidOid(format!("{hex_id}: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Build an object id from raw hash bytes.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` unless `bytes` is 20 or 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != Self::SHA1_LEN && bytes.len() != Self::SHA256_LEN {
            return Err(TypeError::InvalidOid(format!(
                "expected {} or {} bytes, got {}",
                Self::SHA1_LEN,
                Self::SHA256_LEN,
                bytes.len()
            )));
        }
        Ok(Self(bytes.to_vec()))
    }

    /// The raw hash bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get an abbreviated hex form of the id.
    ///
    /// If `len` exceeds the full hex length, the full id is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use gitfacts::core::types::Oid;
    ///
    /// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(oid.short(4), "abc1");
    /// assert_eq!(oid.short(100).len(), 40);
    /// ```
    pub fn short(&self, len: usize) -> String {
        let mut full = hex::encode(&self.0);
        full.truncate(len);
        full
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.to_string()
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl std::fmt::Debug for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Oid({})", self)
    }
}

/// A validated Git reference name.
///
/// Accepts full names under `refs/` as well as the top-level pseudo refs
/// such as `HEAD`.
///
/// # Example
///
/// ```
/// use gitfacts::core::types::RefName;
///
/// let branch = RefName::new("refs/heads/feature/foo").unwrap();
/// assert_eq!(branch.as_str(), "refs/heads/feature/foo");
/// assert_eq!(branch.short(), "feature/foo");
///
/// assert_eq!(RefName::head().as_str(), "HEAD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    const HEADS: &'static str = "refs/heads/";
    const TAGS: &'static str = "refs/tags/";
    const REMOTES: &'static str = "refs/remotes/";

    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// The `HEAD` ref.
    pub fn head() -> Self {
        Self("HEAD".to_string())
    }

    /// The full ref name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form with the `refs/heads/`, `refs/tags/` or
    /// `refs/remotes/` prefix removed.
    ///
    /// Names outside those namespaces are returned unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use gitfacts::core::types::RefName;
    ///
    /// assert_eq!(RefName::new("refs/heads/main").unwrap().short(), "main");
    /// assert_eq!(RefName::new("refs/remotes/origin/main").unwrap().short(), "origin/main");
    /// assert_eq!(RefName::new("refs/notes/commits").unwrap().short(), "refs/notes/commits");
    /// ```
    pub fn short(&self) -> &str {
        [Self::HEADS, Self::TAGS, Self::REMOTES]
            .iter()
            .find_map(|prefix| self.0.strip_prefix(prefix))
            .unwrap_or(&self.0)
    }

    /// Validate a ref name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |why: &str| Err(TypeError::InvalidRefName(format!("'{name}': {why}")));

        if name.is_empty() {
            return reject("ref name cannot be empty");
        }
        if name.starts_with('/') || name.ends_with('/') {
            return reject("ref name cannot start or end with '/'");
        }
        if name.ends_with('.') {
            return reject("ref name cannot end with '.'");
        }
        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return reject(&format!("ref name cannot contain '{bad}'"));
            }
        }
        if name
            .chars()
            .any(|c| c.is_ascii_control() || matches!(c, ' ' | '~' | '^' | ':' | '\\' | '?' | '*' | '['))
        {
            return reject("ref name contains a forbidden character");
        }
        for component in name.split('/') {
            if component.starts_with('.') {
                return reject("path component cannot start with '.'");
            }
            if component.ends_with(".lock") {
                return reject("path component cannot end with '.lock'");
            }
        }

        Ok(())
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named pointer (tag or branch) to an object id.
///
/// `oid` is the leaf id: symbolic refs are followed, annotated tags are not
/// peeled. For an annotated tag, `oid` is the tag object itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ref {
    /// Full ref name
    pub name: RefName,
    /// Leaf object id
    pub oid: Oid,
    /// Whether the ref names another ref rather than an object
    pub symbolic: bool,
}

impl Ref {
    /// Short, human-readable name (see [`RefName::short`]).
    pub fn short_name(&self) -> &str {
        self.name.short()
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.oid, self.name)
    }
}
