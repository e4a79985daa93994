//! Hierarchical measurement keys.
//!
//! A [`MeasurementKey`] names the result of a measurement. Inside nested
//! sub-circuits the same measurement can occur many times, so a key carries
//! a `path` of scope components (outermost first) in front of its `name`.
//! The canonical text form joins `path ++ [name]` with
//! [`MEASUREMENT_KEY_SEPARATOR`], e.g. `outer:inner:m`.
//!
//! Equality, ordering and hashing only look at the canonical text, so a key
//! and the equivalent plain string are interchangeable:
//!
//! ```rust
//! use arvak_ir::MeasurementKey;
//! use std::collections::HashMap;
//!
//! let key = MeasurementKey::new("m").unwrap().with_path_prefix("sub").unwrap();
//! assert_eq!(key, "sub:m");
//!
//! let mut results = HashMap::new();
//! results.insert(key, vec![0, 1]);
//! assert_eq!(results.get("sub:m"), Some(&vec![0, 1]));
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::str::FromStr;

use crate::error::{IrError, IrResult};

/// Character joining path components and the name in the serialized form.
pub const MEASUREMENT_KEY_SEPARATOR: char = ':';

/// Immutable, path-qualified identifier of a measurement result.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "MeasurementKeyRecord", into = "MeasurementKeyRecord")]
pub struct MeasurementKey {
    name: String,
    path: Vec<String>,
    /// `path ++ [name]` joined by the separator, fixed at construction.
    canonical: String,
}

/// Structured interchange form of a key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MeasurementKeyRecord {
    name: String,
    #[serde(default)]
    path: Vec<String>,
}

fn check_component(component: &str, key: &str, what: &str) -> IrResult<()> {
    if component.contains(MEASUREMENT_KEY_SEPARATOR) {
        return Err(IrError::InvalidKey {
            key: key.to_string(),
            reason: format!(
                "'{MEASUREMENT_KEY_SEPARATOR}' is not allowed in a {what}. \
                 If this is a nested key string, use `MeasurementKey::parse_serialized`"
            ),
        });
    }
    Ok(())
}

fn check_name(name: &str) -> IrResult<()> {
    if name.is_empty() {
        return Err(IrError::InvalidKey {
            key: String::new(),
            reason: "measurement key name cannot be empty".to_string(),
        });
    }
    check_component(name, name, "key name")
}

impl MeasurementKey {
    /// Create a top-level key.
    ///
    /// Fails if `name` is empty or contains the separator.
    pub fn new(name: impl Into<String>) -> IrResult<Self> {
        Self::with_path(name, Vec::<String>::new())
    }

    /// Create a key with an explicit path (outermost component first).
    pub fn with_path<I, S>(name: impl Into<String>, path: I) -> IrResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        check_name(&name)?;
        let path: Vec<String> = path.into_iter().map(Into::into).collect();
        for component in &path {
            check_component(component, component, "key path component")?;
        }
        Ok(Self::from_parts(name, path))
    }

    /// Parse the serialized (separator-joined) form of a key.
    ///
    /// The last component becomes the name and the preceding ones the path.
    /// This is the only way to build a key from a pre-joined string; it
    /// fails only when the final component is empty.
    pub fn parse_serialized(serialized: &str) -> IrResult<Self> {
        let mut components: Vec<String> = serialized
            .split(MEASUREMENT_KEY_SEPARATOR)
            .map(str::to_string)
            .collect();
        // `split` always yields at least one item.
        let name = components.pop().unwrap_or_default();
        if name.is_empty() {
            return Err(IrError::InvalidKey {
                key: serialized.to_string(),
                reason: "measurement key name cannot be empty".to_string(),
            });
        }
        Ok(Self::from_parts(name, components))
    }

    fn from_parts(name: String, path: Vec<String>) -> Self {
        let mut canonical = String::with_capacity(
            name.len() + path.iter().map(|c| c.len() + 1).sum::<usize>(),
        );
        for component in &path {
            canonical.push_str(component);
            canonical.push(MEASUREMENT_KEY_SEPARATOR);
        }
        canonical.push_str(&name);
        Self {
            name,
            path,
            canonical,
        }
    }

    /// The unqualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope path, outermost component first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The canonical serialized form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Whether the key sits at the top level (empty path).
    pub fn is_top_level(&self) -> bool {
        self.path.is_empty()
    }

    /// Return a copy with `component` prepended to the path.
    ///
    /// Nested scopes are qualified inside-out: the innermost scope adds its
    /// component first, and each enclosing scope prepends its own.
    pub fn with_path_prefix(&self, component: impl Into<String>) -> IrResult<Self> {
        let component = component.into();
        check_component(&component, &component, "key path component")?;
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.push(component);
        path.extend(self.path.iter().cloned());
        Ok(Self::from_parts(self.name.clone(), path))
    }

    /// Return a copy with the path replaced.
    pub fn with_key_path<I, S>(&self, path: I) -> IrResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_path(self.name.clone(), path)
    }

    /// Return a copy whose name is substituted through `mapping`.
    ///
    /// Keys whose name is not in the table come back unchanged. The path is
    /// never touched.
    pub fn remap_name<S: BuildHasher>(&self, mapping: &HashMap<String, String, S>) -> IrResult<Self> {
        match mapping.get(&self.name) {
            Some(new_name) => {
                check_name(new_name)?;
                Ok(Self::from_parts(new_name.clone(), self.path.clone()))
            }
            None => Ok(self.clone()),
        }
    }
}

impl fmt::Display for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "MeasurementKey(name={})", self.name)
        } else {
            write!(f, "MeasurementKey(path={:?}, name={})", self.path, self.name)
        }
    }
}

impl FromStr for MeasurementKey {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_serialized(s)
    }
}

impl TryFrom<MeasurementKeyRecord> for MeasurementKey {
    type Error = IrError;

    fn try_from(record: MeasurementKeyRecord) -> Result<Self, Self::Error> {
        Self::with_path(record.name, record.path)
    }
}

impl From<MeasurementKey> for MeasurementKeyRecord {
    fn from(key: MeasurementKey) -> Self {
        Self {
            name: key.name,
            path: key.path,
        }
    }
}

impl PartialEq for MeasurementKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for MeasurementKey {}

impl PartialEq<str> for MeasurementKey {
    fn eq(&self, other: &str) -> bool {
        self.canonical == other
    }
}

impl PartialEq<&str> for MeasurementKey {
    fn eq(&self, other: &&str) -> bool {
        self.canonical == *other
    }
}

impl PartialEq<String> for MeasurementKey {
    fn eq(&self, other: &String) -> bool {
        &self.canonical == other
    }
}

impl PartialEq<MeasurementKey> for str {
    fn eq(&self, other: &MeasurementKey) -> bool {
        self == other.canonical
    }
}

impl PartialEq<MeasurementKey> for &str {
    fn eq(&self, other: &MeasurementKey) -> bool {
        *self == other.canonical
    }
}

impl PartialEq<MeasurementKey> for String {
    fn eq(&self, other: &MeasurementKey) -> bool {
        *self == other.canonical
    }
}

impl Hash for MeasurementKey {
    // Must agree with `str`'s hash for the `Borrow<str>` impl.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.as_str().hash(state);
    }
}

impl PartialOrd for MeasurementKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MeasurementKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl Borrow<str> for MeasurementKey {
    fn borrow(&self) -> &str {
        &self.canonical
    }
}

impl AsRef<str> for MeasurementKey {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = MeasurementKey::new("").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_nested_name_rejected() {
        let err = MeasurementKey::new("nested:key").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("':' is not allowed"));
        assert!(msg.contains("parse_serialized"));
    }

    #[test]
    fn test_parse_serialized() {
        let key = MeasurementKey::parse_serialized("nested:key").unwrap();
        assert_eq!(key.name(), "key");
        assert_eq!(key.path(), ["nested".to_string()]);
    }

    #[test]
    fn test_parse_serialized_empty_name() {
        assert!(MeasurementKey::parse_serialized("").is_err());
        assert!(MeasurementKey::parse_serialized("a:").is_err());
    }

    #[test]
    fn test_eq_and_hash_with_str() {
        let key = MeasurementKey::new("x").unwrap();
        assert_eq!(key, "x");
        assert_eq!("x", key);
        assert_eq!(key, "x".to_string());
        assert_eq!(hash_of(&key), hash_of("x"));
        assert_eq!(hash_of(&key), hash_of(&"x".to_string()));

        let nested = MeasurementKey::parse_serialized("nested:key").unwrap();
        assert_eq!(nested, "nested:key");
        assert_ne!(nested, MeasurementKey::new("key").unwrap());
    }

    #[test]
    fn test_display_and_debug() {
        let key = MeasurementKey::new("key_string").unwrap();
        assert_eq!(key.to_string(), "key_string");
        assert_eq!(format!("{key:?}"), "MeasurementKey(name=key_string)");

        let nested = MeasurementKey::parse_serialized("nested:key").unwrap();
        assert_eq!(nested.to_string(), "nested:key");
        assert_eq!(
            format!("{nested:?}"),
            "MeasurementKey(path=[\"nested\"], name=key)"
        );
    }

    #[test]
    fn test_with_path_prefix() {
        let key = MeasurementKey::new("a").unwrap();
        let prefixed = key.with_path_prefix("b").unwrap();
        assert_eq!(prefixed.to_string(), "b:a");
        assert_eq!(prefixed.name(), "a");

        let outer = prefixed.with_path_prefix("c").unwrap();
        assert_eq!(outer.path(), ["c".to_string(), "b".to_string()]);
        assert_eq!(outer, "c:b:a");

        // The original is untouched.
        assert_eq!(key, "a");
        assert!(key.is_top_level());
    }

    #[test]
    fn test_with_key_path() {
        let key = MeasurementKey::new("key").unwrap();
        let with_path = key.with_key_path(["a"]).unwrap();
        assert_eq!(with_path, key.with_path_prefix("a").unwrap());
        assert!(key.with_key_path(["a:b"]).is_err());
    }

    #[test]
    fn test_prefix_with_separator_rejected() {
        let key = MeasurementKey::new("a").unwrap();
        assert!(key.with_path_prefix("b:c").is_err());
    }

    #[test]
    fn test_remap_name() {
        let mapping: HashMap<String, String> =
            [("old".to_string(), "new".to_string())].into_iter().collect();

        let key = MeasurementKey::with_path("old", ["scope"]).unwrap();
        let remapped = key.remap_name(&mapping).unwrap();
        assert_eq!(remapped.name(), "new");
        assert_eq!(remapped.path(), ["scope".to_string()]);
        assert_eq!(remapped, "scope:new");

        let other = MeasurementKey::new("other").unwrap();
        assert_eq!(other.remap_name(&mapping).unwrap(), other);
    }

    #[test]
    fn test_remap_to_invalid_name() {
        let mapping: HashMap<String, String> =
            [("old".to_string(), "a:b".to_string())].into_iter().collect();
        let key = MeasurementKey::new("old").unwrap();
        assert!(key.remap_name(&mapping).is_err());
    }

    #[test]
    fn test_ordering_follows_canonical_form() {
        let a = MeasurementKey::parse_serialized("a:z").unwrap();
        let b = MeasurementKey::new("b").unwrap();
        assert!(a < b);
    }
}
