//! Logical value descriptors
//!
//! This module defines the foundational key types:
//! - TargetRef: Reference to the entity a computed value is about
//! - ValueDescriptor: Logical cache key (target + value name + properties)
//! - ValueIdentifier: Compact numeric substitute for a descriptor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reference to the computation target a value is about
///
/// A TargetRef is an opaque reference string supplied by the scheduler,
/// typically "EntityType/EntityId" (e.g. "Trade/42"). The cache never
/// interprets its content; it only needs value equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetRef(String);

impl TargetRef {
    /// Create a target reference from any string-like value
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Get the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TargetRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TargetRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Logical key identifying one computed value
///
/// A descriptor is composed of the target the value is about, the name of
/// the value (e.g. "PresentValue") and a set of disambiguating properties
/// describing how the value was computed (e.g. `Currency=USD`).
///
/// Descriptors are immutable and compared by value: two descriptors with
/// identical target, name and properties are interchangeable. Properties
/// are held in a `BTreeMap` so equality and hashing are independent of
/// insertion order.
///
/// # Examples
///
/// ```
/// use viewcache_core::ValueDescriptor;
///
/// let d = ValueDescriptor::new("Trade/42", "PresentValue")
///     .with_property("Currency", "USD");
/// assert_eq!(d.value_name(), "PresentValue");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValueDescriptor {
    target: TargetRef,
    value_name: String,
    properties: BTreeMap<String, String>,
}

impl ValueDescriptor {
    /// Create a descriptor with no disambiguating properties
    pub fn new(target: impl Into<TargetRef>, value_name: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            value_name: value_name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Return a copy of this descriptor with one additional property
    ///
    /// Setting a property that already exists replaces its value.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The target this value is about
    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    /// The name of the computed value
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Look up a single disambiguating property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// All disambiguating properties, sorted by key
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

impl fmt::Display for ValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target, self.value_name)?;
        if !self.properties.is_empty() {
            write!(f, "{{")?;
            for (i, (k, v)) in self.properties.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", k, v)?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}

/// Compact process-local identifier for a ValueDescriptor
///
/// Identifiers are assigned monotonically by the identifier map and are
/// stable for the lifetime of that map: once a descriptor has an identifier
/// it is never renumbered. Callers must not depend on the numeric value,
/// only on its stability within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValueIdentifier(u64);

impl ValueIdentifier {
    /// Wrap a raw identifier value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ValueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
