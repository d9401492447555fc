//! Interned identifiers for fragment names, scope names and unit names.
//!
//! Every name in a registry is compared and hashed many times during
//! resolution, so names are interned once and handled as small [`Copy`]
//! handles afterwards.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Process-wide string interner backing [`Id`].
///
/// Only strings live here. Registries themselves are always explicitly
/// constructed values.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned identifier.
///
/// # Examples
///
/// ```
/// use litloom_core::identifier::Id;
///
/// let name = Id::new("Main content");
/// assert_eq!(name, "Main content");
/// assert!(name.contains("content"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns an owned copy of the interned string.
    pub fn to_owned_string(&self) -> String {
        self.with_str(str::to_owned)
    }

    /// Returns `true` if the identifier is the empty string.
    pub fn is_empty(&self) -> bool {
        self.with_str(str::is_empty)
    }

    /// Returns `true` if the identifier contains `pattern`.
    pub fn contains(&self, pattern: &str) -> bool {
        self.with_str(|s| s.contains(pattern))
    }

    /// Returns `true` if the identifier starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.with_str(|s| s.starts_with(prefix))
    }

    /// Runs `f` against the interned string.
    ///
    /// The interner stays locked while `f` runs, so `f` must not create or
    /// resolve other identifiers.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        f(interner.resolve(self.0).unwrap_or_default())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.to_owned_string();
        f.write_str(&value)
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
