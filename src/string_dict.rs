//! Interned identifier and string storage.
//!
//! The scanner hands every identifier name and string value to a
//! [`StringDict`], which guarantees that equal strings share one `Rc<str>`.
//! Scope lookups and duplicate checks then compare cheap handles instead of
//! fresh allocations.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// A shared, immutable string produced by a [`StringDict`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Rc<str>);

impl Atom {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Atom {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Atom(Rc::from(value))
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Atom(Rc::from(value))
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dictionary for deduplicating [`Atom`] instances.
///
/// Strings inserted into the dictionary are stored once and subsequent
/// requests for the same string return a clone of the existing handle.
pub struct StringDict {
    /// Keyed by `Box<str>` to avoid a double indirection through `Rc`.
    strings: FxHashMap<Box<str>, Atom>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Create a dictionary pre-populated with the names the parser itself
    /// compares against.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Get an existing string or insert a new one.
    pub fn get_or_insert(&mut self, s: &str) -> Atom {
        if let Some(existing) = self.strings.get(s) {
            return existing.clone();
        }
        let atom = Atom::from(s);
        self.strings.insert(s.into(), atom.clone());
        atom
    }

    /// Get an existing string without inserting.
    pub fn get(&self, s: &str) -> Option<Atom> {
        self.strings.get(s).cloned()
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

/// Contextual keywords and restricted names the parser checks by value.
const COMMON_STRINGS: &[&str] = &[
    // Contextual keywords
    "let",
    "static",
    "yield",
    "await",
    "async",
    "of",
    "get",
    "set",
    "from",
    "as",
    "target",
    "meta",
    // Restricted binding names
    "eval",
    "arguments",
    // Class and object names with special rules
    "constructor",
    "prototype",
    "__proto__",
    // Directives
    "use strict",
    // Strict mode reserved words
    "implements",
    "interface",
    "package",
    "private",
    "protected",
    "public",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_dict_deduplication() {
        let mut dict = StringDict::new();
        let s1 = dict.get_or_insert("hello");
        let s2 = dict.get_or_insert("hello");

        assert_eq!(s1, s2);
        // Same Rc behind both handles
        assert!(std::ptr::eq(s1.as_str(), s2.as_str()));
    }

    #[test]
    fn test_string_dict_different_strings() {
        let mut dict = StringDict::new();
        let s1 = dict.get_or_insert("hello");
        let s2 = dict.get_or_insert("world");

        assert_ne!(s1, s2);
        assert!(!std::ptr::eq(s1.as_str(), s2.as_str()));
    }

    #[test]
    fn test_common_strings_preloaded() {
        let dict = StringDict::with_common_strings();
        assert!(dict.get("arguments").is_some());
        assert!(dict.get("use strict").is_some());
        assert!(dict.get("not-there").is_none());
    }

    #[test]
    fn test_string_dict_len() {
        let mut dict = StringDict::new();
        assert_eq!(dict.len(), 0);
        assert!(dict.is_empty());

        dict.get_or_insert("hello");
        assert_eq!(dict.len(), 1);

        dict.get_or_insert("hello");
        assert_eq!(dict.len(), 1);

        dict.get_or_insert("world");
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_atom_compares_with_str() {
        let atom = Atom::from("eval");
        assert!(atom == "eval");
        assert_eq!(atom.to_string(), "eval");
        assert_eq!(format!("{:?}", atom), "\"eval\"");
    }
}
