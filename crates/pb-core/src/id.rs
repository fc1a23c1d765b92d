use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for element IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

const SEQUENCE_PREFIX: &str = "el_";

/// Largest sequence number the counter tracks. Keeps every issued number
/// exact as a JS number on the host side; `el_<n>` names above it are
/// treated as plain ids.
pub const MAX_SEQUENCE: u64 = (1 << 53) - 1;

/// A lightweight, interned identifier for placed canvas elements.
/// Internally a `Spur` index: 4 bytes and `Copy`.
///
/// IDs are issued by [`ElementFactory`](crate::prefab::ElementFactory) from a
/// session-owned counter; the interner only maps them to strings.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The ID for sequence number `n` (`el_1`, `el_2`, …).
    pub fn from_sequence(n: u64) -> Self {
        Self::intern(&format!("{SEQUENCE_PREFIX}{n}"))
    }

    /// The sequence number this ID was issued with, if it follows the
    /// `el_<n>` scheme with `n <= MAX_SEQUENCE`.
    pub fn sequence(&self) -> Option<u64> {
        self.as_str()
            .strip_prefix(SEQUENCE_PREFIX)?
            .parse()
            .ok()
            .filter(|n| *n <= MAX_SEQUENCE)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("el_42");
        let b = ElementId::intern("el_42");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "el_42");
    }

    #[test]
    fn sequence_ids() {
        let id = ElementId::from_sequence(7);
        assert_eq!(id.as_str(), "el_7");
        assert_eq!(id.sequence(), Some(7));
        assert_eq!(ElementId::intern("hero").sequence(), None);
        assert_eq!(ElementId::intern("el_18446744073709551615").sequence(), None);
    }
}
