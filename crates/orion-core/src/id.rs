use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for element ids — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// The value of an element's `id` attribute, interned.
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    /// Intern a string as an ElementId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Strip a `url(#...)` or `#...` reference down to the referenced id.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let trimmed = reference.trim();
        let inner = trimmed
            .strip_prefix("url(")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(trimmed)
            .trim();
        let id = inner.strip_prefix('#')?;
        if id.is_empty() {
            return None;
        }
        Some(Self::intern(id))
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
        let a = ElementId::intern("filter-chalk");
        let b = ElementId::intern("filter-chalk");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "filter-chalk");
    }

    #[test]
    fn reference_forms() {
        let id = ElementId::intern("filter-spray");
        assert_eq!(ElementId::from_reference("url(#filter-spray)"), Some(id));
        assert_eq!(ElementId::from_reference(" #filter-spray "), Some(id));
        assert_eq!(ElementId::from_reference("none"), None);
        assert_eq!(ElementId::from_reference("url(#)"), None);
    }
}
