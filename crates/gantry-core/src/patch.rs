//! Tri-state optionals for partial updates
//!
//! Update payloads need three states per optional field: not supplied
//! (leave the stored value alone), explicit null (clear it), and a value
//! (replace it). A plain `Option` collapses the first two, so update DTOs
//! use `Patch` with `#[serde(default)]`.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field was not present in the document.
    #[default]
    Absent,
    /// Field was present as explicit null: clear the stored value.
    Null,
    /// Field was present with a value: replace the stored value.
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(value) => Patch::Value(f(value)),
        }
    }

    /// Apply onto the stored optional field.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *slot = None,
            Patch::Value(value) => *slot = Some(value),
        }
    }
}

// Only invoked by serde when the key is present, so `Absent` never reaches
// here; it comes from `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(default)]
        hibernated: Patch<bool>,
    }

    #[test]
    fn test_absent() {
        let update: Update = serde_json::from_str("{}").unwrap();
        assert_eq!(update.hibernated, Patch::Absent);
    }

    #[test]
    fn test_null_clears() {
        let update: Update = serde_json::from_str(r#"{"hibernated": null}"#).unwrap();
        assert_eq!(update.hibernated, Patch::Null);

        let mut stored = Some(true);
        update.hibernated.apply_to(&mut stored);
        assert_eq!(stored, None);
    }

    #[test]
    fn test_value_replaces() {
        let update: Update = serde_json::from_str(r#"{"hibernated": true}"#).unwrap();
        assert_eq!(update.hibernated, Patch::Value(true));

        let mut stored = None;
        update.hibernated.apply_to(&mut stored);
        assert_eq!(stored, Some(true));
    }

    #[test]
    fn test_absent_leaves_stored() {
        let mut stored = Some(false);
        Patch::Absent.apply_to(&mut stored);
        assert_eq!(stored, Some(false));
    }
}
