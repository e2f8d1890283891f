// Ordered, name-keyed field registry

use indexmap::IndexMap;

use super::descriptor::FieldDescriptor;
use super::error::{FormError, FormResult};

/// Ordered collection of field descriptors keyed by raw name.
///
/// Order determines render order. Every failing call leaves the registry
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldDescriptor>,
}

/// Which side of the anchor a field is spliced on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Splice {
    Before,
    After,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, or replace it in place when `allow_overwrite` is set
    pub fn add(&mut self, descriptor: FieldDescriptor, allow_overwrite: bool) -> FormResult<()> {
        if !allow_overwrite {
            self.prevent_duplicate(descriptor.name())?;
        }

        tracing::debug!(field = descriptor.name(), "registering field");
        // IndexMap::insert keeps the slot of an existing key
        self.fields.insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Insert a field directly before `anchor`
    pub fn add_before(
        &mut self,
        anchor: &str,
        descriptor: FieldDescriptor,
        allow_overwrite: bool,
    ) -> FormResult<()> {
        self.splice(anchor, descriptor, allow_overwrite, Splice::Before)
    }

    /// Insert a field directly after `anchor`
    pub fn add_after(
        &mut self,
        anchor: &str,
        descriptor: FieldDescriptor,
        allow_overwrite: bool,
    ) -> FormResult<()> {
        self.splice(anchor, descriptor, allow_overwrite, Splice::After)
    }

    fn splice(
        &mut self,
        anchor: &str,
        descriptor: FieldDescriptor,
        allow_overwrite: bool,
        side: Splice,
    ) -> FormResult<()> {
        let anchor_index = self.index_of(anchor)?;
        let split = match side {
            Splice::Before => anchor_index,
            Splice::After => anchor_index + 1,
        };

        let name = descriptor.name().to_string();
        match self.fields.get_index_of(&name) {
            Some(existing) => {
                if !allow_overwrite {
                    return Err(FormError::DuplicateField { name });
                }

                if existing < split || name == anchor {
                    // Already on the leading side of the split: replace in place
                    self.fields.insert(name, descriptor);
                } else {
                    // Pull it forward to the split point
                    self.fields.shift_remove_index(existing);
                    self.fields.shift_insert(split, name, descriptor);
                }
            }
            None => {
                self.fields.shift_insert(split, name, descriptor);
            }
        }

        tracing::debug!(field = %anchor, ?side, "spliced field around anchor");
        Ok(())
    }

    /// Remove a field, closing the gap it leaves
    pub fn remove(&mut self, name: &str) -> FormResult<FieldDescriptor> {
        self.fields
            .shift_remove(name)
            .ok_or_else(|| FormError::UnknownField {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> FormResult<&FieldDescriptor> {
        self.fields.get(name).ok_or_else(|| FormError::UnknownField {
            name: name.to_string(),
        })
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor> {
        self.fields.get_mut(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Ordered snapshot of every field
    pub fn all(&self) -> Vec<&FieldDescriptor> {
        self.fields.values().collect()
    }

    /// Ordered snapshot of the fields no render pass has emitted yet
    pub fn unrendered(&self) -> Vec<&FieldDescriptor> {
        self.fields.values().filter(|f| !f.is_rendered()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldDescriptor> {
        self.fields.values_mut()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn index_of(&self, name: &str) -> FormResult<usize> {
        self.fields
            .get_index_of(name)
            .ok_or_else(|| FormError::UnknownField {
                name: name.to_string(),
            })
    }

    fn prevent_duplicate(&self, name: &str) -> FormResult<()> {
        if self.has(name) {
            return Err(FormError::DuplicateField {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field_type::{FieldTypeRegistry, TypeResolver};
    use crate::form::options::{options, Options};
    use serde_json::json;

    fn field(name: &str) -> FieldDescriptor {
        labelled(name, name)
    }

    fn labelled(name: &str, label: &str) -> FieldDescriptor {
        let types = FieldTypeRegistry::new();
        FieldDescriptor::new(
            name,
            None,
            types.resolve("text").unwrap(),
            options(json!({ "label": label })),
        )
    }

    fn registry(names: &[&str]) -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        for name in names {
            registry.add(field(name), false).unwrap();
        }
        registry
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let registry = registry(&["a", "b"]);
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut registry = registry(&["a"]);

        let result = registry.add(field("a"), false);
        assert!(matches!(result, Err(FormError::DuplicateField { name }) if name == "a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut registry = registry(&["a", "b", "c"]);

        registry.add(labelled("a", "Replaced"), true).unwrap();

        assert_eq!(registry.names(), vec!["a", "b", "c"]);
        assert_eq!(registry.get("a").unwrap().label(), "Replaced");
    }

    #[test]
    fn test_add_before_and_after_agree() {
        let mut before = registry(&["a", "b", "c"]);
        before.add_before("b", field("x"), false).unwrap();

        let mut after = registry(&["a", "b", "c"]);
        after.add_after("a", field("x"), false).unwrap();

        assert_eq!(before.names(), vec!["a", "x", "b", "c"]);
        assert_eq!(after.names(), before.names());
    }

    #[test]
    fn test_add_before_first_and_after_last() {
        let mut registry = registry(&["a", "b"]);
        registry.add_before("a", field("start"), false).unwrap();
        registry.add_after("b", field("end"), false).unwrap();

        assert_eq!(registry.names(), vec!["start", "a", "b", "end"]);
    }

    #[test]
    fn test_splice_with_missing_anchor_leaves_registry_unchanged() {
        let mut registry = registry(&["a", "b"]);

        let result = registry.add_before("missing", field("x"), false);
        assert!(matches!(result, Err(FormError::UnknownField { name }) if name == "missing"));
        assert_eq!(registry.names(), vec!["a", "b"]);

        assert!(registry.add_after("missing", field("x"), false).is_err());
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_splice_duplicate_without_overwrite_fails() {
        let mut registry = registry(&["a", "b", "c"]);
        assert!(registry.add_after("a", field("c"), false).is_err());
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_splice_overwrite_moves_trailing_field_forward() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.add_after("a", labelled("c", "Moved"), true).unwrap();

        assert_eq!(registry.names(), vec!["a", "c", "b"]);
        assert_eq!(registry.get("c").unwrap().label(), "Moved");
    }

    #[test]
    fn test_splice_overwrite_keeps_leading_field_in_place() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.add_before("c", labelled("a", "Kept"), true).unwrap();

        assert_eq!(registry.names(), vec!["a", "b", "c"]);
        assert_eq!(registry.get("a").unwrap().label(), "Kept");
    }

    #[test]
    fn test_remove_closes_gap() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.remove("b").unwrap();

        assert!(!registry.has("b"));
        assert_eq!(registry.names(), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_missing_field_fails() {
        let mut registry = registry(&["a"]);
        let result = registry.remove("b");
        assert!(matches!(result, Err(FormError::UnknownField { name }) if name == "b"));
    }

    #[test]
    fn test_get_missing_field_fails() {
        let registry = FieldRegistry::new();
        assert!(registry.get("a").is_err());
        assert!(!registry.has("a"));
    }

    #[test]
    fn test_unrendered_preserves_order() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.get_mut("b").unwrap().set_rendered(true);

        let names: Vec<&str> = registry.unrendered().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(registry.all().len(), 3);
    }

    #[test]
    fn test_all_is_a_snapshot() {
        let registry = registry(&["a"]);
        let snapshot: Vec<FieldDescriptor> = registry.all().into_iter().cloned().collect();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].options(), &Options::from_iter([("label".to_string(), json!("a"))]));
    }
}
