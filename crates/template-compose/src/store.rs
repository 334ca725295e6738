//! Per-instance field customization state
//!
//! The store keeps one [`FieldCustomization`] per (instance, field) pair and
//! validates every write against the instance's category definitions.
//! Exports never read the live store: they work from a [`StoreSnapshot`]
//! taken before any asynchronous step begins.

use crate::fields::{EffectiveField, FieldCustomization, StyleChange, definition, resolve_all};
use crate::scaler::PositionUpdate;
use crate::types::{Category, ComposeError, InstanceId, Result, TemplateInstance};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

type Customizations = HashMap<InstanceId, BTreeMap<String, FieldCustomization>>;

/// Mutable customization state edited by the user
#[derive(Debug, Default, Clone)]
pub struct FieldStateStore {
    categories: HashMap<InstanceId, Category>,
    entries: Customizations,
}

impl FieldStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an instance known to the store so writes can be validated
    pub fn register(&mut self, instance: &TemplateInstance) {
        self.categories.insert(instance.id, instance.category);
    }

    pub fn is_registered(&self, id: InstanceId) -> bool {
        self.categories.contains_key(&id)
    }

    pub fn set_text(&mut self, id: InstanceId, field: &str, text: impl Into<String>) -> Result<()> {
        self.merge(
            id,
            field,
            FieldCustomization {
                text: Some(text.into()),
                ..Default::default()
            },
        )
    }

    pub fn set_position(&mut self, id: InstanceId, field: &str, x: i32, y: i32) -> Result<()> {
        self.merge(
            id,
            field,
            FieldCustomization {
                x: Some(x),
                y: Some(y),
                ..Default::default()
            },
        )
    }

    pub fn set_style(&mut self, id: InstanceId, field: &str, change: StyleChange) -> Result<()> {
        self.merge(id, field, change.into())
    }

    /// Move a field by a source-space delta from its current effective position.
    ///
    /// Returns the new position.
    pub fn apply_position_update(&mut self, update: &PositionUpdate) -> Result<(i32, i32)> {
        let category = self.category_of(update.instance)?;
        let current = self.get_effective(update.instance, category, &update.field)?;
        let x = current.x.saturating_add(update.dx);
        let y = current.y.saturating_add(update.dy);
        self.set_position(update.instance, &update.field, x, y)?;
        Ok((x, y))
    }

    /// Shallow-merge a partial record onto the stored customization
    pub fn merge(&mut self, id: InstanceId, field: &str, update: FieldCustomization) -> Result<()> {
        let category = self.category_of(id)?;
        let def = definition(category, field)?;

        if update.is_empty() {
            return Ok(());
        }
        if let Some(size) = update.font_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(ComposeError::InvalidFontSize {
                    field: def.name.to_string(),
                    size,
                });
            }
        }

        self.entries
            .entry(id)
            .or_default()
            .entry(def.name.to_string())
            .or_default()
            .merge(&update);
        Ok(())
    }

    /// Defaults for `field` with this instance's overrides applied
    pub fn get_effective(
        &self,
        id: InstanceId,
        category: Category,
        field: &str,
    ) -> Result<EffectiveField> {
        let def = definition(category, field)?;
        Ok(lookup(&self.entries, id, field)
            .cloned()
            .unwrap_or_default()
            .resolve(def))
    }

    /// Raw override record, if any property was ever written
    pub fn customization(&self, id: InstanceId, field: &str) -> Option<&FieldCustomization> {
        lookup(&self.entries, id, field)
    }

    /// Remove every entry keyed by `id`; returns how many field records went away
    pub fn purge(&mut self, id: InstanceId) -> usize {
        self.categories.remove(&id);
        self.entries.remove(&id).map_or(0, |fields| fields.len())
    }

    /// Immutable copy of the current state
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            entries: Arc::new(self.entries.clone()),
        }
    }

    fn category_of(&self, id: InstanceId) -> Result<Category> {
        self.categories
            .get(&id)
            .copied()
            .ok_or(ComposeError::UnknownInstance(id))
    }
}

fn lookup<'a>(entries: &'a Customizations, id: InstanceId, field: &str) -> Option<&'a FieldCustomization> {
    entries.get(&id).and_then(|fields| fields.get(field))
}

/// Point-in-time copy of a [`FieldStateStore`], cheap to share between tasks
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    entries: Arc<Customizations>,
}

impl StoreSnapshot {
    /// Every field of the instance's category, resolved
    pub fn effective_fields(&self, instance: &TemplateInstance) -> Vec<EffectiveField> {
        resolve_all(instance.category, |name| lookup(&self.entries, instance.id, name))
    }

    pub fn customization(&self, id: InstanceId, field: &str) -> Option<&FieldCustomization> {
        lookup(&self.entries, id, field)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rgb, TemplateAsset};

    fn instance(category: Category) -> TemplateInstance {
        TemplateInstance::new(TemplateAsset {
            id: 1,
            name: "test".into(),
            url: "test.png".into(),
            category,
        })
    }

    #[test]
    fn test_unknown_instance_rejected() {
        let mut store = FieldStateStore::new();
        let err = store.set_text(InstanceId(999_999), "Model", "x").unwrap_err();
        assert!(matches!(err, ComposeError::UnknownInstance(_)));
    }

    #[test]
    fn test_unknown_field_leaves_no_entry() {
        let mut store = FieldStateStore::new();
        let inst = instance(Category::Smartphone);
        store.register(&inst);

        let err = store.set_text(inst.id, "Codice", "A1").unwrap_err();
        assert!(matches!(err, ComposeError::UnknownField { .. }));
        assert!(store.customization(inst.id, "Codice").is_none());
        assert_eq!(store.purge(inst.id), 0);
    }

    #[test]
    fn test_snapshot_isolated_from_later_writes() {
        let mut store = FieldStateStore::new();
        let inst = instance(Category::Square);
        store.register(&inst);
        store.set_text(inst.id, "Model", "before").unwrap();

        let snapshot = store.snapshot();
        store.set_text(inst.id, "Model", "after").unwrap();
        store.set_style(inst.id, "Model", StyleChange::Color(Rgb::BLACK)).unwrap();

        let fields = snapshot.effective_fields(&inst);
        let model = fields.iter().find(|f| f.name == "Model").unwrap();
        assert_eq!(model.text, "before");
        assert_eq!(model.color, Rgb::WHITE);
    }

    #[test]
    fn test_apply_position_update_from_default() {
        let mut store = FieldStateStore::new();
        let inst = instance(Category::Rectangular);
        store.register(&inst);

        let update = PositionUpdate {
            instance: inst.id,
            field: "Price".into(),
            dx: -100,
            dy: 15,
        };
        assert_eq!(store.apply_position_update(&update).unwrap(), (900, 75));
        assert_eq!(store.apply_position_update(&update).unwrap(), (800, 90));
    }

    #[test]
    fn test_position_update_saturates() {
        let mut store = FieldStateStore::new();
        let inst = instance(Category::Rectangular);
        store.register(&inst);

        let update = PositionUpdate {
            instance: inst.id,
            field: "Price".into(),
            dx: i32::MAX,
            dy: i32::MIN,
        };
        assert_eq!(store.apply_position_update(&update).unwrap(), (i32::MAX, i32::MIN));
        assert_eq!(store.apply_position_update(&update).unwrap(), (i32::MAX, i32::MIN));
    }

    #[test]
    fn test_bad_font_size_rejected() {
        let mut store = FieldStateStore::new();
        let inst = instance(Category::Smartphone);
        store.register(&inst);
        store.set_style(inst.id, "Model", StyleChange::FontSize(64.0)).unwrap();

        for size in [-48.0, 0.0, f32::NAN, f32::INFINITY] {
            let err = store
                .set_style(inst.id, "Model", StyleChange::FontSize(size))
                .unwrap_err();
            assert!(matches!(err, ComposeError::InvalidFontSize { .. }));
        }

        // Rejected writes leave the earlier value alone
        let model = store.get_effective(inst.id, Category::Smartphone, "Model").unwrap();
        assert_eq!(model.font_size, 64.0);
    }
}
