//! The working selection and the editing session that owns it

use crate::fields::{EffectiveField, FieldCustomization, StyleChange};
use crate::scaler::{DisplayDelta, drag_update};
use crate::store::{FieldStateStore, StoreSnapshot};
use crate::types::{Category, ComposeError, InstanceId, Result, TemplateAsset, TemplateInstance};

/// Ordered list of template instances; order is export order
#[derive(Debug, Clone, Default)]
pub struct Selection {
    instances: Vec<TemplateInstance>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instance: TemplateInstance) {
        self.instances.push(instance);
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<TemplateInstance> {
        let idx = self.instances.iter().position(|inst| inst.id == id)?;
        Some(self.instances.remove(idx))
    }

    pub fn get(&self, id: InstanceId) -> Option<&TemplateInstance> {
        self.instances.iter().find(|inst| inst.id == id)
    }

    pub fn instances(&self) -> &[TemplateInstance] {
        &self.instances
    }

    pub fn categories(&self) -> Vec<Category> {
        self.instances.iter().map(|inst| inst.category).collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Selection plus the customizations of its instances.
///
/// Adding and removing instances goes through the session so that the
/// store never holds state for an instance the selection no longer owns.
#[derive(Debug, Default)]
pub struct Session {
    selection: Selection,
    store: FieldStateStore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new instance of `asset` at the end of the selection
    pub fn add_template(&mut self, asset: TemplateAsset) -> InstanceId {
        let instance = TemplateInstance::new(asset);
        let id = instance.id;
        self.store.register(&instance);
        log::debug!("Added {} ({}) as instance {}", instance.asset.name, instance.category, id);
        self.selection.push(instance);
        id
    }

    /// Remove an instance and purge its customizations
    pub fn remove_instance(&mut self, id: InstanceId) -> Result<TemplateInstance> {
        let instance = self
            .selection
            .remove(id)
            .ok_or(ComposeError::UnknownInstance(id))?;
        let purged = self.store.purge(id);
        log::debug!("Removed instance {}, purged {} field records", id, purged);
        Ok(instance)
    }

    pub fn set_text(&mut self, id: InstanceId, field: &str, text: impl Into<String>) -> Result<()> {
        self.store.set_text(id, field, text)
    }

    pub fn set_position(&mut self, id: InstanceId, field: &str, x: i32, y: i32) -> Result<()> {
        self.store.set_position(id, field, x, y)
    }

    pub fn set_style(&mut self, id: InstanceId, field: &str, change: StyleChange) -> Result<()> {
        self.store.set_style(id, field, change)
    }

    /// Merge a whole partial record onto one field
    pub fn customize(&mut self, id: InstanceId, field: &str, update: FieldCustomization) -> Result<()> {
        self.store.merge(id, field, update)
    }

    /// Apply a finished drag measured in display pixels; returns the new source position
    pub fn drag_stop(&mut self, id: InstanceId, field: &str, delta: DisplayDelta) -> Result<(i32, i32)> {
        let category = self.category(id)?;
        let update = drag_update(id, field, delta, category);
        self.store.apply_position_update(&update)
    }

    pub fn effective(&self, id: InstanceId, field: &str) -> Result<EffectiveField> {
        self.store.get_effective(id, self.category(id)?, field)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn store(&self) -> &FieldStateStore {
        &self.store
    }

    /// Copy of everything an export needs, taken atomically
    pub fn snapshot(&self) -> (Vec<TemplateInstance>, StoreSnapshot) {
        (self.selection.instances().to_vec(), self.store.snapshot())
    }

    fn category(&self, id: InstanceId) -> Result<Category> {
        self.selection
            .get(id)
            .map(|inst| inst.category)
            .ok_or(ComposeError::UnknownInstance(id))
    }
}
