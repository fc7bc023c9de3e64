//! Descriptor registry for configuration assembly.
//!
//! Descriptors are registered one at a time while configuration is being
//! assembled. Registration also propagates the nested-result-map flag across
//! discriminators: a row that may be materialized by a nested descriptor must
//! be handled by the nested-aware path, so the discriminating descriptor is
//! forced to report nested result maps too.
//!
//! Once assembly is done, [`DescriptorRegistry::freeze`] hands out a
//! read-only [`SharedDescriptors`] that can be shared across threads.

use crate::{MappingError, ResultDescriptor, RowMapResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Mutable registry used during configuration assembly.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    descriptors: HashMap<String, ResultDescriptor>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its id.
    pub fn add(&mut self, mut descriptor: ResultDescriptor) -> RowMapResult<()> {
        let id = descriptor.id().to_string();
        if self.descriptors.contains_key(&id) {
            return Err(MappingError::DuplicateDescriptor { id }.into());
        }

        self.force_locally(&mut descriptor);
        if descriptor.has_nested_result_maps() {
            self.force_globally(&id);
        }

        tracing::debug!(
            id = %id,
            has_nested_result_maps = descriptor.has_nested_result_maps(),
            "Registered result descriptor"
        );
        self.descriptors.insert(id, descriptor);
        Ok(())
    }

    // The new descriptor's discriminator points at a nested descriptor.
    fn force_locally(&self, descriptor: &mut ResultDescriptor) {
        if descriptor.has_nested_result_maps() {
            return;
        }
        let nested_case = descriptor.discriminator().is_some_and(|d| {
            d.descriptor_ids().any(|case_id| {
                self.descriptors
                    .get(case_id)
                    .is_some_and(ResultDescriptor::has_nested_result_maps)
            })
        });
        if nested_case {
            tracing::trace!(id = %descriptor.id(), "Forcing nested result maps from discriminator case");
            descriptor.force_nested_result_maps();
        }
    }

    // Registered descriptors whose discriminator points at the new one.
    fn force_globally(&mut self, nested_id: &str) {
        for existing in self.descriptors.values_mut() {
            if existing.has_nested_result_maps() {
                continue;
            }
            let references = existing
                .discriminator()
                .is_some_and(|d| d.descriptor_ids().any(|case_id| case_id == nested_id));
            if references {
                tracing::trace!(
                    id = %existing.id(),
                    case = %nested_id,
                    "Forcing nested result maps on discriminating descriptor"
                );
                existing.force_nested_result_maps();
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ResultDescriptor> {
        self.descriptors.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.descriptors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    /// End the assembly phase.
    pub fn freeze(self) -> SharedDescriptors {
        SharedDescriptors {
            descriptors: self
                .descriptors
                .into_iter()
                .map(|(id, descriptor)| (id, Arc::new(descriptor)))
                .collect(),
        }
    }
}

/// Read-only descriptor set, shared by row materialization.
#[derive(Debug, Clone, Default)]
pub struct SharedDescriptors {
    descriptors: HashMap<String, Arc<ResultDescriptor>>,
}

impl SharedDescriptors {
    pub fn get(&self, id: &str) -> Option<Arc<ResultDescriptor>> {
        self.descriptors.get(id).cloned()
    }

    /// Like [`get`](Self::get), but a missing id is an error.
    pub fn require(&self, id: &str) -> RowMapResult<Arc<ResultDescriptor>> {
        self.get(id).ok_or_else(|| {
            MappingError::DescriptorNotFound {
                id: id.to_string(),
            }
            .into()
        })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Discriminator, MappingEntry, RowMapError, TargetType};

    fn flat(id: &str) -> ResultDescriptor {
        let name = MappingEntry::builder("name").column("name").build().unwrap();
        ResultDescriptor::builder(id, TargetType::new("Vehicle"), vec![name])
            .build()
            .unwrap()
    }

    fn nested(id: &str) -> ResultDescriptor {
        let owner = MappingEntry::builder("owner")
            .nested_result_map("ownerResult")
            .build()
            .unwrap();
        ResultDescriptor::builder(id, TargetType::new("Car"), vec![owner])
            .build()
            .unwrap()
    }

    fn discriminating(id: &str, case_id: &str) -> ResultDescriptor {
        let kind = MappingEntry::builder("kind").column("kind").build().unwrap();
        let discriminator = Discriminator::new(
            kind.clone(),
            HashMap::from([("car".to_string(), case_id.to_string())]),
        );
        ResultDescriptor::builder(id, TargetType::new("Vehicle"), vec![kind])
            .discriminator(Arc::new(discriminator))
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut registry = DescriptorRegistry::new();
        registry.add(flat("vehicleResult")).unwrap();
        assert!(registry.contains("vehicleResult"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("vehicleResult").unwrap().id(), "vehicleResult");
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut registry = DescriptorRegistry::new();
        registry.add(flat("vehicleResult")).unwrap();
        let result = registry.add(flat("vehicleResult"));
        assert!(matches!(
            result,
            Err(RowMapError::Mapping(MappingError::DuplicateDescriptor { .. }))
        ));
    }

    #[test]
    fn test_discriminator_case_registered_first_forces_nested() {
        let mut registry = DescriptorRegistry::new();
        registry.add(nested("carResult")).unwrap();
        registry.add(discriminating("vehicleResult", "carResult")).unwrap();
        assert!(registry.get("vehicleResult").unwrap().has_nested_result_maps());
    }

    #[test]
    fn test_discriminator_case_registered_later_forces_nested() {
        let mut registry = DescriptorRegistry::new();
        registry.add(discriminating("vehicleResult", "carResult")).unwrap();
        assert!(!registry.get("vehicleResult").unwrap().has_nested_result_maps());
        registry.add(nested("carResult")).unwrap();
        assert!(registry.get("vehicleResult").unwrap().has_nested_result_maps());
    }

    #[test]
    fn test_flat_discriminator_case_does_not_force() {
        let mut registry = DescriptorRegistry::new();
        registry.add(flat("carResult")).unwrap();
        registry.add(discriminating("vehicleResult", "carResult")).unwrap();
        assert!(!registry.get("vehicleResult").unwrap().has_nested_result_maps());
    }

    #[test]
    fn test_freeze_shares_descriptors() {
        let mut registry = DescriptorRegistry::new();
        registry.add(flat("vehicleResult")).unwrap();
        let shared = registry.freeze();
        assert_eq!(shared.len(), 1);
        let a = shared.require("vehicleResult").unwrap();
        let b = shared.get("vehicleResult").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_require_missing_descriptor() {
        let shared = DescriptorRegistry::new().freeze();
        assert!(shared.is_empty());
        assert!(matches!(
            shared.require("missing"),
            Err(RowMapError::Mapping(MappingError::DescriptorNotFound { .. }))
        ));
    }
}
