//! Dataset and resource provenance.

use std::collections::BTreeMap;

use tracing::{debug, info};

use hapi_db::Session;
use hapi_model::{Dataset, DatasetDescriptor, Resource, ResourceDescriptor, RowId};

use crate::error::{MetadataError, Result};

/// External id to warehouse id for every dataset and resource registered in
/// this run.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    datasets: BTreeMap<String, RowId>,
    resources: BTreeMap<String, RowId>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset and all of its resources.
    ///
    /// Descriptors repeat across theme result sets; a dataset already
    /// registered in this run is skipped.
    pub fn register<S: Session>(
        &mut self,
        session: &mut S,
        descriptor: &DatasetDescriptor,
    ) -> Result<RowId> {
        if let Some(id) = self.datasets.get(&descriptor.hdx_id) {
            return Ok(*id);
        }
        let dataset_ref = session.add(&Dataset::from(descriptor))?;
        self.datasets.insert(descriptor.hdx_id.clone(), dataset_ref);
        for resource in &descriptor.resources {
            self.register_resource(session, dataset_ref, resource)?;
        }
        session.commit()?;
        info!(
            dataset = %descriptor.hdx_stub,
            resources = descriptor.resources.len(),
            "registered dataset"
        );
        Ok(dataset_ref)
    }

    pub fn register_resource<S: Session>(
        &mut self,
        session: &mut S,
        dataset_ref: RowId,
        descriptor: &ResourceDescriptor,
    ) -> Result<RowId> {
        if let Some(id) = self.resources.get(&descriptor.hdx_id) {
            return Ok(*id);
        }
        let id = session.add(&Resource::new(dataset_ref, descriptor))?;
        debug!(resource = %descriptor.hdx_id, id, "registered resource");
        self.resources.insert(descriptor.hdx_id.clone(), id);
        Ok(id)
    }

    /// Warehouse id of a registered resource.
    pub fn resource_key_for(&self, hdx_id: &str) -> std::result::Result<RowId, MetadataError> {
        self.resources
            .get(hdx_id)
            .copied()
            .ok_or_else(|| MetadataError::UnknownResource(hdx_id.to_string()))
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}
