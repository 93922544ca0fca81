//! Dataset and resource provenance.
//!
//! Descriptors arrive with every theme result set (the same dataset/resource
//! pair is repeated across themes); rows are what the warehouse stores once
//! per external id.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::RowId;

/// A source dataset as described by the upstream catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// External dataset id.
    pub hdx_id: String,
    pub hdx_stub: String,
    pub title: String,
    pub hdx_provider_stub: String,
    pub hdx_provider_name: String,
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

/// A downloadable file within a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// External resource id.
    pub hdx_id: String,
    pub name: String,
    pub format: String,
    pub update_date: NaiveDate,
    #[serde(default)]
    pub is_hxl: bool,
    pub download_url: String,
    /// SHA-256 of the file contents, when fetched from a local copy.
    #[serde(default)]
    pub content_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub hdx_id: String,
    pub hdx_stub: String,
    pub title: String,
    pub hdx_provider_stub: String,
    pub hdx_provider_name: String,
}

impl From<&DatasetDescriptor> for Dataset {
    fn from(descriptor: &DatasetDescriptor) -> Self {
        Self {
            hdx_id: descriptor.hdx_id.clone(),
            hdx_stub: descriptor.hdx_stub.clone(),
            title: descriptor.title.clone(),
            hdx_provider_stub: descriptor.hdx_provider_stub.clone(),
            hdx_provider_name: descriptor.hdx_provider_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub dataset_ref: RowId,
    pub hdx_id: String,
    pub name: String,
    pub format: String,
    pub update_date: NaiveDate,
    pub is_hxl: bool,
    pub download_url: String,
    pub content_sha256: Option<String>,
}

impl Resource {
    pub fn new(dataset_ref: RowId, descriptor: &ResourceDescriptor) -> Self {
        Self {
            dataset_ref,
            hdx_id: descriptor.hdx_id.clone(),
            name: descriptor.name.clone(),
            format: descriptor.format.clone(),
            update_date: descriptor.update_date,
            is_hxl: descriptor.is_hxl,
            download_url: descriptor.download_url.clone(),
            content_sha256: descriptor.content_sha256.clone(),
        }
    }
}
