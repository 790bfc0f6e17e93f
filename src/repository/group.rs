//! JSON-file catalog of public property groups.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::error;
use serde::Deserialize;

use crate::domain::property_group::{GroupMeta, PropertyGroup};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, GroupReader};

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    groups: BTreeMap<String, GroupMeta>,
}

fn parse_catalog(raw: &str) -> RepositoryResult<Vec<PropertyGroup>> {
    let catalog: CatalogFile =
        serde_json::from_str(raw).map_err(|e| RepositoryError::CatalogError(e.to_string()))?;

    Ok(catalog
        .groups
        .into_iter()
        .map(|(slug, meta)| PropertyGroup::from_meta(&slug, meta))
        .collect())
}

/// Read the catalog fresh on every call so edits apply without a restart.
/// A missing file is an empty catalog; a malformed one is logged and treated as empty.
pub fn load_catalog(path: &Path) -> Vec<PropertyGroup> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return vec![],
        Err(e) => {
            error!("Failed to read group catalog {}: {e}", path.display());
            return vec![];
        }
    };

    match parse_catalog(&raw) {
        Ok(groups) => groups,
        Err(e) => {
            error!("Failed to parse group catalog {}: {e}", path.display());
            vec![]
        }
    }
}

impl GroupReader for DieselRepository {
    fn list_groups(&self) -> RepositoryResult<Vec<PropertyGroup>> {
        Ok(load_catalog(&self.catalog_path))
    }

    fn get_group(&self, slug: &str) -> RepositoryResult<Option<PropertyGroup>> {
        Ok(load_catalog(&self.catalog_path)
            .into_iter()
            .find(|g| g.slug == slug))
    }
}
