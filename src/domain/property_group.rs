//! Public property made of several OTA listings of the same place.

use serde::{Deserialize, Serialize};

use crate::domain::types::UnitId;

/// Image shown when a group has none configured.
pub const DEFAULT_IMAGE_URL: &str = "https://source.unsplash.com/featured/?pattaya,villa";

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PropertyGroup {
    pub slug: String,
    pub title: String,
    pub image_url: String,
    pub unit_ids: Vec<UnitId>,
}

/// Raw catalog entry as stored in the metadata file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GroupMeta {
    pub title: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub unit_ids: Vec<i32>,
}

impl PropertyGroup {
    /// Fills defaults and drops non-positive unit ids.
    pub fn from_meta(slug: &str, meta: GroupMeta) -> Self {
        Self {
            slug: slug.to_string(),
            title: meta
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| slug.to_string()),
            image_url: meta
                .image_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            unit_ids: meta
                .unit_ids
                .into_iter()
                .filter_map(|id| UnitId::new(id).ok())
                .collect(),
        }
    }

    /// Unit whose rate plan prices the whole group.
    pub fn pricing_unit(&self) -> Option<UnitId> {
        self.unit_ids.first().copied()
    }
}
