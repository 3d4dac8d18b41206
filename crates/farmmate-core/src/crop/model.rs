//! Crop catalog domain models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FarmmateError, Result};
use crate::serde_util::id_string;

/// One crop offered by the backend (`GET /crops`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSummary {
    pub crop_id: i64,
    pub crop_name: String,
}

/// Cached linkage between a crop and its backend thread.
///
/// Invariant: `created` is true exactly when `thread_id` is non-empty. Use
/// [`CropEntry::attach_thread`] / [`CropEntry::detach_thread`] to mutate the
/// linkage so both fields always move together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropEntry {
    pub crop_id: i64,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planted_at: Option<String>,
}

impl CropEntry {
    /// A catalog entry with no thread attached.
    pub fn new(crop_id: i64) -> Self {
        Self {
            crop_id,
            created: false,
            thread_id: String::new(),
            address: String::new(),
            planted_at: None,
        }
    }

    /// Links this crop to a backend thread. An empty id detaches instead.
    pub fn attach_thread(&mut self, thread_id: impl Into<String>) {
        let thread_id = thread_id.into();
        if thread_id.is_empty() {
            self.detach_thread();
            return;
        }
        self.thread_id = thread_id;
        self.created = true;
    }

    /// Clears the thread linkage. Address and planting date are kept as
    /// defaults for a later re-creation.
    pub fn detach_thread(&mut self) {
        self.thread_id.clear();
        self.created = false;
    }

    pub fn thread_id(&self) -> Option<&str> {
        (!self.thread_id.is_empty()).then_some(self.thread_id.as_str())
    }

    pub fn is_consistent(&self) -> bool {
        self.created == !self.thread_id.is_empty()
    }

    /// Restores the invariant, trusting `thread_id`. Returns true if anything changed.
    pub fn repair(&mut self) -> bool {
        if self.is_consistent() {
            return false;
        }
        self.created = !self.thread_id.is_empty();
        true
    }
}

/// Crop tile shown on the crop list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropTile {
    pub name: String,
    pub crop_id: i64,
    pub created: bool,
}

/// Thread list of a member (`GET /members/{id}/threads`), keyed by crop name.
///
/// The value shape varies between backend versions (an object with a
/// `threadId`, a bare id, or just a truthy marker), so it is kept raw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadListing(pub BTreeMap<String, Value>);

impl ThreadListing {
    /// Whether the backend reports a thread for this crop.
    pub fn is_listed(&self, crop_name: &str) -> bool {
        match self.0.get(crop_name) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    /// Thread id reported for this crop, when the listing carries one.
    pub fn thread_id(&self, crop_name: &str) -> Option<String> {
        let id = match self.0.get(crop_name)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => match map.get("threadId")? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
            _ => None,
        };
        id.filter(|id| !id.is_empty())
    }
}

/// Client-side crop catalog (`crops_data`), keyed by crop name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropCatalog(BTreeMap<String, CropEntry>);

impl CropCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a catalog from the backend crop list, no crop created yet.
    pub fn from_available(crops: &[CropSummary]) -> Self {
        let mut catalog = Self::new();
        catalog.merge_available(crops);
        catalog
    }

    /// Adds crops missing from the catalog; existing entries keep their
    /// thread linkage. Returns the number of entries added.
    pub fn merge_available(&mut self, crops: &[CropSummary]) -> usize {
        let mut added = 0;
        for crop in crops {
            match self.0.get_mut(&crop.crop_name) {
                Some(entry) => entry.crop_id = crop.crop_id,
                None => {
                    self.0
                        .insert(crop.crop_name.clone(), CropEntry::new(crop.crop_id));
                    added += 1;
                }
            }
        }
        added
    }

    pub fn insert(&mut self, crop_name: impl Into<String>, entry: CropEntry) {
        self.0.insert(crop_name.into(), entry);
    }

    pub fn get(&self, crop_name: &str) -> Option<&CropEntry> {
        self.0.get(crop_name)
    }

    pub fn get_mut(&mut self, crop_name: &str) -> Option<&mut CropEntry> {
        self.0.get_mut(crop_name)
    }

    /// Like [`CropCatalog::get`], failing with `NotFound` for an unknown crop.
    pub fn require(&self, crop_name: &str) -> Result<&CropEntry> {
        self.get(crop_name)
            .ok_or_else(|| FarmmateError::not_found("crop", crop_name))
    }

    pub fn require_mut(&mut self, crop_name: &str) -> Result<&mut CropEntry> {
        self.0
            .get_mut(crop_name)
            .ok_or_else(|| FarmmateError::not_found("crop", crop_name))
    }

    /// Thread id of a crop, failing if the crop is unknown or has no thread.
    pub fn require_thread(&self, crop_name: &str) -> Result<String> {
        self.require(crop_name)?
            .thread_id()
            .map(str::to_string)
            .ok_or_else(|| FarmmateError::not_found("thread", crop_name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CropEntry)> {
        self.0.iter()
    }

    pub fn has_created(&self) -> bool {
        self.0.values().any(|entry| entry.created)
    }

    /// Repairs every entry violating the created/threadId invariant and
    /// returns the names of the repaired crops.
    pub fn repair(&mut self) -> Vec<String> {
        self.0
            .iter_mut()
            .filter_map(|(name, entry)| entry.repair().then(|| name.clone()))
            .collect()
    }

    /// Aligns the catalog with the member's thread list on the backend.
    ///
    /// Listed crops adopt the reported thread id when there is one; crops
    /// cached as created but no longer listed are detached. Returns the names
    /// of the entries that changed.
    pub fn reconcile_with(&mut self, listing: &ThreadListing) -> Vec<String> {
        let mut changed = Vec::new();
        for (name, entry) in self.0.iter_mut() {
            let before = entry.clone();
            if listing.is_listed(name) {
                if let Some(thread_id) = listing.thread_id(name) {
                    entry.attach_thread(thread_id);
                }
            } else if entry.created {
                entry.detach_thread();
            }
            if *entry != before {
                changed.push(name.clone());
            }
        }
        changed
    }

    /// Tiles for the crop list page, ordered by crop id.
    pub fn tiles(&self) -> Vec<CropTile> {
        let mut tiles: Vec<CropTile> = self
            .0
            .iter()
            .map(|(name, entry)| CropTile {
                name: name.clone(),
                crop_id: entry.crop_id,
                created: entry.created,
            })
            .collect();
        tiles.sort_by(|a, b| a.crop_id.cmp(&b.crop_id).then_with(|| a.name.cmp(&b.name)));
        tiles
    }
}

/// Response of `POST /members`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreated {
    #[serde(deserialize_with = "id_string")]
    pub member_id: String,
}
