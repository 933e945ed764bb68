//! Scene model: placed objects, their categories, and the in-memory store.
//!
//! This module defines what is in the viewport's world (`SceneObject`,
//! `Category`), the field-set used to create objects (`ObjectDraft`), a
//! sparse-update type for incremental edits (`ObjectPatch`), and the runtime
//! store that owns all live objects (`SceneStore`).
//!
//! Data flows into this layer from tool actions and from external generators
//! (JSON drafts). The render synchronizer reads from `SceneStore` via `list`
//! once per frame. The store knows nothing about selection or rendering.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ViewportError, ViewportResult};
use crate::geom::Vec3;

/// Unique identifier for a scene object.
pub type ObjectId = Uuid;

/// Shape tag used when a draft names none.
pub const DEFAULT_KIND: &str = "cube";

/// Grouping bucket for scene objects. Closed set; order is side-panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    Basic,
    Architecture,
    Furniture,
    Landscape,
    AiGenerated,
}

impl Category {
    pub const ALL: [Self; 5] = [Self::Basic, Self::Architecture, Self::Furniture, Self::Landscape, Self::AiGenerated];

    /// Wire / display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Architecture => "architecture",
            Self::Furniture => "furniture",
            Self::Landscape => "landscape",
            Self::AiGenerated => "ai-generated",
        }
    }

    /// Display color used for primitives of this category.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Basic => "#3B82F6",
            Self::Architecture => "#8B5CF6",
            Self::Furniture => "#F59E0B",
            Self::Landscape => "#10B981",
            Self::AiGenerated => "#EC4899",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// A placed, transform-bearing entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Assigned at creation; never changes.
    pub id: ObjectId,
    /// Display label.
    pub name: String,
    /// Concrete shape tag (`cube`, `wall`, `door`, `ai-mesh`, ...). Open set.
    #[serde(rename = "type")]
    pub kind: String,
    pub category: Category,
    pub position: Vec3,
    /// Zero or negative components are a degenerate but valid state.
    pub scale: Vec3,
    /// Euler angles in radians.
    #[serde(default)]
    pub rotation: Vec3,
    /// Controls render inclusion only.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Blocks pointer-driven transform edits.
    #[serde(default)]
    pub locked: bool,
}

fn default_true() -> bool {
    true
}

/// Field-set for a new object. Unset fields take documented defaults:
/// kind `cube`, category `basic`, position origin, scale one, rotation zero,
/// visible, unlocked, and a name derived from the kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDraft {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<Category>,
    pub position: Option<Vec3>,
    pub scale: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

impl ObjectDraft {
    /// Draft of the given shape and category with every other field defaulted.
    #[must_use]
    pub fn new(kind: impl Into<String>, category: Category) -> Self {
        Self { kind: Some(kind.into()), category: Some(category), ..Default::default() }
    }

    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Sparse update for a scene object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

/// In-memory store of scene objects, iterated in insertion order.
#[derive(Debug, Default)]
pub struct SceneStore {
    objects: HashMap<ObjectId, SceneObject>,
    order: Vec<ObjectId>,
    created: u64,
}

impl SceneStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new object built from `draft` and return its fresh id.
    pub fn create(&mut self, draft: ObjectDraft) -> ObjectId {
        let mut id = Uuid::new_v4();
        while self.objects.contains_key(&id) {
            id = Uuid::new_v4();
        }
        self.created += 1;

        let kind = draft.kind.unwrap_or_else(|| DEFAULT_KIND.to_owned());
        let name = draft.name.unwrap_or_else(|| format!("{kind} {}", self.created));
        let obj = SceneObject {
            id,
            name,
            kind,
            category: draft.category.unwrap_or_default(),
            position: draft.position.unwrap_or(Vec3::ZERO),
            scale: draft.scale.unwrap_or(Vec3::ONE),
            rotation: draft.rotation.unwrap_or(Vec3::ZERO),
            visible: draft.visible.unwrap_or(true),
            locked: draft.locked.unwrap_or(false),
        };
        self.objects.insert(id, obj);
        self.order.push(id);
        id
    }

    /// Create one object per draft, returning ids in batch order.
    pub fn ingest(&mut self, drafts: impl IntoIterator<Item = ObjectDraft>) -> Vec<ObjectId> {
        drafts.into_iter().map(|d| self.create(d)).collect()
    }

    /// Merge the present fields of `patch` into the object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the store.
    pub fn update(&mut self, id: &ObjectId, patch: &ObjectPatch) -> ViewportResult<()> {
        let obj = self.objects.get_mut(id).ok_or(ViewportError::NotFound(*id))?;
        if let Some(ref name) = patch.name {
            obj.name.clone_from(name);
        }
        if let Some(p) = patch.position {
            obj.position = p;
        }
        if let Some(s) = patch.scale {
            obj.scale = s;
        }
        if let Some(r) = patch.rotation {
            obj.rotation = r;
        }
        if let Some(v) = patch.visible {
            obj.visible = v;
        }
        if let Some(l) = patch.locked {
            obj.locked = l;
        }
        Ok(())
    }

    /// Remove an object, returning it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if `id` is not in the store.
    pub fn delete(&mut self, id: &ObjectId) -> ViewportResult<SceneObject> {
        let obj = self.objects.remove(id).ok_or(ViewportError::NotFound(*id))?;
        self.order.retain(|o| o != id);
        Ok(obj)
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// All objects in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<&SceneObject> {
        self.order.iter().filter_map(|id| self.objects.get(id)).collect()
    }

    /// Ids grouped by category, each group in insertion order. Categories with
    /// no objects are omitted. Derived fresh on every call.
    #[must_use]
    pub fn group_by_category(&self) -> BTreeMap<Category, Vec<ObjectId>> {
        let mut groups: BTreeMap<Category, Vec<ObjectId>> = BTreeMap::new();
        for obj in self.list() {
            groups.entry(obj.category).or_default().push(obj.id);
        }
        groups
    }

    /// Mean position of visible objects, or `None` when nothing is visible.
    #[must_use]
    pub fn visible_centroid(&self) -> Option<Vec3> {
        let visible: Vec<&SceneObject> = self.list().into_iter().filter(|o| o.visible).collect();
        if visible.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = visible.len() as f64;
        let sum = visible.iter().fold(Vec3::ZERO, |acc, o| acc + o.position);
        Some(sum * (1.0 / n))
    }

    /// Number of objects currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the store contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
