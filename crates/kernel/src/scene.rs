use delve_common::{EntityId, EntityKind, PrefabHandle, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An event record produced by every mutation to the scene.
///
/// The host drains these to mirror the scene into its own renderer or physics
/// world; tests use them to prove that teardown released every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneEvent {
    /// Entity was spawned with the given kind and local transform.
    Spawned {
        id: EntityId,
        kind: EntityKind,
        transform: Transform,
        parent: Option<EntityId>,
    },
    /// Entity was despawned.
    Despawned { id: EntityId, kind: EntityKind },
}

/// Per-entity data stored in the scene.
///
/// `transform` is relative to `parent` when one is set: the parent's position
/// and rotation apply to the child, the parent's scale does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub kind: EntityKind,
    pub transform: Transform,
    pub parent: Option<EntityId>,
    pub prefab: Option<PrefabHandle>,
    /// Invisible entities exist for collision only.
    pub visible: bool,
}

impl EntityData {
    pub fn new(kind: EntityKind, transform: Transform) -> Self {
        Self {
            kind,
            transform,
            parent: None,
            prefab: None,
            visible: true,
        }
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_prefab(mut self, prefab: PrefabHandle) -> Self {
        self.prefab = Some(prefab);
        self
    }

    pub fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// The authoritative set of objects instantiated by a generation pass.
///
/// Owned by the dungeon; renderers and gameplay systems derive from it and
/// query it by `EntityKind` instead of by string tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    entities: BTreeMap<EntityId, EntityData>,
    next_index: u64,
    /// Append-only log of all mutations since the last drain.
    #[serde(skip)]
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Read-only access to all entities (BTreeMap for deterministic iteration).
    pub fn entities(&self) -> &BTreeMap<EntityId, EntityData> {
        &self.entities
    }

    /// Spawn a new entity. Returns its id.
    pub fn spawn(&mut self, data: EntityData) -> EntityId {
        let id = EntityId::from_index(self.next_index);
        self.next_index += 1;
        tracing::trace!(index = id.index(), kind = %data.kind, "spawn");
        self.event_log.push(SceneEvent::Spawned {
            id,
            kind: data.kind,
            transform: data.transform,
            parent: data.parent,
        });
        self.entities.insert(id, data);
        id
    }

    /// Remove an entity. Returns the data if it existed.
    ///
    /// Children are not touched; use [`Scene::despawn_recursive`] for that.
    pub fn despawn(&mut self, id: EntityId) -> Option<EntityData> {
        let data = self.entities.remove(&id);
        if let Some(ref d) = data {
            self.event_log
                .push(SceneEvent::Despawned { id, kind: d.kind });
        }
        data
    }

    /// Remove an entity and everything parented to it, depth first.
    /// Returns how many entities were removed.
    pub fn despawn_recursive(&mut self, id: EntityId) -> usize {
        let mut removed = 0;
        for child in self.children_of(id) {
            removed += self.despawn_recursive(child);
        }
        if self.despawn(id).is_some() {
            removed += 1;
        }
        removed
    }

    /// Remove every entity. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.into_iter()
            .filter(|id| self.despawn(*id).is_some())
            .count()
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityData> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityData> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Ids of the entities whose parent is `parent`, in id order.
    pub fn children_of(&self, parent: EntityId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, d)| d.parent == Some(parent))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Iterate over entities of one kind, in id order.
    pub fn iter_kind(&self, kind: EntityKind) -> impl Iterator<Item = (EntityId, &EntityData)> {
        self.entities
            .iter()
            .filter(move |(_, d)| d.kind == kind)
            .map(|(id, d)| (*id, d))
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.iter_kind(kind).count()
    }

    /// Resolve an entity's transform in world space by walking its parents.
    pub fn world_transform(&self, id: EntityId) -> Option<Transform> {
        let data = self.entities.get(&id)?;
        let Some(parent) = data.parent else {
            return Some(data.transform);
        };
        let parent_t = self.world_transform(parent)?;
        let local = data.transform;
        Some(Transform {
            position: parent_t.position + parent_t.rotation * local.position,
            rotation: parent_t.rotation * local.rotation,
            scale: local.scale,
        })
    }

    /// Compute a deterministic hash of the scene for comparison.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, data) in &self.entities {
            mix(&mut h, &id.index().to_le_bytes());
            mix(&mut h, &[data.kind as u8, data.visible as u8]);
            if let Some(parent) = data.parent {
                mix(&mut h, &parent.index().to_le_bytes());
            }
            let t = &data.transform;
            for v in t.position.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in t.rotation.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in t.scale.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
        }
        h
    }
}
