//! Workshop objects: the id-indexed table of everything a hand can hold.
//!
//! Simulation data is kept apart from render nodes.  [`WorldObjects`] maps an
//! [`EntityId`] to its spatial record (position, velocity, grabbable flag) and
//! its kind; the billet's metal state lives in [`crate::billet::Billet`] under
//! the same id.  A presentation layer joins on the id only.
//!
//! Iteration order is spawn order, which is what makes grab tie-breaking
//! deterministic.

use crate::config::ForgeConfig;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable identifier of a workshop object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

// ── Tools ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Hammer,
    Tongs,
}

/// Immutable per-instance tool characteristics.
///
/// | Stat             | Effect                                                   |
/// |------------------|----------------------------------------------------------|
/// | `mass`           | shape gain scales with `mass / reference_tool_mass`      |
/// | `balance`        | multiplies `quality` into the tool factor                |
/// | `face_size`      | scales the strike radius                                 |
/// | `quality`        | tool factor of strike effectiveness                      |
/// | `speed_modifier` | scales measured downward speed before validation        |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolStats {
    pub mass: f32,
    pub balance: f32,
    pub face_size: f32,
    pub quality: f32,
    pub speed_modifier: f32,
}

impl ToolStats {
    pub const BASIC_HAMMER: ToolStats = ToolStats {
        mass: 1.0,
        balance: 1.0,
        face_size: 1.0,
        quality: 0.85,
        speed_modifier: 1.0,
    };

    pub const MASTER_HAMMER: ToolStats = ToolStats {
        mass: 1.0,
        balance: 1.0,
        face_size: 1.2,
        quality: 1.0,
        speed_modifier: 1.0,
    };

    pub const TONGS: ToolStats = ToolStats {
        mass: 0.6,
        balance: 1.0,
        face_size: 0.5,
        quality: 1.0,
        speed_modifier: 1.0,
    };

    /// The `toolQuality` factor of strike effectiveness.
    #[inline]
    pub fn effective_quality(&self) -> f32 {
        (self.quality * self.balance).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tool {
    pub kind: ToolKind,
    pub stats: ToolStats,
}

impl Tool {
    /// Only striking tools produce strikes when swung or released.
    #[inline]
    pub fn is_striking(&self) -> bool {
        self.kind == ToolKind::Hammer
    }
}

// ── Object table ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectKind {
    Tool(Tool),
    Billet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldObject {
    pub id: EntityId,
    pub kind: ObjectKind,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Capability flag; cleared while an object is out of reach (billet in the forge).
    pub grabbable: bool,
    /// Supported by a bench or rack; gravity only acts on objects that are not.
    pub resting: bool,
}

impl WorldObject {
    pub fn tool(&self) -> Option<&Tool> {
        match &self.kind {
            ObjectKind::Tool(tool) => Some(tool),
            ObjectKind::Billet => None,
        }
    }

    #[inline]
    pub fn is_billet(&self) -> bool {
        matches!(self.kind, ObjectKind::Billet)
    }
}

/// Every grabbable object, in spawn order.
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldObjects {
    objects: Vec<WorldObject>,
    next_id: u32,
}

impl WorldObjects {
    /// Add an object and return its id.  Ids increase monotonically.
    pub fn spawn(&mut self, kind: ObjectKind, position: Vec3) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.objects.push(WorldObject {
            id,
            kind,
            position,
            velocity: Vec3::ZERO,
            grabbable: true,
            resting: true,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&WorldObject> {
        let index = self.objects.binary_search_by_key(&id, |o| o.id).ok()?;
        Some(&self.objects[index])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut WorldObject> {
        let index = self.objects.binary_search_by_key(&id, |o| o.id).ok()?;
        Some(&mut self.objects[index])
    }

    pub fn tool(&self, id: EntityId) -> Option<&Tool> {
        self.get(id).and_then(WorldObject::tool)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter()
    }

    /// First tool of the given kind.
    pub fn find_tool(&self, kind: ToolKind) -> Option<EntityId> {
        self.objects
            .iter()
            .find(|o| o.tool().is_some_and(|t| t.kind == kind))
            .map(|o| o.id)
    }

    /// Replace a tool's stats in place (upgrades never destroy the tool).
    pub fn upgrade_tool(&mut self, kind: ToolKind, stats: ToolStats) -> bool {
        let Some(id) = self.find_tool(kind) else {
            return false;
        };
        match self.get_mut(id).map(|o| &mut o.kind) {
            Some(ObjectKind::Tool(tool)) => {
                tool.stats = stats;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

// ── Workshop layout ───────────────────────────────────────────────────────────

/// Where fresh billets are laid out: on the bench beside the forge.
pub fn billet_stock_position(config: &ForgeConfig) -> Vec3 {
    Vec3::from_array(config.forge_position) + Vec3::new(0.6, -0.1, 0.4)
}

/// Where the hammer rests at setup: beside the anvil face.
pub fn hammer_rest_position(config: &ForgeConfig) -> Vec3 {
    Vec3::from_array(config.anvil_position) + Vec3::new(0.35, 0.05, 0.1)
}

/// Where the tongs rest at setup: the other side of the anvil.
pub fn tongs_rest_position(config: &ForgeConfig) -> Vec3 {
    Vec3::from_array(config.anvil_position) + Vec3::new(-0.35, 0.05, 0.1)
}

/// Populate an empty table with the starting hammer, tongs, and billet.
/// Returns the billet's id.
pub fn spawn_workshop_objects(objects: &mut WorldObjects, config: &ForgeConfig) -> EntityId {
    objects.spawn(
        ObjectKind::Tool(Tool {
            kind: ToolKind::Hammer,
            stats: ToolStats::BASIC_HAMMER,
        }),
        hammer_rest_position(config),
    );
    objects.spawn(
        ObjectKind::Tool(Tool {
            kind: ToolKind::Tongs,
            stats: ToolStats::TONGS,
        }),
        tongs_rest_position(config),
    );
    objects.spawn(ObjectKind::Billet, billet_stock_position(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_spawn_order_and_resolve() {
        let mut objects = WorldObjects::default();
        let billet = spawn_workshop_objects(&mut objects, &ForgeConfig::default());
        assert_eq!(objects.len(), 3);
        assert_eq!(billet, EntityId(2));
        assert!(objects.get(billet).is_some_and(WorldObject::is_billet));

        let ids: Vec<_> = objects.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![EntityId(0), EntityId(1), EntityId(2)]);
    }

    #[test]
    fn upgrade_replaces_stats_in_place() {
        let mut objects = WorldObjects::default();
        spawn_workshop_objects(&mut objects, &ForgeConfig::default());
        let hammer = objects.find_tool(ToolKind::Hammer).unwrap();

        assert!(objects.upgrade_tool(ToolKind::Hammer, ToolStats::MASTER_HAMMER));
        assert_eq!(objects.find_tool(ToolKind::Hammer), Some(hammer));
        assert_eq!(objects.tool(hammer).unwrap().stats, ToolStats::MASTER_HAMMER);
    }

    #[test]
    fn only_hammers_strike() {
        let tongs = Tool {
            kind: ToolKind::Tongs,
            stats: ToolStats::TONGS,
        };
        assert!(!tongs.is_striking());
        assert!((ToolStats::BASIC_HAMMER.effective_quality() - 0.85).abs() < 1e-6);
    }
}
