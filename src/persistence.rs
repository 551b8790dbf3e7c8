//! Progress persistence: money, stock, training, unlocks, reputation.
//!
//! Persistence is best-effort.  Loading happens once at startup; saving
//! happens in the `Last` schedule, after the frame's simulation has finished,
//! whenever a [`SaveRequest`] was written.  Every failure is logged and
//! swallowed: the forge keeps running on in-memory state.
//!
//! The on-disk document is the camelCase record
//! `{ version, money, inventory, trainingLevels, unlocks, reputation }`.
//! Missing fields load as defaults, so older or hand-edited files still load.

use crate::config::ForgeConfig;
use crate::economy::{Ledger, Weapon, MASTER_HAMMER_UNLOCK};
use crate::error::{ForgeError, ForgeResult};
use crate::forging::Training;
use crate::objects::{ToolKind, ToolStats, WorldObjects};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const STATE_VERSION: u32 = 1;

/// Key of the smithing skill in `trainingLevels`.
pub const SMITHING: &str = "smithing";

/// Default location of the file backend.
pub const DEFAULT_STATE_PATH: &str = "saves/state.toml";

/// Ask for the current progress to be written at the end of the frame.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct SaveRequest;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct TrainingRecord {
    pub level: u32,
    pub xp: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub money: u32,
    pub reputation: f32,
    pub unlocks: Vec<String>,
    pub inventory: Vec<Weapon>,
    pub training_levels: BTreeMap<String, TrainingRecord>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            money: crate::constants::STARTING_MONEY,
            reputation: crate::constants::STARTING_REPUTATION,
            unlocks: Vec::new(),
            inventory: Vec::new(),
            training_levels: BTreeMap::new(),
        }
    }
}

impl PersistedState {
    /// Capture the persistent parts of the simulation.
    pub fn snapshot(ledger: &Ledger, training: &Training) -> Self {
        let mut training_levels = BTreeMap::new();
        training_levels.insert(
            SMITHING.to_string(),
            TrainingRecord {
                level: training.level,
                xp: training.xp,
            },
        );
        Self {
            version: STATE_VERSION,
            money: ledger.money,
            reputation: ledger.reputation,
            unlocks: ledger.unlocks.iter().cloned().collect(),
            inventory: ledger.inventory.clone(),
            training_levels,
        }
    }

    /// Apply loaded progress on top of a freshly set-up workshop.
    pub fn restore(
        &self,
        ledger: &mut Ledger,
        training: &mut Training,
        objects: &mut WorldObjects,
        config: &ForgeConfig,
    ) {
        ledger.money = self.money;
        ledger.reputation = if self.reputation.is_finite() {
            self.reputation.clamp(0.0, config.max_reputation)
        } else {
            config.starting_reputation
        };
        ledger.unlocks = self.unlocks.iter().cloned().collect();
        ledger.inventory = self.inventory.clone();
        ledger.next_weapon_id = self
            .inventory
            .iter()
            .map(|w| w.id.0 + 1)
            .max()
            .unwrap_or(0);

        if let Some(record) = self.training_levels.get(SMITHING) {
            training.level = record.level.min(config.training_max_level);
            training.xp = record.xp.max(0.0);
        }
        if ledger.is_unlocked(MASTER_HAMMER_UNLOCK) {
            objects.upgrade_tool(ToolKind::Hammer, ToolStats::MASTER_HAMMER);
        }
    }
}

// ── Backends ──────────────────────────────────────────────────────────────────

/// Where progress is kept.  `load` returns `Ok(None)` when nothing was saved yet.
pub trait StateBackend: Send + Sync {
    fn load(&self) -> ForgeResult<Option<PersistedState>>;
    fn save(&self, state: &PersistedState) -> ForgeResult<()>;
    /// Short description for log lines.
    fn describe(&self) -> String;
}

/// TOML file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    pub path: PathBuf,
}

impl Default for FileBackend {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

impl StateBackend for FileBackend {
    fn load(&self) -> ForgeResult<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).map_err(|err| {
            ForgeError::PersistenceUnavailable(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))
        })?;
        parse_state_with_migration(&contents).map(Some)
    }

    fn save(&self, state: &PersistedState) -> ForgeResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|err| {
                ForgeError::PersistenceUnavailable(format!("failed to create save dir: {err}"))
            })?;
        }
        let serialized = toml::to_string_pretty(state).map_err(|err| {
            ForgeError::PersistenceUnavailable(format!("failed to serialize state: {err}"))
        })?;
        fs::write(&self.path, serialized).map_err(|err| {
            ForgeError::PersistenceUnavailable(format!(
                "failed to write {}: {err}",
                self.path.display()
            ))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process backend.  Clones share the same slot, so a test can keep a
/// handle and inspect what the app saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<Option<PersistedState>>>,
    offline: bool,
}

impl MemoryBackend {
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(state))),
            offline: false,
        }
    }

    /// A backend whose every call fails, standing in for an unreachable store.
    pub fn offline() -> Self {
        Self {
            slot: Arc::default(),
            offline: true,
        }
    }

    /// What was last saved, if anything.
    pub fn stored(&self) -> Option<PersistedState> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn check_online(&self) -> ForgeResult<()> {
        if self.offline {
            Err(ForgeError::PersistenceUnavailable(
                "memory backend is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl StateBackend for MemoryBackend {
    fn load(&self) -> ForgeResult<Option<PersistedState>> {
        self.check_online()?;
        let slot = self
            .slot
            .lock()
            .map_err(|_| ForgeError::PersistenceUnavailable("state lock poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, state: &PersistedState) -> ForgeResult<()> {
        self.check_online()?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ForgeError::PersistenceUnavailable("state lock poisoned".to_string()))?;
        *slot = Some(state.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// The active backend.
#[derive(Resource)]
pub struct StateStore {
    backend: Box<dyn StateBackend>,
}

impl StateStore {
    pub fn new(backend: impl StateBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn backend(&self) -> &dyn StateBackend {
        self.backend.as_ref()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(FileBackend::default())
    }
}

// ── Format ────────────────────────────────────────────────────────────────────

/// Decode a TOML document, filling in fields older files lack.
pub fn parse_state_with_migration(contents: &str) -> ForgeResult<PersistedState> {
    let mut value: toml::Value = toml::from_str(contents)
        .map_err(|err| ForgeError::CorruptState(format!("failed to parse state TOML: {err}")))?;

    migrate_state_value(&mut value)?;

    value
        .try_into::<PersistedState>()
        .map_err(|err| ForgeError::CorruptState(format!("failed to decode state: {err}")))
}

fn migrate_state_value(value: &mut toml::Value) -> ForgeResult<()> {
    let table = value
        .as_table_mut()
        .ok_or_else(|| ForgeError::CorruptState("state root must be a TOML table".to_string()))?;

    if !table.contains_key("version") {
        table.insert(
            "version".to_string(),
            toml::Value::Integer(STATE_VERSION as i64),
        );
    }

    let version = table
        .get("version")
        .and_then(toml::Value::as_integer)
        .ok_or_else(|| ForgeError::CorruptState("state version is invalid".to_string()))?;

    if version != STATE_VERSION as i64 {
        return Err(ForgeError::CorruptState(format!(
            "unsupported state version {} (expected {})",
            version, STATE_VERSION
        )));
    }
    Ok(())
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Startup: apply saved progress, or keep the defaults if there is none or
/// the backend fails.
pub fn load_persisted_state(
    store: Res<StateStore>,
    config: Res<ForgeConfig>,
    mut ledger: ResMut<Ledger>,
    mut training: ResMut<Training>,
    mut objects: ResMut<WorldObjects>,
) {
    let backend = store.backend();
    match backend.load() {
        Ok(Some(state)) => {
            state.restore(&mut ledger, &mut training, &mut objects, &config);
            info!(
                "Loaded progress from {} ({} coins, {} weapons)",
                backend.describe(),
                ledger.money,
                ledger.inventory.len()
            );
        }
        Ok(None) => {
            info!("No saved progress at {}; starting fresh", backend.describe());
        }
        Err(err) => {
            warn!("Could not load progress: {err}; starting fresh");
        }
    }
}

/// `Last`: write one snapshot if any save was requested this frame.
pub fn save_state_system(
    mut requests: MessageReader<SaveRequest>,
    store: Res<StateStore>,
    ledger: Res<Ledger>,
    training: Res<Training>,
) {
    if requests.read().count() == 0 {
        return;
    }
    let state = PersistedState::snapshot(&ledger, &training);
    let backend = store.backend();
    match backend.save(&state) {
        Ok(()) => debug!("Saved progress to {}", backend.describe()),
        Err(err) => error!("Failed to save progress: {err}"),
    }
}
