//! Save domain — versioned JSON persistence.
//!
//! Native builds write `berryfield_save.json` next to the executable via
//! a temp-file-then-rename so a crash mid-write never corrupts the save.
//! WASM builds use browser localStorage. A missing save, a parse failure,
//! or a version mismatch all fall back to a fresh game.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::shared::*;

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_or_start_fresh).add_systems(
            Update,
            autosave_on_day_end
                .in_set(DayEndWork::Persist)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ───────────────────────────────────────────────────────────────────────
// Save layout
// ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSave {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySave {
    pub total_harvested: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub day_number: u32,
    /// Fraction of the day elapsed, 0..1.
    pub time_of_day: f32,
    /// Redundant with the day number (weather is a pure function of it);
    /// kept in the document for readability.
    pub weather: Weather,
    pub grid: GridSnapshot,
    pub crops: BTreeMap<String, Crop>,
    pub economy: EconomyView,
    pub player: PlayerSave,
    pub inventory: InventorySave,
}

pub fn collect_save_data(
    clock: &GameClock,
    grid: &FarmGrid,
    crops: &CropField,
    ledger: &Ledger,
    farmer: &FarmerState,
) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        day_number: clock.day_number,
        time_of_day: clock.ratio(),
        weather: clock.weather(),
        grid: grid.snapshot(),
        crops: crops.snapshot(),
        economy: ledger.snapshot(),
        player: PlayerSave {
            x: farmer.pos.x,
            y: farmer.pos.y,
            z: farmer.pos.z,
        },
        inventory: InventorySave {
            total_harvested: ledger.total_harvested,
        },
    }
}

/// Restores a save into live state. Returns false (leaving state
/// untouched) on a version mismatch.
pub fn apply_save_data(
    data: &SaveData,
    clock: &mut GameClock,
    grid: &mut FarmGrid,
    crops: &mut CropField,
    ledger: &mut Ledger,
    farmer: &mut FarmerState,
) -> bool {
    if data.version != SAVE_VERSION {
        return false;
    }

    clock.set_day(data.day_number);
    clock.set_ratio(data.time_of_day);
    grid.restore(&data.grid);
    crops.restore(&data.crops);
    ledger.restore(&data.economy);
    ledger.total_harvested = data.inventory.total_harvested;

    // An expansion recorded in the ledger must survive even if the grid
    // snapshot predates it.
    if ledger.farm_rows > grid.rows {
        let missing = ledger.farm_rows - grid.rows;
        grid.expand_rows(missing);
    }

    farmer.pos = Vec3::new(data.player.x, data.player.y, data.player.z);
    true
}

// ───────────────────────────────────────────────────────────────────────
// Storage backends
// ───────────────────────────────────────────────────────────────────────

#[cfg(not(target_arch = "wasm32"))]
fn save_path() -> std::path::PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("berryfield_save.json")
}

#[cfg(not(target_arch = "wasm32"))]
fn write_save(json: &str) -> std::io::Result<()> {
    let path = save_path();
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn read_save() -> Option<String> {
    std::fs::read_to_string(save_path()).ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn delete_save() {
    let _ = std::fs::remove_file(save_path());
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn write_save(json: &str) -> std::io::Result<()> {
    local_storage()
        .and_then(|storage| storage.set_item(SAVE_KEY, json).ok())
        .ok_or_else(|| std::io::Error::other("localStorage unavailable"))
}

#[cfg(target_arch = "wasm32")]
fn read_save() -> Option<String> {
    local_storage()?.get_item(SAVE_KEY).ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn delete_save() {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(SAVE_KEY);
    }
}

// ───────────────────────────────────────────────────────────────────────
// Systems
// ───────────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn load_or_start_fresh(
    mut clock: ResMut<GameClock>,
    mut grid: ResMut<FarmGrid>,
    mut crops: ResMut<CropField>,
    mut ledger: ResMut<Ledger>,
    mut farmer: ResMut<FarmerState>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    match read_save().and_then(|json| serde_json::from_str::<SaveData>(&json).ok()) {
        Some(data) => {
            if apply_save_data(
                &data,
                &mut clock,
                &mut grid,
                &mut crops,
                &mut ledger,
                &mut farmer,
            ) {
                info!("[Save] Loaded day {} save", data.day_number);
            } else {
                warn!(
                    "[Save] Version {} save ignored, starting fresh",
                    data.version
                );
            }
        }
        None => info!("[Save] No save found, starting fresh"),
    }

    next_state.set(GameState::Playing);
}

fn autosave_on_day_end(
    mut day_end_events: EventReader<DayEndEvent>,
    clock: Res<GameClock>,
    grid: Res<FarmGrid>,
    crops: Res<CropField>,
    ledger: Res<Ledger>,
    farmer: Res<FarmerState>,
) {
    if day_end_events.read().next().is_none() {
        return;
    }

    let data = collect_save_data(&clock, &grid, &crops, &ledger, &farmer);
    match serde_json::to_string(&data) {
        Ok(json) => match write_save(&json) {
            Ok(()) => info!("[Save] Autosaved at day {}", clock.day_number),
            Err(err) => warn!("[Save] Autosave failed: {}", err),
        },
        Err(err) => warn!("[Save] Serialize failed: {}", err),
    }
}

/// Collects and writes a save immediately, outside the day-end autosave.
/// Returns false when serialization or the write fails.
pub fn save_now(
    clock: &GameClock,
    grid: &FarmGrid,
    crops: &CropField,
    ledger: &Ledger,
    farmer: &FarmerState,
) -> bool {
    let data = collect_save_data(clock, grid, crops, ledger, farmer);
    match serde_json::to_string(&data) {
        Ok(json) => write_save(&json).is_ok(),
        Err(_) => false,
    }
}

/// Deletes the persisted save. Debug/reset hook.
pub fn reset_save() {
    delete_save();
}
