//! Shared components, resources, events, and states for Berryfield.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM SETS — cross-domain ordering
// ═══════════════════════════════════════════════════════════════════════

/// Per-frame ordering: the clock rolls days first, then day-end work, then
/// agent decisions (manual or auto), then the tile/trade handlers that apply
/// them. Configured once by the clock plugin.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Clock,
    Control,
    Apply,
}

/// Ordering chain for the work triggered by a `DayEndEvent`. All four run
/// between `TickSet::Clock` and `TickSet::Control` in the same frame the
/// day rolls, so day-end state is settled before any agent acts on it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayEndWork {
    /// Crop lifecycle advance + daily water-flag reset.
    Field,
    /// Loan interest accrual.
    Ledger,
    /// Expansion-pressure streak update.
    Strategy,
    /// Autosave snapshot.
    Persist,
}

// ═══════════════════════════════════════════════════════════════════════
// WEATHER & TOOLS
// ═══════════════════════════════════════════════════════════════════════

/// Cosmetic daily weather. Deterministic cycle; rain does not water crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
}

impl Weather {
    pub fn for_day(day_number: u32) -> Self {
        match day_number.saturating_sub(1) % 3 {
            0 => Weather::Sunny,
            1 => Weather::Cloudy,
            _ => Weather::Rainy,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Weather::Sunny => "☀️",
            Weather::Cloudy => "☁️",
            Weather::Rainy => "🌧️",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    Hoe,
    SeedBag,
    WateringCan,
    Hand,
    Shovel,
}

/// The tool the player has explicitly selected, if any. `None` means the
/// advisor picks per-tile. Cleared whenever auto-farm takes over.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ManualTool(pub Option<Tool>);

// ═══════════════════════════════════════════════════════════════════════
// TILE GRID
// ═══════════════════════════════════════════════════════════════════════

/// (row, col) — the stable key shared by the grid and the crop map.
pub type TileKey = (u32, u32);

pub fn tile_key_string(key: TileKey) -> String {
    format!("{},{}", key.0, key.1)
}

pub fn parse_tile_key(raw: &str) -> Option<TileKey> {
    let (row, col) = raw.split_once(',')?;
    Some((row.trim().parse().ok()?, col.trim().parse().ok()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Soil {
    Grass,
    Tilled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub soil: Soil,
    pub has_crop: bool,
    pub watered_today: bool,
}

impl Tile {
    fn fresh() -> Self {
        Self {
            soil: Soil::Grass,
            has_crop: false,
            watered_today: false,
        }
    }
}

/// Serialized form of the grid — dimensions plus per-tile state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub rows: u32,
    pub cols: u32,
    pub tile_size: f32,
    pub tiles: Vec<Vec<Tile>>,
}

/// The soil/crop-placement grid. Rows can grow (farm expansion) but the
/// grid never shrinks.
#[derive(Resource, Debug, Clone)]
pub struct FarmGrid {
    pub rows: u32,
    pub cols: u32,
    pub tile_size: f32,
    tiles: Vec<Vec<Tile>>,
}

impl Default for FarmGrid {
    fn default() -> Self {
        Self::new(GRID_ROWS, GRID_COLS, GRID_TILE_SIZE)
    }
}

impl FarmGrid {
    pub fn new(rows: u32, cols: u32, tile_size: f32) -> Self {
        Self {
            rows,
            cols,
            tile_size,
            tiles: vec![vec![Tile::fresh(); cols as usize]; rows as usize],
        }
    }

    pub fn tile(&self, row: u32, col: u32) -> Option<&Tile> {
        self.tiles.get(row as usize)?.get(col as usize)
    }

    fn tile_mut(&mut self, row: u32, col: u32) -> Option<&mut Tile> {
        self.tiles.get_mut(row as usize)?.get_mut(col as usize)
    }

    pub fn till(&mut self, row: u32, col: u32) -> bool {
        match self.tile_mut(row, col) {
            Some(tile) => {
                tile.soil = Soil::Tilled;
                true
            }
            None => false,
        }
    }

    /// Marks crop occupancy. Requires tilled, unoccupied soil.
    pub fn plant(&mut self, row: u32, col: u32) -> bool {
        match self.tile_mut(row, col) {
            Some(tile) if tile.soil == Soil::Tilled && !tile.has_crop => {
                tile.has_crop = true;
                tile.watered_today = false;
                true
            }
            _ => false,
        }
    }

    pub fn water(&mut self, row: u32, col: u32) -> bool {
        match self.tile_mut(row, col) {
            Some(tile) if tile.has_crop => {
                tile.watered_today = true;
                true
            }
            _ => false,
        }
    }

    /// Clears occupancy and the daily water flag. Grass is promoted to
    /// tilled so a shovelled plot is immediately replantable.
    pub fn clear(&mut self, row: u32, col: u32) -> bool {
        match self.tile_mut(row, col) {
            Some(tile) => {
                tile.has_crop = false;
                tile.watered_today = false;
                if tile.soil == Soil::Grass {
                    tile.soil = Soil::Tilled;
                }
                true
            }
            None => false,
        }
    }

    pub fn expand_rows(&mut self, extra_rows: u32) -> bool {
        if extra_rows == 0 {
            return false;
        }
        for _ in 0..extra_rows {
            self.tiles.push(vec![Tile::fresh(); self.cols as usize]);
        }
        self.rows += extra_rows;
        true
    }

    /// Affine mapping centered on the grid middle. Returns the tile's
    /// position on the ground plane as (x, z).
    pub fn tile_to_world(&self, row: u32, col: u32) -> Vec2 {
        let x = (col as f32 - (self.cols as f32 - 1.0) / 2.0) * self.tile_size;
        let z = (row as f32 - (self.rows as f32 - 1.0) / 2.0) * self.tile_size;
        Vec2::new(x, z)
    }

    /// Inverse of `tile_to_world`, rounding to the nearest tile. `None`
    /// when the position falls outside the grid.
    pub fn world_to_tile(&self, x: f32, z: f32) -> Option<TileKey> {
        let col = (x / self.tile_size + (self.cols as f32 - 1.0) / 2.0).round();
        let row = (z / self.tile_size + (self.rows as f32 - 1.0) / 2.0).round();
        if row < 0.0 || col < 0.0 || row >= self.rows as f32 || col >= self.cols as f32 {
            return None;
        }
        Some((row as u32, col as u32))
    }

    /// Keys of tiles that hold a crop and were watered today. Consumed by
    /// the crop lifecycle at the day boundary.
    pub fn watered_tile_keys(&self) -> HashSet<TileKey> {
        let mut keys = HashSet::new();
        for (row, tiles) in self.tiles.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                if tile.watered_today && tile.has_crop {
                    keys.insert((row as u32, col as u32));
                }
            }
        }
        keys
    }

    pub fn reset_water_flags(&mut self) {
        for row in self.tiles.iter_mut() {
            for tile in row.iter_mut() {
                tile.watered_today = false;
            }
        }
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            rows: self.rows,
            cols: self.cols,
            tile_size: self.tile_size,
            tiles: self.tiles.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &GridSnapshot) {
        self.rows = snapshot.rows;
        self.cols = snapshot.cols;
        self.tile_size = snapshot.tile_size;
        self.tiles = vec![vec![Tile::fresh(); self.cols as usize]; self.rows as usize];
        for (row, tiles) in snapshot.tiles.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                if let Some(slot) = self.tile_mut(row as u32, col as u32) {
                    *slot = *tile;
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CROP LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BerryQuality {
    Normal,
    Premium,
}

/// Result of a successful harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harvest {
    pub quantity: u32,
    pub quality: BerryQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub planted_day: u32,
    pub growth_days: u32,
    pub stage: u8,
    pub missed_water_days: u8,
    pub harvestable: bool,
    pub withered: bool,
}

/// Maps cumulative watered-days to a growth stage 1..=5 via the fixed
/// thresholds. Stage 5 is harvestable.
pub fn stage_from_growth(growth_days: u32) -> u8 {
    if growth_days >= CROP_STAGE_THRESHOLDS[4] {
        5
    } else if growth_days >= CROP_STAGE_THRESHOLDS[3] {
        4
    } else if growth_days >= CROP_STAGE_THRESHOLDS[2] {
        3
    } else if growth_days >= CROP_STAGE_THRESHOLDS[1] {
        2
    } else {
        1
    }
}

/// Reverse threshold lookup — the minimum growth-days that yields `stage`.
/// Used by the debug surface to force a crop into a given stage.
pub fn growth_days_for_stage(stage: u8) -> u32 {
    match stage {
        s if s >= 5 => CROP_STAGE_THRESHOLDS[4],
        4 => CROP_STAGE_THRESHOLDS[3],
        3 => CROP_STAGE_THRESHOLDS[2],
        2 => CROP_STAGE_THRESHOLDS[1],
        _ => CROP_STAGE_THRESHOLDS[0],
    }
}

/// Sparse per-planted-crop state, keyed by tile coordinate.
#[derive(Resource, Debug, Clone, Default)]
pub struct CropField {
    crops: HashMap<TileKey, Crop>,
}

impl CropField {
    pub fn plant(&mut self, key: TileKey, day_number: u32) {
        self.crops.insert(
            key,
            Crop {
                planted_day: day_number,
                growth_days: 0,
                stage: 1,
                missed_water_days: 0,
                harvestable: false,
                withered: false,
            },
        );
    }

    pub fn get(&self, key: TileKey) -> Option<&Crop> {
        self.crops.get(&key)
    }

    pub fn get_mut(&mut self, key: TileKey) -> Option<&mut Crop> {
        self.crops.get_mut(&key)
    }

    pub fn remove(&mut self, key: TileKey) -> bool {
        self.crops.remove(&key).is_some()
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TileKey, &Crop)> {
        self.crops.iter()
    }

    /// Watering only clears the missed-day counter; growth is credited at
    /// the day boundary from the grid's watered-key set.
    pub fn water(&mut self, key: TileKey) -> bool {
        match self.crops.get_mut(&key) {
            Some(crop) => {
                crop.missed_water_days = 0;
                true
            }
            None => false,
        }
    }

    /// Advances every non-terminal crop by one day. A crop that was not
    /// watered on two consecutive advances withers permanently; its
    /// growth-days and stage freeze.
    pub fn advance_day(&mut self, watered_keys: &HashSet<TileKey>) {
        for (key, crop) in self.crops.iter_mut() {
            if crop.harvestable || crop.withered {
                continue;
            }

            if watered_keys.contains(key) {
                crop.growth_days += 1;
                crop.missed_water_days = 0;
            } else {
                crop.missed_water_days += 1;
            }

            if crop.missed_water_days >= 2 {
                crop.withered = true;
                continue;
            }

            crop.stage = stage_from_growth(crop.growth_days);
            crop.harvestable = crop.stage == 5;
        }
    }

    /// Removes a harvestable crop and rolls its quality from the injected
    /// random source. Returns `None` when the crop is absent, unripe, or
    /// withered.
    pub fn harvest(&mut self, key: TileKey, rng: &mut impl Rng) -> Option<Harvest> {
        let crop = self.crops.get(&key)?;
        if !crop.harvestable || crop.withered {
            return None;
        }
        self.crops.remove(&key);

        let quality = if rng.gen::<f32>() < PREMIUM_RATE {
            BerryQuality::Premium
        } else {
            BerryQuality::Normal
        };
        Some(Harvest {
            quantity: 1,
            quality,
        })
    }

    pub fn snapshot(&self) -> BTreeMap<String, Crop> {
        self.crops
            .iter()
            .map(|(key, crop)| (tile_key_string(*key), *crop))
            .collect()
    }

    pub fn restore(&mut self, snapshot: &BTreeMap<String, Crop>) {
        self.crops.clear();
        for (raw, crop) in snapshot {
            if let Some(key) = parse_tile_key(raw) {
                self.crops.insert(key, *crop);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ECONOMY / LOAN LEDGER
// ═══════════════════════════════════════════════════════════════════════

/// Read-only flattened view of the ledger, consumed by the planner and the
/// HUD. Also the ledger's serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyView {
    pub coins: u32,
    pub seed_count: u32,
    pub normal_berries: u32,
    pub premium_berries: u32,
    pub farm_rows: u32,
    pub watering_can_level: u32,
    pub total_harvested: u32,
    pub loan_principal: u32,
    pub loan_interest_accrued: u32,
    pub loan_debt_total: u32,
}

/// Single source of truth for money, inventory, and debt. All monetary
/// fields are non-negative integers; interest rounds up.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    pub coins: u32,
    pub seed_count: u32,
    pub normal_berries: u32,
    pub premium_berries: u32,
    pub farm_rows: u32,
    pub watering_can_level: u32,
    pub total_harvested: u32,
    pub loan_principal: u32,
    pub loan_interest_accrued: u32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            coins: START_COINS,
            seed_count: 0,
            normal_berries: 0,
            premium_berries: 0,
            farm_rows: GRID_ROWS,
            watering_can_level: 1,
            total_harvested: 0,
            loan_principal: 0,
            loan_interest_accrued: 0,
        }
    }
}

impl Ledger {
    pub fn add_harvest(&mut self, harvest: &Harvest) {
        match harvest.quality {
            BerryQuality::Premium => self.premium_berries += harvest.quantity,
            BerryQuality::Normal => self.normal_berries += harvest.quantity,
        }
        self.total_harvested += harvest.quantity;
    }

    pub fn buy_seeds(&mut self, count: u32) -> bool {
        let total = SEED_PRICE * count;
        if self.coins < total {
            return false;
        }
        self.coins -= total;
        self.seed_count += count;
        true
    }

    pub fn consume_seeds(&mut self, count: u32) -> bool {
        if self.seed_count < count {
            return false;
        }
        self.seed_count -= count;
        true
    }

    /// Sells berries at fixed per-unit prices. Fails without side effects
    /// if either count exceeds held stock.
    pub fn sell_berries(&mut self, normal: u32, premium: u32) -> bool {
        if normal > self.normal_berries || premium > self.premium_berries {
            return false;
        }
        self.normal_berries -= normal;
        self.premium_berries -= premium;
        self.coins += normal * SELL_NORMAL + premium * SELL_PREMIUM;
        true
    }

    pub fn buy_watering_can_upgrade(&mut self) -> bool {
        if self.coins < WATERING_CAN_UPGRADE_PRICE {
            return false;
        }
        self.coins -= WATERING_CAN_UPGRADE_PRICE;
        self.watering_can_level += 1;
        true
    }

    /// Pays for one extra row. The grid's matching `expand_rows(1)` is a
    /// separate, coordinated call by whoever drives the purchase.
    pub fn buy_farm_expansion(&mut self) -> bool {
        if self.coins < FARM_EXPANSION_PRICE {
            return false;
        }
        self.coins -= FARM_EXPANSION_PRICE;
        self.farm_rows += 1;
        true
    }

    pub fn loan_debt_total(&self) -> u32 {
        self.loan_principal + self.loan_interest_accrued
    }

    /// Borrowing capacity scales with farm size.
    pub fn loan_limit(&self) -> u32 {
        let extra_rows = self.farm_rows.saturating_sub(GRID_ROWS);
        LOAN_BASE_LIMIT + extra_rows * LOAN_PER_EXTRA_ROW
    }

    /// Approves up to the remaining headroom under the loan limit and
    /// returns the amount actually granted (0 is a valid outcome).
    pub fn borrow(&mut self, amount: u32) -> u32 {
        if amount == 0 {
            return 0;
        }
        let headroom = self.loan_limit().saturating_sub(self.loan_debt_total());
        let approved = amount.min(headroom);
        if approved == 0 {
            return 0;
        }
        self.coins += approved;
        self.loan_principal += approved;
        approved
    }

    /// Adds `ceil(principal × daily rate × days)` to accrued interest.
    /// Ceiling rounding: interest never rounds down to 0 while principal
    /// is outstanding.
    pub fn accrue_interest(&mut self, days: u32) -> u32 {
        if days == 0 || self.loan_principal == 0 {
            return 0;
        }
        let added =
            (self.loan_principal as f64 * LOAN_DAILY_RATE * days as f64).ceil() as u32;
        self.loan_interest_accrued += added;
        added
    }

    /// Pays interest first, then principal, capped by both `max_payment`
    /// and held coins. Returns the total paid.
    pub fn repay(&mut self, max_payment: u32) -> u32 {
        let mut remaining = max_payment.min(self.coins);
        if remaining == 0 {
            return 0;
        }

        let interest_paid = remaining.min(self.loan_interest_accrued);
        self.loan_interest_accrued -= interest_paid;
        remaining -= interest_paid;

        let principal_paid = remaining.min(self.loan_principal);
        self.loan_principal -= principal_paid;

        let paid = interest_paid + principal_paid;
        self.coins -= paid;
        paid
    }

    pub fn view(&self) -> EconomyView {
        EconomyView {
            coins: self.coins,
            seed_count: self.seed_count,
            normal_berries: self.normal_berries,
            premium_berries: self.premium_berries,
            farm_rows: self.farm_rows,
            watering_can_level: self.watering_can_level,
            total_harvested: self.total_harvested,
            loan_principal: self.loan_principal,
            loan_interest_accrued: self.loan_interest_accrued,
            loan_debt_total: self.loan_debt_total(),
        }
    }

    pub fn snapshot(&self) -> EconomyView {
        self.view()
    }

    pub fn restore(&mut self, snapshot: &EconomyView) {
        self.coins = snapshot.coins;
        self.seed_count = snapshot.seed_count;
        self.normal_berries = snapshot.normal_berries;
        self.premium_berries = snapshot.premium_berries;
        self.farm_rows = snapshot.farm_rows;
        self.watering_can_level = snapshot.watering_can_level;
        self.total_harvested = snapshot.total_harvested;
        self.loan_principal = snapshot.loan_principal;
        self.loan_interest_accrued = snapshot.loan_interest_accrued;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GAME CLOCK
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    Morning,
    Noon,
    Dusk,
    Night,
}

impl DayPhase {
    pub fn label(self) -> &'static str {
        match self {
            DayPhase::Morning => "Morning",
            DayPhase::Noon => "Noon",
            DayPhase::Dusk => "Dusk",
            DayPhase::Night => "Night",
        }
    }
}

/// Simulated time, decoupled from wall-clock by `multiplier`. The in-game
/// day starts at 06:00.
#[derive(Resource, Debug, Clone)]
pub struct GameClock {
    pub day_number: u32,
    pub elapsed_in_day: f32,
    pub day_duration: f32,
    pub multiplier: f32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            day_number: 1,
            elapsed_in_day: 0.0,
            day_duration: DAY_DURATION_SECONDS,
            multiplier: 1.0,
        }
    }
}

impl GameClock {
    /// Accumulates already-multiplier-scaled simulated seconds and returns
    /// how many day boundaries were crossed. A large delta can roll more
    /// than one day.
    pub fn tick(&mut self, scaled_delta: f32) -> u32 {
        self.elapsed_in_day += scaled_delta;
        let mut rolled = 0;
        while self.elapsed_in_day >= self.day_duration {
            self.elapsed_in_day -= self.day_duration;
            self.day_number += 1;
            rolled += 1;
        }
        rolled
    }

    /// Elapsed-day ratio in 0..1.
    pub fn ratio(&self) -> f32 {
        self.elapsed_in_day / self.day_duration
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        self.elapsed_in_day = ratio.clamp(0.0, 0.9999) * self.day_duration;
    }

    pub fn set_day(&mut self, day_number: u32) {
        self.day_number = day_number.max(1);
    }

    pub fn phase(&self) -> DayPhase {
        let ratio = self.ratio();
        if ratio < 0.25 {
            DayPhase::Morning
        } else if ratio < 0.5 {
            DayPhase::Noon
        } else if ratio < 0.75 {
            DayPhase::Dusk
        } else {
            DayPhase::Night
        }
    }

    pub fn weather(&self) -> Weather {
        Weather::for_day(self.day_number)
    }

    /// 12-hour clock readout; ratio 0 is 06:00 am.
    pub fn clock_label(&self) -> String {
        let minutes = (self.ratio() * 24.0 * 60.0) as u32;
        let total = (6 * 60 + minutes) % (24 * 60);
        let hour24 = total / 60;
        let minute = total % 60;
        let suffix = if hour24 < 12 { "am" } else { "pm" };
        let hour12 = match hour24 % 12 {
            0 => 12,
            h => h,
        };
        format!("{:02}:{:02} {}", hour12, minute, suffix)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FARMER (the agent that walks the field)
// ═══════════════════════════════════════════════════════════════════════

/// Position on the ground plane. `pos.y` is the fixed standing height;
/// movement happens on x/z.
#[derive(Resource, Debug, Clone)]
pub struct FarmerState {
    pub pos: Vec3,
    pub speed: f32,
}

impl Default for FarmerState {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, FARMER_HEIGHT, 0.0),
            speed: FARMER_SPEED,
        }
    }
}

impl FarmerState {
    pub fn plane_pos(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.z)
    }

    /// Keeps the farmer within half a tile of the field edge.
    pub fn clamp_to_field(&mut self, grid: &FarmGrid) {
        let half_w = (grid.cols as f32 - 1.0) * grid.tile_size / 2.0 + 0.45;
        let half_h = (grid.rows as f32 - 1.0) * grid.tile_size / 2.0 + 0.45;
        self.pos.x = self.pos.x.clamp(-half_w, half_w);
        self.pos.z = self.pos.z.clamp(-half_h, half_h);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TASK PLANNER OUTPUT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Harvest,
    Shovel,
    Seed,
    Water,
    Hoe,
}

/// Ephemeral planner output; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Task {
    pub kind: TaskKind,
    pub row: u32,
    pub col: u32,
    pub world: Vec2,
    pub priority: i32,
    pub distance: f32,
}

/// Field-wide counts scanned from grid + crops each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldStats {
    pub active_crops: u32,
    pub harvestable: u32,
    pub withered: u32,
    pub unwatered_growing: u32,
    pub tilled_empty: u32,
    pub total_tiles: u32,
}

impl FieldStats {
    pub fn scan(grid: &FarmGrid, crops: &CropField) -> Self {
        let mut stats = FieldStats {
            total_tiles: grid.rows * grid.cols,
            ..Default::default()
        };

        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let Some(tile) = grid.tile(row, col) else {
                    continue;
                };
                if tile.soil == Soil::Tilled && !tile.has_crop {
                    stats.tilled_empty += 1;
                }

                let Some(crop) = crops.get((row, col)) else {
                    continue;
                };
                if crop.withered {
                    stats.withered += 1;
                    continue;
                }
                stats.active_crops += 1;
                if crop.harvestable {
                    stats.harvestable += 1;
                } else if !tile.watered_today {
                    stats.unwatered_growing += 1;
                }
            }
        }
        stats
    }
}

// ═══════════════════════════════════════════════════════════════════════
// AUTO-FARM STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskLevel {
    #[default]
    Stable,
    Stressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoTarget {
    pub kind: TaskKind,
    pub row: u32,
    pub col: u32,
}

/// Transient control-loop state. Not persisted; toggling auto-farm resets
/// the volatile parts.
#[derive(Resource, Debug, Clone, Default)]
pub struct AutoFarm {
    pub enabled: bool,
    pub risk: RiskLevel,
    pub target: Option<AutoTarget>,
    pub action_cooldown: f32,
    pub trade_cooldown: f32,
    pub action_count: u32,
    pub trade_count: u32,
    pub expansion_pressure_days: u32,
    pub last_speed_guard_day: u32,
}

impl AutoFarm {
    /// Flips the mode and drops any in-progress target. Actions are atomic
    /// single-tile operations, so nothing needs rolling back.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.target = None;
        self.action_cooldown = 0.0;
        self.trade_cooldown = 0.0;
        self.risk = RiskLevel::Stable;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT INTENT
// ═══════════════════════════════════════════════════════════════════════

/// Hardware input translated to game intent, rebuilt each frame in
/// PreUpdate by the input plugin.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub action: bool,
    /// Ground-plane position of a pointer click, if any.
    pub pointer_world: Option<Vec2>,
    pub select_tool: Option<Tool>,
    pub toggle_auto: bool,
    pub cycle_speed: bool,
    pub pause: bool,
    pub buy_seed: bool,
    pub sell_berries: bool,
    pub buy_can_upgrade: bool,
    pub buy_expansion: bool,
}

impl PlayerInput {
    /// True for any input that should disengage auto-farm.
    pub fn any_manual(&self) -> bool {
        self.move_axis != Vec2::ZERO
            || self.action
            || self.pointer_world.is_some()
            || self.select_tool.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SHARED RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// One-line status readout shown on the HUD. Any domain may overwrite it.
#[derive(Resource, Debug, Clone)]
pub struct StatusLine(pub String);

impl Default for StatusLine {
    fn default() -> Self {
        Self("WASD to move, Space to act, click a plot".to_string())
    }
}

/// Injected random source for harvest-quality rolls. Tests replace the
/// resource with a seeded generator for determinism.
#[derive(Resource)]
pub struct GameRng(pub rand::rngs::StdRng);

impl Default for GameRng {
    fn default() -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::from_entropy())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Sent by the clock once per crossed day boundary. `day` is the number of
/// the day that just began.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOrigin {
    Manual,
    Auto,
}

/// Request to perform a tile action. `tool: None` asks the field's tool
/// advisor to pick per tile state.
#[derive(Event, Debug, Clone)]
pub struct ToolActionEvent {
    pub origin: ActionOrigin,
    pub tool: Option<Tool>,
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeRequest {
    BuySeeds(u32),
    SellAllBerries,
    BuyWateringCanUpgrade,
    BuyFarmExpansion,
}

/// Manual shop transaction, handled by the economy plugin.
#[derive(Event, Debug, Clone)]
pub struct TradeRequestEvent {
    pub request: TradeRequest,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const GRID_ROWS: u32 = 6;
pub const GRID_COLS: u32 = 6;
pub const GRID_MAX_ROWS: u32 = 24;
pub const GRID_TILE_SIZE: f32 = 1.2;

pub const DAY_DURATION_SECONDS: f32 = 300.0;
pub const MAX_TIME_MULTIPLIER: f32 = 64.0;

/// Day-counts at which stages 1..=5 begin.
pub const CROP_STAGE_THRESHOLDS: [u32; 5] = [0, 1, 3, 6, 8];

pub const START_COINS: u32 = 100;
pub const SEED_PRICE: u32 = 10;
pub const WATERING_CAN_UPGRADE_PRICE: u32 = 200;
pub const FARM_EXPANSION_PRICE: u32 = 500;
pub const SELL_NORMAL: u32 = 25;
pub const SELL_PREMIUM: u32 = 50;
pub const PREMIUM_RATE: f32 = 0.2;

pub const LOAN_DAILY_RATE: f64 = 0.05;
pub const LOAN_BASE_LIMIT: u32 = 620;
pub const LOAN_PER_EXTRA_ROW: u32 = 180;

pub const OPERATING_CASH_RESERVE: u32 = 20;
pub const SEED_MIN_BATCH: u32 = 2;
pub const EXPANSION_UTILIZATION_THRESHOLD: f32 = 0.85;
pub const EXPANSION_STREAK_DAYS: u32 = 2;
pub const MAX_DEBT_TO_REVENUE: f32 = 0.65;
pub const WATER_URGENT_TIME_RATIO: f32 = 0.45;
pub const HOE_EMPTY_BUFFER_MIN: u32 = 2;
/// Per-crop revenue proxy used by the debt-to-revenue ratio.
pub const DEBT_REVENUE_PER_CROP: u32 = 30;

pub const FARMER_SPEED: f32 = 4.0;
pub const FARMER_HEIGHT: f32 = 0.8;
pub const AUTO_ARRIVAL_DISTANCE: f32 = 0.16;
pub const AUTO_ACTION_COOLDOWN: f32 = 0.12;
pub const AUTO_TRADE_COOLDOWN: f32 = 0.5;

pub const SAVE_VERSION: u32 = 1;
pub const SAVE_KEY: &str = "berryfield.save.v1";

/// Pixels per world unit for the placeholder 2D presentation.
pub const WORLD_TO_SCREEN: f32 = 40.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 600.0;

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════
