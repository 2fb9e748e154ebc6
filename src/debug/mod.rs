//! Debug hooks — direct world manipulation for headless harnesses and
//! manual poking. Nothing here runs in a schedule; every helper takes the
//! `World` (or `App`) and mutates state the same way the live systems do.

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use crate::shared::*;

/// Point-in-time readout of the auto-farm controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFarmStatus {
    pub enabled: bool,
    pub target: Option<AutoTarget>,
    pub action_count: u32,
    pub trade_count: u32,
}

/// The controller's volatile internals plus the clock multiplier it
/// steers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFarmRuntime {
    pub risk: RiskLevel,
    pub expansion_pressure_days: u32,
    pub last_speed_guard_day: u32,
    pub time_multiplier: f32,
}

pub fn auto_farm_status(world: &World) -> AutoFarmStatus {
    let auto = world.resource::<AutoFarm>();
    AutoFarmStatus {
        enabled: auto.enabled,
        target: auto.target,
        action_count: auto.action_count,
        trade_count: auto.trade_count,
    }
}

pub fn auto_farm_runtime(world: &World) -> AutoFarmRuntime {
    let auto = world.resource::<AutoFarm>();
    AutoFarmRuntime {
        risk: auto.risk,
        expansion_pressure_days: auto.expansion_pressure_days,
        last_speed_guard_day: auto.last_speed_guard_day,
        time_multiplier: world.resource::<GameClock>().multiplier,
    }
}

pub fn set_day(world: &mut World, day_number: u32) {
    world.resource_mut::<GameClock>().set_day(day_number);
}

pub fn set_time_ratio(world: &mut World, ratio: f32) {
    world.resource_mut::<GameClock>().set_ratio(ratio);
}

pub fn set_auto_farm(world: &mut World, enabled: bool) {
    world.resource_mut::<AutoFarm>().set_enabled(enabled);
}

/// Clamps to the valid range and floors to a whole step, matching the
/// hotkey's doubling ladder.
pub fn set_time_multiplier(world: &mut World, multiplier: f32) {
    let clamped = multiplier.clamp(1.0, MAX_TIME_MULTIPLIER).floor();
    world.resource_mut::<GameClock>().multiplier = clamped;
}

pub fn force_tool(world: &mut World, tool: Option<Tool>) {
    world.resource_mut::<ManualTool>().0 = tool;
}

/// Queues one manual tool action on a tile and runs a frame so it lands.
pub fn perform_action(app: &mut App, tool: Option<Tool>, row: u32, col: u32) {
    app.world_mut().send_event(ToolActionEvent {
        origin: ActionOrigin::Manual,
        tool,
        row,
        col,
    });
    app.update();
}

/// Forces a crop on the tile to the given stage, tilling and planting
/// first if needed. Stage 5 is harvest-ready.
pub fn set_crop_stage(world: &mut World, row: u32, col: u32, stage: u8) {
    let key = (row, col);
    let day_number = world.resource::<GameClock>().day_number;

    {
        let mut grid = world.resource_mut::<FarmGrid>();
        grid.till(row, col);
        grid.plant(row, col);
    }

    let mut crops = world.resource_mut::<CropField>();
    if crops.get(key).is_none() {
        crops.plant(key, day_number);
    }
    if let Some(crop) = crops.get_mut(key) {
        let stage = stage.clamp(1, 5);
        crop.stage = stage;
        crop.growth_days = growth_days_for_stage(stage);
        crop.harvestable = stage == 5 && !crop.withered;
    }
}

/// Withers the crop on the tile in place, freezing its stage.
pub fn set_crop_withered(world: &mut World, row: u32, col: u32) {
    let mut crops = world.resource_mut::<CropField>();
    if let Some(crop) = crops.get_mut((row, col)) {
        crop.withered = true;
        crop.harvestable = false;
    }
}

/// Steps the app `ticks` times with a fixed simulated frame duration.
pub fn simulate_ticks(app: &mut App, ticks: u32, frame_seconds: f32) {
    let frame = Duration::from_secs_f32(frame_seconds);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(frame));
    // Virtual time clamps deltas to max_delta (0.25 s by default); widen it
    // so the requested frame duration reaches the systems unclamped.
    let mut virtual_time = app.world_mut().resource_mut::<Time<Virtual>>();
    if virtual_time.max_delta() < frame {
        virtual_time.set_max_delta(frame);
    }
    for _ in 0..ticks {
        app.update();
    }
}

/// Writes a save on demand, without waiting for the day-end autosave.
pub fn save_now(world: &World) -> bool {
    crate::save::save_now(
        world.resource::<GameClock>(),
        world.resource::<FarmGrid>(),
        world.resource::<CropField>(),
        world.resource::<Ledger>(),
        world.resource::<FarmerState>(),
    )
}

/// Wipes the persisted save.
pub fn reset_save() {
    crate::save::reset_save();
}
