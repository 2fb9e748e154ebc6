//! Field domain — the tile grid, crop lifecycle, and tool actions.
//!
//! Communicates with other domains exclusively through crate::shared
//! events/resources. Grid and crop state themselves live in shared
//! (`FarmGrid`, `CropField`); this plugin owns the systems that mutate
//! them: the tool-action handler and the day-boundary advance.

use bevy::prelude::*;

use crate::shared::*;

pub mod actions;
mod render;

pub struct FieldPlugin;

impl Plugin for FieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<render::FieldEntities>()
            .add_systems(
                Update,
                actions::handle_tool_actions
                    .in_set(TickSet::Apply)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                on_day_end
                    .in_set(DayEndWork::Field)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (render::sync_tile_sprites, render::sync_farmer_sprite)
                    .after(TickSet::Apply)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::Playing), render::spawn_farmer_sprite);
    }
}

/// End-of-day field work, in order:
/// 1. Collect the watered-tile key set while the daily flags still stand.
/// 2. Advance every crop's lifecycle against that set.
/// 3. Reset the daily water flags for the new day.
///
/// Runs once per DayEndEvent, so a multi-day clock jump advances crops
/// once per crossed day.
fn on_day_end(
    mut day_end_events: EventReader<DayEndEvent>,
    mut grid: ResMut<FarmGrid>,
    mut crops: ResMut<CropField>,
) {
    for event in day_end_events.read() {
        let watered = grid.watered_tile_keys();
        crops.advance_day(&watered);
        grid.reset_water_flags();

        let stats = FieldStats::scan(&grid, &crops);
        info!(
            "[Field] Day {} advance: {} active, {} harvestable, {} withered",
            event.day, stats.active_crops, stats.harvestable, stats.withered
        );
    }
}
