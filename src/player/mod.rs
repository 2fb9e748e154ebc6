//! Player domain — manual control: movement, tool selection, tile
//! actions, shop hotkeys, and the pause toggle.

use bevy::prelude::*;

use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (select_manual_tool, manual_movement, manual_actions, shop_hotkeys)
                .chain()
                .in_set(TickSet::Control)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(Update, toggle_pause);
    }
}

fn select_manual_tool(
    input: Res<PlayerInput>,
    mut manual_tool: ResMut<ManualTool>,
    mut status: ResMut<StatusLine>,
) {
    let Some(tool) = input.select_tool else {
        return;
    };
    manual_tool.0 = Some(tool);
    status.0 = format!("Selected {:?}", tool);
}

/// Walking runs on raw frame time — the time multiplier speeds up the
/// farm, not the player's hands.
fn manual_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    auto: Res<AutoFarm>,
    grid: Res<FarmGrid>,
    mut farmer: ResMut<FarmerState>,
) {
    if auto.enabled || input.move_axis == Vec2::ZERO {
        return;
    }
    let step = input.move_axis * farmer.speed * time.delta_secs();
    farmer.pos.x += step.x;
    // Screen "up" walks toward the top of the field (negative z).
    farmer.pos.z -= step.y;
    farmer.clamp_to_field(&grid);
}

/// Action key targets the tile the farmer stands on; a click targets the
/// clicked tile. Both route through the same tool-action event the
/// auto-farm uses.
fn manual_actions(
    input: Res<PlayerInput>,
    grid: Res<FarmGrid>,
    farmer: Res<FarmerState>,
    manual_tool: Res<ManualTool>,
    mut action_events: EventWriter<ToolActionEvent>,
) {
    let mut targets: Vec<TileKey> = Vec::new();

    if input.action {
        let here = farmer.plane_pos();
        if let Some(key) = grid.world_to_tile(here.x, here.y) {
            targets.push(key);
        }
    }
    if let Some(pointer) = input.pointer_world {
        if let Some(key) = grid.world_to_tile(pointer.x, pointer.y) {
            targets.push(key);
        }
    }

    for (row, col) in targets {
        action_events.send(ToolActionEvent {
            origin: ActionOrigin::Manual,
            tool: manual_tool.0,
            row,
            col,
        });
    }
}

fn shop_hotkeys(input: Res<PlayerInput>, mut trade_events: EventWriter<TradeRequestEvent>) {
    if input.buy_seed {
        trade_events.send(TradeRequestEvent {
            request: TradeRequest::BuySeeds(1),
        });
    }
    if input.sell_berries {
        trade_events.send(TradeRequestEvent {
            request: TradeRequest::SellAllBerries,
        });
    }
    if input.buy_can_upgrade {
        trade_events.send(TradeRequestEvent {
            request: TradeRequest::BuyWateringCanUpgrade,
        });
    }
    if input.buy_expansion {
        trade_events.send(TradeRequestEvent {
            request: TradeRequest::BuyFarmExpansion,
        });
    }
}

fn toggle_pause(
    input: Res<PlayerInput>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.pause {
        return;
    }
    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        GameState::Loading => {}
    }
}
