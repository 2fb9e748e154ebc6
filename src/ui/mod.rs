//! UI domain — the HUD readout. Pure presentation: reads shared state,
//! writes text, touches nothing else.

use bevy::prelude::*;

use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), spawn_hud)
            .add_systems(
                Update,
                (sync_hud_text, sync_status_text)
                    .after(TickSet::Apply)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

#[derive(Component)]
struct HudText;

#[derive(Component)]
struct StatusText;

fn spawn_hud(mut commands: Commands, existing: Query<Entity, With<HudText>>) {
    // OnEnter(Playing) fires again after unpausing.
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        HudText,
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgb(0.92, 0.92, 0.85)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));

    commands.spawn((
        StatusText,
        Text::new(""),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.80, 0.85, 0.70)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(8.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn sync_hud_text(
    clock: Res<GameClock>,
    ledger: Res<Ledger>,
    auto: Res<AutoFarm>,
    mut query: Query<&mut Text, With<HudText>>,
) {
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };

    let economy = ledger.view();
    let mode = if auto.enabled {
        match auto.risk {
            RiskLevel::Stressed => "Auto: risk control",
            RiskLevel::Stable => "Auto: stable growth",
        }
    } else {
        "Manual"
    };

    text.0 = format!(
        "Day {} {} {} | {}x\n{} coins | debt {} | {} seeds | {} berries | can L{}\n{}",
        clock.day_number,
        clock.clock_label(),
        clock.weather().icon(),
        clock.multiplier as u32,
        economy.coins,
        economy.loan_debt_total,
        economy.seed_count,
        economy.normal_berries + economy.premium_berries,
        economy.watering_can_level,
        mode,
    );
}

fn sync_status_text(status: Res<StatusLine>, mut query: Query<&mut Text, With<StatusText>>) {
    if !status.is_changed() {
        return;
    }
    let Ok(mut text) = query.get_single_mut() else {
        return;
    };
    text.0 = status.0.clone();
}
