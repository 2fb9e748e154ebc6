//! Auto-farm domain — the risk-aware control loop.
//!
//! Each tick while engaged: decay cooldowns, scan the field, reassess
//! risk, apply the speed guard, run the trade sweep when its cooldown
//! allows, then walk toward (and execute) the best-ranked task. Any
//! manual input disengages the loop immediately.

use bevy::prelude::*;

use crate::shared::*;

pub mod planner;
pub mod trade;

use planner::{collect_tasks, pick_next_task, StrategyFlags};
use trade::run_auto_shop;

pub struct AutoFarmPlugin;

impl Plugin for AutoFarmPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (toggle_auto_farm, disengage_on_manual_input, run_auto_farm)
                .chain()
                .in_set(TickSet::Control)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            update_expansion_streak
                .in_set(DayEndWork::Strategy)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ───────────────────────────────────────────────────────────────────────
// Engage / disengage
// ───────────────────────────────────────────────────────────────────────

fn toggle_auto_farm(
    input: Res<PlayerInput>,
    mut auto: ResMut<AutoFarm>,
    mut manual_tool: ResMut<ManualTool>,
    mut status: ResMut<StatusLine>,
) {
    if !input.toggle_auto {
        return;
    }
    let enable = !auto.enabled;
    auto.set_enabled(enable);
    if enable {
        manual_tool.0 = None;
        status.0 = "Auto farm enabled".to_string();
        info!("[AutoFarm] Engaged");
    } else {
        status.0 = "Auto farm disabled".to_string();
        info!("[AutoFarm] Disengaged");
    }
}

/// Movement, actions, clicks, or tool selection hand control back to the
/// player. Speed and shop hotkeys do not.
fn disengage_on_manual_input(
    input: Res<PlayerInput>,
    mut auto: ResMut<AutoFarm>,
    mut status: ResMut<StatusLine>,
) {
    if auto.enabled && input.any_manual() {
        auto.set_enabled(false);
        status.0 = "Manual control resumed".to_string();
        info!("[AutoFarm] Disengaged by manual input");
    }
}

// ───────────────────────────────────────────────────────────────────────
// Risk assessment
// ───────────────────────────────────────────────────────────────────────

/// Stressed when the farm is effectively broke, when a full row's worth
/// of crops sits unwatered, or when debt outruns projected revenue.
pub fn assess_risk(stats: &FieldStats, economy: &EconomyView, cols: u32) -> RiskLevel {
    let broke =
        economy.coins < SEED_PRICE && economy.seed_count == 0 && stats.active_crops == 0;
    let drought = stats.unwatered_growing >= cols;
    let revenue_floor = (stats.active_crops * DEBT_REVENUE_PER_CROP).max(1);
    let debt_heavy =
        economy.loan_debt_total as f32 / revenue_floor as f32 > MAX_DEBT_TO_REVENUE;

    if broke || drought || debt_heavy {
        RiskLevel::Stressed
    } else {
        RiskLevel::Stable
    }
}

// ───────────────────────────────────────────────────────────────────────
// Control loop
// ───────────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_auto_farm(
    time: Res<Time>,
    mut clock: ResMut<GameClock>,
    mut grid: ResMut<FarmGrid>,
    crops: Res<CropField>,
    mut ledger: ResMut<Ledger>,
    mut auto: ResMut<AutoFarm>,
    mut farmer: ResMut<FarmerState>,
    mut action_events: EventWriter<ToolActionEvent>,
    mut status: ResMut<StatusLine>,
) {
    if !auto.enabled {
        return;
    }

    // The loop runs on simulated time so behavior at 32× matches 1×.
    let dt = time.delta_secs() * clock.multiplier;
    auto.action_cooldown = (auto.action_cooldown - dt).max(0.0);
    auto.trade_cooldown = (auto.trade_cooldown - dt).max(0.0);

    let mut stats = FieldStats::scan(&grid, &crops);
    let economy = ledger.view();

    auto.risk = assess_risk(&stats, &economy, grid.cols);

    // Speed guard: a stressed farm never runs faster than real time.
    if clock.multiplier > 1.0
        && (stats.unwatered_growing >= grid.cols || auto.risk == RiskLevel::Stressed)
    {
        clock.multiplier = 1.0;
        auto.last_speed_guard_day = clock.day_number;
        status.0 = "Auto risk control: speed -> 1x".to_string();
        warn!(
            "[AutoFarm] Speed guard on day {}: {} unwatered, risk {:?}",
            clock.day_number, stats.unwatered_growing, auto.risk
        );
    }

    if auto.trade_cooldown <= 0.0 {
        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);
        // Trades may have changed seeds, coins, or the grid itself.
        stats = FieldStats::scan(&grid, &crops);
    }

    let economy = ledger.view();
    let strategy = StrategyFlags {
        debt_outstanding: economy.loan_debt_total > 0,
        high_debt_pressure: economy.loan_debt_total > 0 && auto.risk == RiskLevel::Stressed,
    };

    let tasks = collect_tasks(
        &grid,
        &crops,
        farmer.plane_pos(),
        &economy,
        clock.ratio(),
        &stats,
        &strategy,
    );

    let Some(task) = pick_next_task(&tasks) else {
        auto.target = None;
        status.0 = if auto.risk == RiskLevel::Stressed {
            "Auto risk control".to_string()
        } else {
            "Auto farm waiting for tasks".to_string()
        };
        return;
    };

    auto.target = Some(AutoTarget {
        kind: task.kind,
        row: task.row,
        col: task.col,
    });

    // Walk toward the task tile; snap when close enough.
    let here = farmer.plane_pos();
    let to_target = task.world - here;
    let distance = to_target.length();
    let step = farmer.speed * dt;

    if distance > AUTO_ARRIVAL_DISTANCE && distance > step {
        let dir = to_target / distance;
        farmer.pos.x += dir.x * step;
        farmer.pos.z += dir.y * step;
        farmer.clamp_to_field(&grid);
        return;
    }

    farmer.pos.x = task.world.x;
    farmer.pos.z = task.world.y;
    farmer.clamp_to_field(&grid);

    if auto.action_cooldown <= 0.0 {
        action_events.send(ToolActionEvent {
            origin: ActionOrigin::Auto,
            tool: None,
            row: task.row,
            col: task.col,
        });
        auto.action_cooldown = AUTO_ACTION_COOLDOWN;
        auto.target = None;
    }
}

// ───────────────────────────────────────────────────────────────────────
// Expansion pressure
// ───────────────────────────────────────────────────────────────────────

/// Counts consecutive day-ends at high field utilization. The trade sweep
/// spends the streak.
fn update_expansion_streak(
    mut day_end_events: EventReader<DayEndEvent>,
    grid: Res<FarmGrid>,
    crops: Res<CropField>,
    mut auto: ResMut<AutoFarm>,
) {
    for event in day_end_events.read() {
        let stats = FieldStats::scan(&grid, &crops);
        let utilization = stats.active_crops as f32 / stats.total_tiles.max(1) as f32;
        if utilization >= EXPANSION_UTILIZATION_THRESHOLD {
            auto.expansion_pressure_days += 1;
        } else {
            auto.expansion_pressure_days = 0;
        }
        info!(
            "[AutoFarm] Day {} utilization {:.2}, pressure streak {}",
            event.day, utilization, auto.expansion_pressure_days
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_stressed_when_broke() {
        let stats = FieldStats {
            total_tiles: 36,
            ..Default::default()
        };
        let economy = EconomyView {
            coins: 5,
            seed_count: 0,
            ..Ledger::default().view()
        };
        assert_eq!(assess_risk(&stats, &economy, GRID_COLS), RiskLevel::Stressed);
    }

    #[test]
    fn test_risk_stressed_on_row_wide_drought() {
        let stats = FieldStats {
            active_crops: 8,
            unwatered_growing: GRID_COLS,
            total_tiles: 36,
            ..Default::default()
        };
        let economy = Ledger::default().view();
        assert_eq!(assess_risk(&stats, &economy, GRID_COLS), RiskLevel::Stressed);
    }

    #[test]
    fn test_risk_stressed_when_debt_outruns_revenue() {
        let stats = FieldStats {
            active_crops: 2,
            total_tiles: 36,
            ..Default::default()
        };
        let mut ledger = Ledger::default();
        ledger.loan_principal = 100;
        // 100 / (2 × 30) ≈ 1.67, well past the ceiling.
        assert_eq!(
            assess_risk(&stats, &ledger.view(), GRID_COLS),
            RiskLevel::Stressed
        );
    }

    #[test]
    fn test_risk_stable_on_healthy_farm() {
        let stats = FieldStats {
            active_crops: 10,
            unwatered_growing: 2,
            total_tiles: 36,
            ..Default::default()
        };
        let mut ledger = Ledger::default();
        ledger.seed_count = 4;
        ledger.loan_principal = 50;
        // 50 / 300 is comfortably below the ceiling.
        assert_eq!(
            assess_risk(&stats, &ledger.view(), GRID_COLS),
            RiskLevel::Stable
        );
    }
}
