//! The task planner: a pure function from field + economy state to a
//! sorted action queue. No side effects — the control loop owns all
//! mutation.

use bevy::prelude::*;

use crate::shared::*;

/// Strategy context derived by the control loop before planning.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyFlags {
    pub debt_outstanding: bool,
    /// Debt outstanding while the risk assessment reads Stressed.
    pub high_debt_pressure: bool,
}

const PRIORITY_HARVEST: i32 = 0;
const PRIORITY_SHOVEL: i32 = 1;
const PRIORITY_SEED: i32 = 2;
const PRIORITY_WATER: i32 = 3;
const PRIORITY_HOE: i32 = 4;

/// Empty-tile buffer the hoe policy aims for: enough tilled-empty tiles
/// to absorb near-term harvests, proportional to the active crop count.
fn hoe_buffer_target(active_crops: u32, cols: u32) -> u32 {
    let raw = (active_crops as f32 * 0.2).ceil() as u32;
    raw.clamp(HOE_EMPTY_BUFFER_MIN, cols.max(HOE_EMPTY_BUFFER_MIN))
}

/// Scans every tile and produces the sorted task queue.
///
/// Classification precedence (first match wins): harvest → shovel →
/// seed → water → hoe. Base priority follows the same order, with one
/// dynamic promotion: when unwatered growing crops exist late in the day
/// (ratio ≥ the urgency threshold), watering outranks seeding so nothing
/// withers while planting is still pending.
///
/// Hoe tasks are suppressed entirely while loan debt is outstanding, and
/// otherwise stop once the tilled-empty buffer target is met. Under high
/// debt pressure, seed candidates are capped to the minimum batch so the
/// loop cannot leverage itself into more crops than the ledger can carry.
pub fn collect_tasks(
    grid: &FarmGrid,
    crops: &CropField,
    player_pos: Vec2,
    economy: &EconomyView,
    time_ratio: f32,
    stats: &FieldStats,
    strategy: &StrategyFlags,
) -> Vec<Task> {
    let water_urgent = stats.unwatered_growing > 0 && time_ratio >= WATER_URGENT_TIME_RATIO;
    let (seed_priority, water_priority) = if water_urgent {
        (PRIORITY_WATER, PRIORITY_SEED)
    } else {
        (PRIORITY_SEED, PRIORITY_WATER)
    };

    let seeding_affordable = economy.seed_count > 0 || economy.coins >= SEED_PRICE;
    let hoe_allowed = !strategy.debt_outstanding
        && stats.tilled_empty < hoe_buffer_target(stats.active_crops, grid.cols);
    let seed_cap = if strategy.high_debt_pressure {
        SEED_MIN_BATCH as usize
    } else {
        usize::MAX
    };

    let mut tasks = Vec::new();
    let mut seed_candidates = 0usize;

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let Some(tile) = grid.tile(row, col) else {
                continue;
            };
            let crop = crops.get((row, col));

            let (kind, priority) = if crop.is_some_and(|c| c.harvestable) {
                (TaskKind::Harvest, PRIORITY_HARVEST)
            } else if crop.is_some_and(|c| c.withered) {
                (TaskKind::Shovel, PRIORITY_SHOVEL)
            } else if tile.soil == Soil::Tilled && !tile.has_crop {
                if !seeding_affordable || seed_candidates >= seed_cap {
                    continue;
                }
                seed_candidates += 1;
                (TaskKind::Seed, seed_priority)
            } else if tile.has_crop && !tile.watered_today {
                (TaskKind::Water, water_priority)
            } else if tile.soil == Soil::Grass {
                if !hoe_allowed {
                    continue;
                }
                (TaskKind::Hoe, PRIORITY_HOE)
            } else {
                continue;
            };

            let world = grid.tile_to_world(row, col);
            tasks.push(Task {
                kind,
                row,
                col,
                world,
                priority,
                distance: world.distance(player_pos),
            });
        }
    }

    tasks.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.distance.total_cmp(&b.distance))
            .then(a.row.cmp(&b.row))
            .then(a.col.cmp(&b.col))
    });
    tasks
}

pub fn pick_next_task(tasks: &[Task]) -> Option<&Task> {
    tasks.first()
}

/// How many seeds to buy: the missing-seed demand, capped by what the
/// coins afford and by `max_buy`. Never overspends, never overshoots.
pub fn compute_seed_purchase_count(
    tilled_empty: u32,
    seed_count: u32,
    coins: u32,
    seed_price: u32,
    max_buy: u32,
) -> u32 {
    let missing = tilled_empty.saturating_sub(seed_count);
    if missing == 0 {
        return 0;
    }
    let affordable = coins / seed_price.max(1);
    missing.min(affordable).min(max_buy)
}
