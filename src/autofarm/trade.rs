//! The auto-shop pass: one bounded sweep of trades per cooldown window.
//!
//! Order matters and mirrors the farm's cash flow: sell everything first,
//! then finance and buy seeds, then reserve for / attempt expansion, and
//! only then repay debt from whatever sits above the reserve.

use bevy::prelude::*;

use crate::shared::*;

use super::planner::compute_seed_purchase_count;

/// Whether the streak and the predicted post-expansion debt ratio justify
/// buying another row right now.
fn should_attempt_expansion(
    auto: &AutoFarm,
    grid: &FarmGrid,
    stats: &FieldStats,
    economy: &EconomyView,
) -> bool {
    if grid.rows >= GRID_MAX_ROWS {
        return false;
    }
    if auto.expansion_pressure_days < EXPANSION_STREAK_DAYS {
        return false;
    }

    let borrow_needed = FARM_EXPANSION_PRICE.saturating_sub(economy.coins);
    let predicted_debt = economy.loan_debt_total + borrow_needed;
    let revenue_floor = (stats.active_crops * DEBT_REVENUE_PER_CROP).max(1);
    predicted_debt as f32 / revenue_floor as f32 <= MAX_DEBT_TO_REVENUE
}

/// Runs the full trade sweep. Caller has already checked the trade
/// cooldown; this resets it only when at least one trade happened.
pub fn run_auto_shop(
    ledger: &mut Ledger,
    grid: &mut FarmGrid,
    auto: &mut AutoFarm,
    stats: &FieldStats,
    status: &mut StatusLine,
) {
    let mut changed = false;

    // 1. Sell all held berries.
    let economy = ledger.view();
    if economy.normal_berries > 0 || economy.premium_berries > 0 {
        if ledger.sell_berries(economy.normal_berries, economy.premium_berries) {
            changed = true;
            auto.trade_count += 1;
            status.0 = "Auto sold harvest".to_string();
            info!(
                "[AutoFarm] Sold {} berries, coins now {}",
                economy.normal_berries + economy.premium_berries,
                ledger.coins
            );
        }
    }

    // 2. Seed restock: batch demand up to the minimum batch, cap by the
    // column count, and cap harder while debt is outstanding.
    let mut economy = ledger.view();
    let base_need = stats.tilled_empty.saturating_sub(economy.seed_count);
    let target_need = if base_need > 0 {
        base_need.max(SEED_MIN_BATCH)
    } else {
        0
    };
    let mut capped_need = target_need.min(grid.cols);
    if economy.loan_debt_total > 0 {
        capped_need = capped_need.min(SEED_MIN_BATCH);
    }

    if capped_need > 0 {
        let seed_cost = capped_need * SEED_PRICE;
        let borrow_gap = seed_cost.saturating_sub(economy.coins);
        if borrow_gap > 0 {
            let borrowed = ledger.borrow(borrow_gap);
            if borrowed > 0 {
                changed = true;
                auto.trade_count += 1;
                info!("[AutoFarm] Borrowed {} for seeds", borrowed);
            }
        }

        economy = ledger.view();
        let buy_count = compute_seed_purchase_count(
            capped_need,
            economy.seed_count,
            economy.coins,
            SEED_PRICE,
            capped_need,
        );
        if buy_count > 0 && ledger.buy_seeds(buy_count) {
            changed = true;
            auto.trade_count += 1;
            status.0 = format!("Auto bought {} seeds", buy_count);
            info!("[AutoFarm] Bought {} seeds", buy_count);
        }
    }

    // 3. Expansion: reserve cash one day ahead of the streak threshold,
    // then borrow the gap and buy once the streak is met and the
    // predicted debt ratio stays acceptable.
    let mut expansion_reserve = 0;
    let economy = ledger.view();
    let near_expansion_window = grid.rows < GRID_MAX_ROWS
        && auto.expansion_pressure_days >= EXPANSION_STREAK_DAYS.saturating_sub(1);
    if near_expansion_window {
        expansion_reserve = FARM_EXPANSION_PRICE;
    }

    if should_attempt_expansion(auto, grid, stats, &economy) {
        let borrow_gap = FARM_EXPANSION_PRICE.saturating_sub(economy.coins);
        if borrow_gap > 0 {
            let borrowed = ledger.borrow(borrow_gap);
            if borrowed > 0 {
                changed = true;
                auto.trade_count += 1;
                info!("[AutoFarm] Borrowed {} toward expansion", borrowed);
            }
        }

        if ledger.buy_farm_expansion() {
            grid.expand_rows(1);
            auto.expansion_pressure_days = 0;
            expansion_reserve = 0;
            changed = true;
            auto.trade_count += 1;
            status.0 = "Auto expanded farm +1 row".to_string();
            info!("[AutoFarm] Expanded farm to {} rows", grid.rows);
        }
    }

    // 4. Repay from coins above the reserve. The reserve collapses to a
    // single seed's price whenever any debt is outstanding.
    let economy = ledger.view();
    let mut reserve = OPERATING_CASH_RESERVE + SEED_MIN_BATCH * SEED_PRICE + expansion_reserve;
    if economy.loan_debt_total > 0 {
        reserve = SEED_PRICE;
    }
    let repayable = economy.coins.saturating_sub(reserve);
    if repayable > 0 && economy.loan_debt_total > 0 {
        let repaid = ledger.repay(repayable);
        if repaid > 0 {
            changed = true;
            auto.trade_count += 1;
            status.0 = format!("Auto repaid {}", repaid);
            info!(
                "[AutoFarm] Repaid {}, debt now {}",
                repaid,
                ledger.loan_debt_total()
            );
        }
    }

    if changed {
        auto.trade_cooldown = AUTO_TRADE_COOLDOWN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Ledger, FarmGrid, AutoFarm, StatusLine) {
        (
            Ledger::default(),
            FarmGrid::default(),
            AutoFarm::default(),
            StatusLine::default(),
        )
    }

    #[test]
    fn test_sells_everything_and_restocks_seeds() {
        let (mut ledger, mut grid, mut auto, mut status) = setup();
        ledger.normal_berries = 3;
        ledger.premium_berries = 1;
        let stats = FieldStats {
            tilled_empty: 4,
            total_tiles: 36,
            ..Default::default()
        };

        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);

        assert_eq!(ledger.normal_berries, 0);
        assert_eq!(ledger.premium_berries, 0);
        // 100 start + 3×25 + 50 = 225, minus 4 seeds (demand 4 ≥ batch min).
        assert_eq!(ledger.seed_count, 4);
        assert_eq!(ledger.coins, 225 - 40);
        assert_eq!(ledger.loan_debt_total(), 0, "no borrowing when coins suffice");
        assert!(auto.trade_cooldown > 0.0);
        assert!(auto.trade_count >= 2);
    }

    #[test]
    fn test_borrows_shortfall_for_seed_batch() {
        let (mut ledger, mut grid, mut auto, mut status) = setup();
        ledger.coins = 0;
        let stats = FieldStats {
            tilled_empty: 2,
            total_tiles: 36,
            ..Default::default()
        };

        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);

        assert_eq!(ledger.seed_count, 2);
        assert_eq!(ledger.loan_principal, 20, "borrowed exactly the seed cost");
        assert_eq!(ledger.coins, 0, "all borrowed coins spent on seeds");
    }

    #[test]
    fn test_seed_need_capped_under_debt() {
        let (mut ledger, mut grid, mut auto, mut status) = setup();
        ledger.coins = 200;
        ledger.loan_principal = 50;
        let stats = FieldStats {
            tilled_empty: 6,
            total_tiles: 36,
            ..Default::default()
        };

        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);

        assert_eq!(
            ledger.seed_count, SEED_MIN_BATCH,
            "debt caps the batch regardless of demand"
        );
    }

    #[test]
    fn test_repays_above_reserve_interest_first() {
        let (mut ledger, mut grid, mut auto, mut status) = setup();
        ledger.coins = 100;
        ledger.loan_principal = 40;
        ledger.loan_interest_accrued = 5;
        let stats = FieldStats {
            total_tiles: 36,
            ..Default::default()
        };

        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);

        // Debt outstanding → reserve is one seed price (10); 90 repayable
        // covers the whole 45 debt.
        assert_eq!(ledger.loan_debt_total(), 0);
        assert_eq!(ledger.coins, 100 - 45);
    }

    #[test]
    fn test_reserve_holds_back_repayment_capacity() {
        let (mut ledger, mut grid, mut auto, mut status) = setup();
        ledger.coins = 15;
        ledger.loan_principal = 100;
        let stats = FieldStats {
            total_tiles: 36,
            ..Default::default()
        };

        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);

        // Reserve of one seed price leaves only 5 to repay.
        assert_eq!(ledger.coins, 10);
        assert_eq!(ledger.loan_principal, 95);
    }

    #[test]
    fn test_expansion_after_sustained_pressure() {
        let (mut ledger, mut grid, mut auto, mut status) = setup();
        ledger.coins = 100;
        auto.expansion_pressure_days = EXPANSION_STREAK_DAYS;
        // Plenty of active crops keeps the predicted debt ratio low.
        let stats = FieldStats {
            active_crops: 30,
            total_tiles: 36,
            ..Default::default()
        };

        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);

        assert_eq!(grid.rows, GRID_ROWS + 1);
        assert_eq!(ledger.farm_rows, GRID_ROWS + 1);
        assert_eq!(auto.expansion_pressure_days, 0, "streak resets on purchase");
        assert_eq!(ledger.loan_principal, 400, "borrowed the 500 − 100 gap");
    }

    #[test]
    fn test_expansion_skipped_when_predicted_ratio_too_high() {
        let (mut ledger, mut grid, mut auto, mut status) = setup();
        ledger.coins = 0;
        auto.expansion_pressure_days = EXPANSION_STREAK_DAYS;
        // Only one active crop: 500 / 30 is far beyond the max ratio.
        let stats = FieldStats {
            active_crops: 1,
            total_tiles: 36,
            ..Default::default()
        };

        run_auto_shop(&mut ledger, &mut grid, &mut auto, &stats, &mut status);

        assert_eq!(grid.rows, GRID_ROWS);
        assert_eq!(ledger.loan_principal, 0);
    }
}
