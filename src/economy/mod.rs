//! Economy domain — manual shop transactions and loan interest.
//!
//! The ledger itself (money, inventory, debt arithmetic) lives in shared;
//! this plugin owns the systems around it: trade-request handling and the
//! daily interest accrual.

use bevy::prelude::*;

use crate::shared::*;

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            handle_trade_requests
                .in_set(TickSet::Apply)
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(
            Update,
            accrue_interest_on_day_end
                .in_set(DayEndWork::Ledger)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Applies manual shop transactions. Every request is atomic on the
/// ledger; a failed purchase leaves no partial state, only a status hint.
fn handle_trade_requests(
    mut trade_events: EventReader<TradeRequestEvent>,
    mut ledger: ResMut<Ledger>,
    mut grid: ResMut<FarmGrid>,
    mut status: ResMut<StatusLine>,
) {
    for event in trade_events.read() {
        match event.request {
            TradeRequest::BuySeeds(count) => {
                if ledger.buy_seeds(count) {
                    status.0 = format!("Bought {} seeds", count);
                    info!("[Ledger] Bought {} seeds, {} coins left", count, ledger.coins);
                } else {
                    status.0 = "Not enough coins for seeds".to_string();
                }
            }

            TradeRequest::SellAllBerries => {
                let (normal, premium) = (ledger.normal_berries, ledger.premium_berries);
                if normal + premium == 0 {
                    status.0 = "Nothing to sell".to_string();
                } else if ledger.sell_berries(normal, premium) {
                    status.0 = format!("Sold {} berries", normal + premium);
                    info!(
                        "[Ledger] Sold {} normal + {} premium, coins now {}",
                        normal, premium, ledger.coins
                    );
                }
            }

            TradeRequest::BuyWateringCanUpgrade => {
                if ledger.buy_watering_can_upgrade() {
                    status.0 = format!("Watering can upgraded to L{}", ledger.watering_can_level);
                    info!("[Ledger] Watering can level {}", ledger.watering_can_level);
                } else {
                    status.0 = "Not enough coins for the upgrade".to_string();
                }
            }

            TradeRequest::BuyFarmExpansion => {
                if grid.rows >= GRID_MAX_ROWS {
                    status.0 = "Farm is at its maximum size".to_string();
                } else if ledger.buy_farm_expansion() {
                    grid.expand_rows(1);
                    status.0 = "Farm expanded +1 row".to_string();
                    info!("[Ledger] Farm expanded to {} rows", grid.rows);
                } else {
                    status.0 = "Not enough coins to expand".to_string();
                }
            }
        }
    }
}

/// Accrues exactly one day of loan interest per day boundary.
fn accrue_interest_on_day_end(
    mut day_end_events: EventReader<DayEndEvent>,
    mut ledger: ResMut<Ledger>,
    mut status: ResMut<StatusLine>,
) {
    for event in day_end_events.read() {
        let added = ledger.accrue_interest(1);
        if added > 0 {
            status.0 = format!("Day {} begins | loan interest +{}", event.day, added);
            info!(
                "[Ledger] Interest +{} on day {}, debt now {}",
                added,
                event.day,
                ledger.loan_debt_total()
            );
        } else {
            status.0 = format!("Day {} begins", event.day);
        }
    }
}
