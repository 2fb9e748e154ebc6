//! Tool advisor and the tile-action handler.

use bevy::prelude::*;

use crate::shared::*;

/// Recommends a tool from tile state. Used whenever no manual tool is
/// forced — both by manual play and by the auto-farm's action requests.
pub fn recommend_tool(tile: Option<&Tile>, crop: Option<&Crop>) -> Tool {
    let Some(tile) = tile else {
        return Tool::Hand;
    };
    if tile.soil == Soil::Grass {
        return Tool::Hoe;
    }
    if tile.soil == Soil::Tilled && !tile.has_crop {
        return Tool::SeedBag;
    }
    if crop.is_some_and(|c| c.withered) {
        return Tool::Shovel;
    }
    if crop.is_some_and(|c| c.harvestable) {
        return Tool::Hand;
    }
    Tool::WateringCan
}

/// Applies queued tile actions. Every action is a single atomic tile
/// operation; failures are silent no-ops apart from the status line.
///
/// Successful auto-originated actions are counted on the AutoFarm
/// resource so the control loop's bookkeeping stays accurate without a
/// return channel.
pub fn handle_tool_actions(
    mut action_events: EventReader<ToolActionEvent>,
    mut grid: ResMut<FarmGrid>,
    mut crops: ResMut<CropField>,
    mut ledger: ResMut<Ledger>,
    mut auto: ResMut<AutoFarm>,
    clock: Res<GameClock>,
    mut rng: ResMut<GameRng>,
    mut status: ResMut<StatusLine>,
) {
    for event in action_events.read() {
        let Some(tile) = grid.tile(event.row, event.col).copied() else {
            continue;
        };
        let key = (event.row, event.col);
        let tool = event
            .tool
            .unwrap_or_else(|| recommend_tool(Some(&tile), crops.get(key)));

        let success = match tool {
            Tool::Hoe => {
                let tilled = grid.till(event.row, event.col);
                if tilled {
                    status.0 = "Tilled the plot".to_string();
                }
                tilled
            }

            Tool::SeedBag => {
                // Empty pocket falls back to buying a single seed.
                if !ledger.consume_seeds(1) {
                    if !ledger.buy_seeds(1) {
                        status.0 = "Not enough coins for seeds".to_string();
                        continue;
                    }
                    ledger.consume_seeds(1);
                }

                let planted = grid.plant(event.row, event.col);
                if planted {
                    crops.plant(key, clock.day_number);
                    status.0 = "Planted a seed".to_string();
                } else {
                    status.0 = "Can't plant here".to_string();
                }
                planted
            }

            Tool::WateringCan => {
                let watered = grid.water(event.row, event.col);
                if watered {
                    crops.water(key);
                    status.0 = "Watered the crop".to_string();
                }
                watered
            }

            Tool::Shovel => {
                crops.remove(key);
                let cleared = grid.clear(event.row, event.col);
                if cleared {
                    status.0 = "Cleared the withered crop".to_string();
                }
                cleared
            }

            Tool::Hand => match crops.harvest(key, &mut rng.0) {
                Some(harvest) => {
                    ledger.add_harvest(&harvest);
                    grid.clear(event.row, event.col);
                    status.0 = match harvest.quality {
                        BerryQuality::Premium => "Harvested a premium berry".to_string(),
                        BerryQuality::Normal => "Harvested a berry".to_string(),
                    };
                    true
                }
                None => false,
            },
        };

        if event.origin == ActionOrigin::Auto && success {
            auto.action_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(soil: Soil, has_crop: bool) -> Tile {
        Tile {
            soil,
            has_crop,
            watered_today: false,
        }
    }

    fn crop(harvestable: bool, withered: bool) -> Crop {
        Crop {
            planted_day: 1,
            growth_days: 0,
            stage: if harvestable { 5 } else { 2 },
            missed_water_days: 0,
            harvestable,
            withered,
        }
    }

    #[test]
    fn test_advisor_covers_every_tile_state() {
        assert_eq!(recommend_tool(None, None), Tool::Hand);
        assert_eq!(recommend_tool(Some(&tile(Soil::Grass, false)), None), Tool::Hoe);
        assert_eq!(
            recommend_tool(Some(&tile(Soil::Tilled, false)), None),
            Tool::SeedBag
        );
        assert_eq!(
            recommend_tool(Some(&tile(Soil::Tilled, true)), Some(&crop(false, true))),
            Tool::Shovel
        );
        assert_eq!(
            recommend_tool(Some(&tile(Soil::Tilled, true)), Some(&crop(true, false))),
            Tool::Hand
        );
        assert_eq!(
            recommend_tool(Some(&tile(Soil::Tilled, true)), Some(&crop(false, false))),
            Tool::WateringCan
        );
    }
}
