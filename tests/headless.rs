//! Headless integration tests for Berryfield.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic plugins (no windowing or asset loading), and verify that
//! the clock, field, economy, and auto-farm loops work together.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use berryfield::debug;
use berryfield::shared::*;
use berryfield::{autofarm, clock, economy, field, player};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a minimal Bevy app with all shared resources, events, and logic
/// plugins registered but NO rendering, windowing, or input reading.
/// Tests drive `PlayerInput` directly.
fn build_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.init_resource::<GameClock>()
        .init_resource::<FarmGrid>()
        .init_resource::<CropField>()
        .init_resource::<Ledger>()
        .init_resource::<FarmerState>()
        .init_resource::<AutoFarm>()
        .init_resource::<PlayerInput>()
        .init_resource::<ManualTool>()
        .init_resource::<StatusLine>()
        .init_resource::<GameRng>();

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<DayEndEvent>()
        .add_event::<ToolActionEvent>()
        .add_event::<TradeRequestEvent>();

    // ── Logic plugins ────────────────────────────────────────────────────
    app.add_plugins(clock::ClockPlugin)
        .add_plugins(field::FieldPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(autofarm::AutoFarmPlugin)
        .add_plugins(player::PlayerPlugin);

    app
}

/// Transitions the test app to Playing state and ticks once to process it.
fn enter_playing_state(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
}

/// Plants a watered crop on a tilled tile.
fn plant_watered(app: &mut App, row: u32, col: u32) {
    let day = app.world().resource::<GameClock>().day_number;
    let mut grid = app.world_mut().resource_mut::<FarmGrid>();
    grid.till(row, col);
    grid.plant(row, col);
    grid.water(row, col);
    let mut crops = app.world_mut().resource_mut::<CropField>();
    crops.plant((row, col), day);
    crops.water((row, col));
}

#[test]
fn test_headless_boot_smoke() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    for _ in 0..120 {
        app.update();
    }

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(
        state.get(),
        &GameState::Playing,
        "State should remain Playing after smoke ticks"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Day-end chain: crop advance + interest + water reset in the same frame
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_day_end_settles_field_and_ledger_in_one_frame() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    plant_watered(&mut app, 1, 1);
    app.world_mut().resource_mut::<Ledger>().loan_principal = 100;

    // Park the clock just shy of the boundary, then tick across it.
    debug::set_time_ratio(app.world_mut(), 0.999);
    debug::simulate_ticks(&mut app, 1, 0.5);

    let clock = app.world().resource::<GameClock>();
    assert_eq!(clock.day_number, 2, "Half a second should cross the boundary");

    let crops = app.world().resource::<CropField>();
    let crop = crops.get((1, 1)).unwrap();
    assert_eq!(crop.growth_days, 1, "Watered crop advances at the boundary");
    assert_eq!(crop.stage, 2);

    let grid = app.world().resource::<FarmGrid>();
    assert!(
        !grid.tile(1, 1).unwrap().watered_today,
        "Water flags reset for the new day"
    );

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(
        ledger.loan_interest_accrued, 5,
        "5% interest on 100 principal, accrued the same frame"
    );
}

#[test]
fn test_weather_follows_the_day_cycle() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    for (day, expected) in [
        (1, Weather::Sunny),
        (2, Weather::Cloudy),
        (3, Weather::Rainy),
        (4, Weather::Sunny),
    ] {
        debug::set_day(app.world_mut(), day);
        let clock = app.world().resource::<GameClock>();
        assert_eq!(clock.weather(), expected, "Day {} weather", day);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manual shop flow
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_manual_seed_purchases_stop_at_the_coin_floor() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<Ledger>().coins = 105;

    app.world_mut().send_event(TradeRequestEvent {
        request: TradeRequest::BuySeeds(10),
    });
    app.update();

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.seed_count, 10);
    assert_eq!(ledger.coins, 5);

    // 5 coins cannot cover another seed.
    app.world_mut().send_event(TradeRequestEvent {
        request: TradeRequest::BuySeeds(1),
    });
    app.update();

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.seed_count, 10, "Purchase must fail atomically");
    assert_eq!(ledger.coins, 5);
}

#[test]
fn test_manual_expansion_stops_at_the_row_cap() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    {
        let mut grid = app.world_mut().resource_mut::<FarmGrid>();
        grid.expand_rows(GRID_MAX_ROWS - GRID_ROWS);
    }
    app.world_mut().resource_mut::<Ledger>().coins = 10_000;

    app.world_mut().send_event(TradeRequestEvent {
        request: TradeRequest::BuyFarmExpansion,
    });
    app.update();

    let grid = app.world().resource::<FarmGrid>();
    assert_eq!(grid.rows, GRID_MAX_ROWS, "No expansion past the cap");
    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.coins, 10_000, "No charge for a refused expansion");
}

// ─────────────────────────────────────────────────────────────────────────────
// Auto-farm control loop
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_speed_guard_drops_multiplier_on_stressed_farm() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    // Broke: no coins, no seeds, no crops.
    {
        let mut ledger = app.world_mut().resource_mut::<Ledger>();
        ledger.coins = 0;
    }
    debug::set_time_multiplier(app.world_mut(), 32.0);
    debug::set_auto_farm(app.world_mut(), true);

    debug::simulate_ticks(&mut app, 1, 0.1);

    let clock = app.world().resource::<GameClock>();
    assert_eq!(
        clock.multiplier, 1.0,
        "Stressed farm must be forced back to real time"
    );

    let runtime = debug::auto_farm_runtime(app.world());
    assert_eq!(runtime.risk, RiskLevel::Stressed);
    assert_ne!(runtime.last_speed_guard_day, 0, "Guard day recorded");
    assert_eq!(runtime.time_multiplier, 1.0);
}

#[test]
fn test_auto_farm_walks_to_and_harvests_a_mature_crop() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    debug::set_crop_stage(app.world_mut(), 0, 0, 5);
    debug::set_auto_farm(app.world_mut(), true);

    // Corner tile is ~4.2 units from spawn at 4 u/s: under 2 simulated
    // seconds to walk, plus a tick to act and one to sell.
    debug::simulate_ticks(&mut app, 20, 0.1);

    let ledger = app.world().resource::<Ledger>();
    assert_eq!(ledger.total_harvested, 1, "The mature berry was picked");
    assert_eq!(
        ledger.normal_berries + ledger.premium_berries,
        0,
        "The trade sweep sold the harvest"
    );
    assert!(
        ledger.coins > START_COINS,
        "Sale proceeds exceed the seed restock spend"
    );

    let status = debug::auto_farm_status(app.world());
    assert!(status.action_count >= 1);
    assert!(status.trade_count >= 1);
}

#[test]
fn test_auto_farm_restocks_and_plants_an_empty_field() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    // Two tilled empty tiles near the center.
    {
        let mut grid = app.world_mut().resource_mut::<FarmGrid>();
        grid.till(2, 2);
        grid.till(2, 3);
    }
    debug::set_auto_farm(app.world_mut(), true);

    debug::simulate_ticks(&mut app, 60, 0.1);

    let ledger = app.world().resource::<Ledger>();
    assert!(
        ledger.coins < START_COINS,
        "Seeds were bought out of starting coins"
    );

    let crops = app.world().resource::<CropField>();
    assert!(
        crops.get((2, 2)).is_some() && crops.get((2, 3)).is_some(),
        "Both tilled tiles were planted"
    );
}

#[test]
fn test_manual_input_disengages_auto_farm() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    debug::set_auto_farm(app.world_mut(), true);
    app.update();
    assert!(debug::auto_farm_status(app.world()).enabled);

    app.world_mut().resource_mut::<PlayerInput>().move_axis = Vec2::X;
    app.update();
    *app.world_mut().resource_mut::<PlayerInput>() = PlayerInput::default();

    let status = debug::auto_farm_status(app.world());
    assert!(!status.enabled, "Movement input hands control back");
    assert_eq!(status.target, None);
}

#[test]
fn test_auto_loop_keeps_pace_at_high_multiplier() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    debug::set_time_multiplier(app.world_mut(), 64.0);

    // 10 s of real time at 64× is 640 simulated seconds: two full days.
    debug::simulate_ticks(&mut app, 100, 0.1);

    let clock = app.world().resource::<GameClock>();
    assert!(
        clock.day_number >= 3,
        "Expected at least two rolled days, at day {}",
        clock.day_number
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Manual actions through the tool advisor
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_advisor_driven_actions_walk_a_tile_through_its_states() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<Ledger>().seed_count = 1;

    // No forced tool: grass → till, tilled → plant, planted → water.
    debug::perform_action(&mut app, None, 3, 3);
    assert_eq!(
        app.world().resource::<FarmGrid>().tile(3, 3).unwrap().soil,
        Soil::Tilled
    );

    debug::perform_action(&mut app, None, 3, 3);
    assert!(app.world().resource::<CropField>().get((3, 3)).is_some());
    assert_eq!(app.world().resource::<Ledger>().seed_count, 0);

    debug::perform_action(&mut app, None, 3, 3);
    assert!(
        app.world()
            .resource::<FarmGrid>()
            .tile(3, 3)
            .unwrap()
            .watered_today
    );
}

#[test]
fn test_forced_shovel_clears_a_withered_crop() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    debug::set_crop_stage(app.world_mut(), 4, 4, 3);
    debug::set_crop_withered(app.world_mut(), 4, 4);

    debug::force_tool(app.world_mut(), Some(Tool::Shovel));
    debug::perform_action(&mut app, Some(Tool::Shovel), 4, 4);

    assert!(app.world().resource::<CropField>().get((4, 4)).is_none());
    let tile = *app.world().resource::<FarmGrid>().tile(4, 4).unwrap();
    assert!(!tile.has_crop);
    assert_eq!(tile.soil, Soil::Tilled, "Clearing keeps the soil tilled");
}

// ─────────────────────────────────────────────────────────────────────────────
// Pause
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_pause_freezes_the_clock() {
    let mut app = build_test_app();
    enter_playing_state(&mut app);

    app.world_mut().resource_mut::<PlayerInput>().pause = true;
    app.update();
    *app.world_mut().resource_mut::<PlayerInput>() = PlayerInput::default();
    app.update();

    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Paused
    );

    let elapsed_before = app.world().resource::<GameClock>().elapsed_in_day;
    debug::simulate_ticks(&mut app, 20, 0.1);
    let elapsed_after = app.world().resource::<GameClock>().elapsed_in_day;
    assert_eq!(
        elapsed_before, elapsed_after,
        "Clock must not advance while paused"
    );

    app.world_mut().resource_mut::<PlayerInput>().pause = true;
    app.update();
    *app.world_mut().resource_mut::<PlayerInput>() = PlayerInput::default();
    app.update();
    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Playing
    );
}
