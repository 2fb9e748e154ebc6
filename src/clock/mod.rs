//! Clock domain — the heartbeat of Berryfield.
//!
//! Responsible for:
//! - Accumulating simulated time (real Δt × multiplier)
//! - Rolling day boundaries and sending one DayEndEvent per crossed day
//! - Cycling the time-acceleration multiplier (T key)
//! - Configuring the cross-domain tick/day-end ordering sets
//!
//! Weather needs no rolling here: it is a pure function of the day number
//! (see `Weather::for_day`), so saves and tests stay deterministic.

use bevy::prelude::*;

use crate::shared::*;

pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app
            // Frame ordering shared by every domain: clock → day-end work →
            // agent decisions → tile/trade handlers.
            .configure_sets(
                Update,
                (TickSet::Clock, TickSet::Control, TickSet::Apply).chain(),
            )
            .configure_sets(
                Update,
                (
                    DayEndWork::Field,
                    DayEndWork::Ledger,
                    DayEndWork::Strategy,
                    DayEndWork::Persist,
                )
                    .chain()
                    .after(TickSet::Clock)
                    .before(TickSet::Control),
            )
            .add_systems(
                Update,
                (tick_clock, cycle_speed_hotkey)
                    .in_set(TickSet::Clock)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Advances simulated time and emits one DayEndEvent per crossed boundary.
/// A single large Δt (high multiplier or a long frame) can roll several
/// days; every one of them gets its own event so no interest accrual or
/// crop advance is skipped.
fn tick_clock(
    time: Res<Time>,
    mut clock: ResMut<GameClock>,
    mut day_end_writer: EventWriter<DayEndEvent>,
) {
    let scaled = time.delta_secs() * clock.multiplier;
    let rolled = clock.tick(scaled);
    if rolled == 0 {
        return;
    }

    for i in (0..rolled).rev() {
        let day = clock.day_number - i;
        info!(
            "[Clock] Day {} begins — {:?}, {}",
            day,
            Weather::for_day(day),
            clock.clock_label()
        );
        day_end_writer.send(DayEndEvent { day });
    }
}

/// T doubles the multiplier; past the cap it wraps back to 1×.
fn cycle_speed_hotkey(
    input: Res<PlayerInput>,
    mut clock: ResMut<GameClock>,
    mut status: ResMut<StatusLine>,
) {
    if !input.cycle_speed {
        return;
    }
    clock.multiplier *= 2.0;
    if clock.multiplier > MAX_TIME_MULTIPLIER {
        clock.multiplier = 1.0;
    }
    status.0 = format!("Time speed {}x", clock.multiplier);
    info!("[Clock] Multiplier set to {}x", clock.multiplier);
}
