mod shared;
mod input;
mod clock;
mod field;
mod economy;
mod autofarm;
mod player;
mod ui;
mod save;
mod debug;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Berryfield".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<GameClock>()
        .init_resource::<FarmGrid>()
        .init_resource::<CropField>()
        .init_resource::<Ledger>()
        .init_resource::<FarmerState>()
        .init_resource::<AutoFarm>()
        .init_resource::<PlayerInput>()
        .init_resource::<ManualTool>()
        .init_resource::<StatusLine>()
        .init_resource::<GameRng>()
        // Events
        .add_event::<DayEndEvent>()
        .add_event::<ToolActionEvent>()
        .add_event::<TradeRequestEvent>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(clock::ClockPlugin)
        .add_plugins(field::FieldPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(autofarm::AutoFarmPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(ui::UiPlugin)
        .add_plugins(save::SavePlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
