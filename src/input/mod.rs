//! Input domain — the single point where hardware input becomes game
//! intent. Everything downstream reads `PlayerInput`, never the keyboard.

use bevy::prelude::*;

use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, reset_and_read_input);
    }
}

const TOOL_HOTKEYS: [(KeyCode, Tool); 5] = [
    (KeyCode::Digit1, Tool::Hoe),
    (KeyCode::Digit2, Tool::SeedBag),
    (KeyCode::Digit3, Tool::WateringCan),
    (KeyCode::Digit4, Tool::Hand),
    (KeyCode::Digit5, Tool::Shovel),
];

/// Rebuilds `PlayerInput` from scratch each frame.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    let mut axis = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
        axis.x += 1.0;
    }
    input.move_axis = if axis != Vec2::ZERO {
        axis.normalize()
    } else {
        Vec2::ZERO
    };

    input.action =
        keys.just_pressed(KeyCode::Space) || keys.just_pressed(KeyCode::Enter);

    if mouse.just_pressed(MouseButton::Left) {
        input.pointer_world = pointer_to_plane(&windows, &cameras);
    }

    for (key, tool) in TOOL_HOTKEYS {
        if keys.just_pressed(key) {
            input.select_tool = Some(tool);
            break;
        }
    }

    input.toggle_auto = keys.just_pressed(KeyCode::KeyP);
    input.cycle_speed = keys.just_pressed(KeyCode::KeyT);
    input.pause = keys.just_pressed(KeyCode::Escape);

    input.buy_seed = keys.just_pressed(KeyCode::KeyB);
    input.sell_berries = keys.just_pressed(KeyCode::KeyV);
    input.buy_can_upgrade = keys.just_pressed(KeyCode::KeyU);
    input.buy_expansion = keys.just_pressed(KeyCode::KeyE);
}

/// Projects the cursor through the 2D camera onto the ground plane.
/// Returns None when there is no window or camera (headless runs).
fn pointer_to_plane(
    windows: &Query<&Window>,
    cameras: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let window = windows.iter().next()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_transform) = cameras.iter().next()?;
    let screen = camera.viewport_to_world_2d(camera_transform, cursor).ok()?;
    // Screen y grows up, plane z grows down the field.
    Some(Vec2::new(
        screen.x / WORLD_TO_SCREEN,
        -screen.y / WORLD_TO_SCREEN,
    ))
}
