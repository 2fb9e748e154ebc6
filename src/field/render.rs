//! Placeholder presentation: colored rectangles for tiles, crops, and the
//! farmer. Deliberately minimal — everything here reads shared state and
//! draws, never the other way around.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

/// Tracks the sprite entity for each tile/crop so expansion and despawn
/// stay cheap lookups.
#[derive(Resource, Default)]
pub struct FieldEntities {
    pub tile_sprites: HashMap<TileKey, Entity>,
    pub crop_sprites: HashMap<TileKey, Entity>,
}

#[derive(Component)]
pub struct FarmerSprite;

/// Maps a ground-plane position to screen space. The z axis of the plane
/// points "down" the field, so it becomes negative screen y.
fn plane_to_screen(world: Vec2, layer: f32) -> Vec3 {
    Vec3::new(world.x * WORLD_TO_SCREEN, -world.y * WORLD_TO_SCREEN, layer)
}

fn soil_color(tile: &Tile) -> Color {
    match (tile.soil, tile.watered_today) {
        (Soil::Grass, _) => Color::srgb(0.35, 0.62, 0.28),
        (Soil::Tilled, false) => Color::srgb(0.48, 0.33, 0.20),
        (Soil::Tilled, true) => Color::srgb(0.33, 0.23, 0.15),
    }
}

fn crop_color(crop: &Crop) -> Color {
    if crop.withered {
        return Color::srgb(0.45, 0.42, 0.30);
    }
    match crop.stage {
        1 => Color::srgb(0.55, 0.78, 0.45),
        2 => Color::srgb(0.42, 0.72, 0.35),
        3 => Color::srgb(0.30, 0.65, 0.28),
        4 => Color::srgb(0.75, 0.45, 0.40),
        _ => Color::srgb(0.86, 0.18, 0.25),
    }
}

pub fn spawn_farmer_sprite(mut commands: Commands, farmer: Res<FarmerState>) {
    commands.spawn((
        FarmerSprite,
        Sprite {
            color: Color::srgb(0.95, 0.85, 0.55),
            custom_size: Some(Vec2::splat(0.5 * WORLD_TO_SCREEN)),
            ..default()
        },
        Transform::from_translation(plane_to_screen(farmer.plane_pos(), 10.0)),
    ));
}

pub fn sync_farmer_sprite(
    farmer: Res<FarmerState>,
    mut query: Query<&mut Transform, With<FarmerSprite>>,
) {
    for mut transform in query.iter_mut() {
        transform.translation = plane_to_screen(farmer.plane_pos(), 10.0);
    }
}

/// Spawns sprites for new tiles (initial build and row expansion), keeps
/// colors in sync with soil/crop state, and despawns crop sprites whose
/// crop is gone.
pub fn sync_tile_sprites(
    mut commands: Commands,
    grid: Res<FarmGrid>,
    crops: Res<CropField>,
    mut entities: ResMut<FieldEntities>,
    mut sprites: Query<&mut Sprite>,
) {
    let tile_px = grid.tile_size * WORLD_TO_SCREEN;

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let Some(tile) = grid.tile(row, col) else {
                continue;
            };
            let key = (row, col);
            let screen = plane_to_screen(grid.tile_to_world(row, col), 0.0);

            match entities.tile_sprites.get(&key) {
                Some(&entity) => {
                    if let Ok(mut sprite) = sprites.get_mut(entity) {
                        sprite.color = soil_color(tile);
                    }
                }
                None => {
                    let entity = commands
                        .spawn((
                            Sprite {
                                color: soil_color(tile),
                                custom_size: Some(Vec2::splat(tile_px * 0.94)),
                                ..default()
                            },
                            Transform::from_translation(screen),
                        ))
                        .id();
                    entities.tile_sprites.insert(key, entity);
                }
            }

            match (crops.get(key), entities.crop_sprites.get(&key)) {
                (Some(crop), Some(&entity)) => {
                    if let Ok(mut sprite) = sprites.get_mut(entity) {
                        sprite.color = crop_color(crop);
                        let growth = 0.25 + 0.1 * crop.stage as f32;
                        sprite.custom_size = Some(Vec2::splat(tile_px * growth));
                    }
                }
                (Some(crop), None) => {
                    let entity = commands
                        .spawn((
                            Sprite {
                                color: crop_color(crop),
                                custom_size: Some(Vec2::splat(
                                    tile_px * (0.25 + 0.1 * crop.stage as f32),
                                )),
                                ..default()
                            },
                            Transform::from_translation(screen + Vec3::Z * 5.0),
                        ))
                        .id();
                    entities.crop_sprites.insert(key, entity);
                }
                (None, Some(&entity)) => {
                    commands.entity(entity).despawn();
                    entities.crop_sprites.remove(&key);
                }
                (None, None) => {}
            }
        }
    }
}
