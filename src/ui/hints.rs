use bevy::prelude::*;
use crate::shared::*;

const HINT_LIFETIME_SECS: f32 = 1.5;
/// The last stretch of a hint's life is spent fading out.
const HINT_FADE_SECS: f32 = 0.25;
/// Upward drift in pixels per second.
const HINT_RISE_SPEED: f32 = 30.0;

#[derive(Component, Debug)]
pub struct FloatingHint {
    pub lifetime: Timer,
}

/// Alpha for a hint that has `remaining` seconds left.
pub fn hint_alpha(remaining: f32) -> f32 {
    (remaining / HINT_FADE_SECS).clamp(0.0, 1.0)
}

pub fn spawn_hints(mut commands: Commands, mut events: EventReader<HintEvent>) {
    for event in events.read() {
        commands.spawn((
            FloatingHint {
                lifetime: Timer::from_seconds(HINT_LIFETIME_SECS, TimerMode::Once),
            },
            Text2d::new(event.text.clone()),
            TextFont {
                font_size: 24.0,
                ..default()
            },
            TextColor(event.color),
            // Above the player and crops.
            Transform::from_translation(world_to_translation(event.position, 50.0)),
        ));
    }
}

pub fn update_hints(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut FloatingHint, &mut TextColor)>,
) {
    for (entity, mut transform, mut hint, mut color) in query.iter_mut() {
        hint.lifetime.tick(time.delta());
        transform.translation.y += HINT_RISE_SPEED * time.delta_secs();
        color.0 = color.0.with_alpha(hint_alpha(hint.lifetime.remaining_secs()));

        if hint.lifetime.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}
