use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use crate::shared::*;

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// Pick the held item with 1-9 or the mouse wheel. A change of item shows
/// its name below the player.
pub fn cycle_held_item(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut wheel: EventReader<MouseWheel>,
    mut inventory: ResMut<Inventory>,
    players: Query<&LogicalPosition, With<Player>>,
    mut hint_events: EventWriter<HintEvent>,
) {
    let before = inventory.held_item();

    for (slot, key) in DIGIT_KEYS.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            inventory.select_slot(slot);
        }
    }

    let scroll: f32 = wheel.read().map(|event| event.y).sum();
    if scroll != 0.0 {
        // Wheel down moves to the next slot.
        inventory.cycle_selection(if scroll < 0.0 { 1 } else { -1 });
    }

    inventory.clamp_selection();

    let after = inventory.held_item();
    if after != before {
        if let (Some(item), Ok(player)) = (after, players.get_single()) {
            hint_events.send(HintEvent {
                text: item.name().to_string(),
                position: player.0 + Vec2::new(0.0, SCREEN_HEIGHT / 2.0 - 150.0),
                color: Color::WHITE,
            });
        }
    }
}
