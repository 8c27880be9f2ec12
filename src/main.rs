use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use twenty_two_seconds::shared::*;
use twenty_two_seconds::{config, farming, player, ui, world};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: GAME_NAME.into(),
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
        .init_resource::<Inventory>()
        // Events
        .add_event::<PlaySfxEvent>()
        .add_event::<HintEvent>()
        .add_event::<CrazedModeEvent>()
        // Config first: the world builder reads it
        .add_plugins(config::ConfigPlugin)
        // Domain plugins
        .add_plugins(world::WorldPlugin)
        .add_plugins(farming::FarmingPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(ui::UiPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
