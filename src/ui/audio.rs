use bevy::prelude::*;
use crate::shared::*;

/// Maps sound cues sent by other domains to audio file paths.
pub fn sfx_path(sound: SoundKind) -> &'static str {
    match sound {
        SoundKind::Plant => "audio/plant.ogg",
        SoundKind::HarvestPlant => "audio/harvest_plant.ogg",
        SoundKind::TillSoil => "audio/till_soil.ogg",
    }
}

/// Listen for PlaySfxEvent and spawn one-shot audio sources that auto-despawn.
pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
) {
    for event in events.read() {
        commands.spawn((
            AudioPlayer::new(asset_server.load(sfx_path(event.sound))),
            PlaybackSettings::DESPAWN,
        ));
    }
}
