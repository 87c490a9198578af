//! Audio seam
//!
//! The simulation only queues sound cues; a platform backend plays them.
//! Cues are fire-and-forget: nothing in the game waits on playback.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player volley fired
    Shoot,
    /// Regular enemy fired
    EnemyShoot,
    /// Boss pattern fired
    BossShoot,
    /// Any bullet or contact hit
    Hit,
    /// Boss took a bullet
    BossHit,
    /// Enemy destroyed
    Explosion,
    /// Boss entered a new phase
    BossPhase,
    /// Boss arrived
    BossIntro,
    /// Boss destroyed
    BossDeath,
    /// Pickup collected
    Pickup,
    /// Timed buff started
    PowerUp,
    /// Reload started
    Reload,
    /// Wave cleared / survival finished
    WaveComplete,
    /// Run over
    GameOver,
}

impl SoundEffect {
    /// Name the platform backend keys its sounds by
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::EnemyShoot => "enemy_shoot",
            SoundEffect::BossShoot => "boss_shoot",
            SoundEffect::Hit => "hit",
            SoundEffect::BossHit => "boss_hit",
            SoundEffect::Explosion => "explosion",
            SoundEffect::BossPhase => "boss_phase",
            SoundEffect::BossIntro => "boss_intro",
            SoundEffect::BossDeath => "boss_death",
            SoundEffect::Pickup => "pickup",
            SoundEffect::PowerUp => "powerup",
            SoundEffect::Reload => "reload",
            SoundEffect::WaveComplete => "wave_complete",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// One queued playback request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub effect: SoundEffect,
    /// Relative loudness requested by the game (1.0 = normal)
    pub volume: f32,
}

impl SoundCue {
    pub fn new(effect: SoundEffect, volume: f32) -> Self {
        Self { effect, volume }
    }
}

/// Platform playback backend
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Writes cues to the log; used by the headless runner
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::trace!("sound {} @ {:.2}", effect.name(), volume);
    }
}

impl AudioSink for Vec<SoundCue> {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.push(SoundCue::new(effect, volume));
    }
}

/// Applies the mixer settings and forwards cues to a sink
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Mixer levels taken from `settings`
    pub fn from_settings(sink: S, settings: &Settings) -> Self {
        let mut manager = Self::new(sink);
        manager.set_master_volume(settings.master_volume);
        manager.set_sfx_volume(settings.sfx_volume);
        manager.set_muted(settings.muted);
        manager
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume() * cue.volume;
        if vol <= 0.0 {
            return;
        }
        self.sink.play(cue.effect, vol);
    }

    /// Play every cue in order
    pub fn play_all(&mut self, cues: impl IntoIterator<Item = SoundCue>) {
        for cue in cues {
            self.play(cue);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_mixing() {
        let mut audio = AudioManager::new(Vec::new());
        audio.set_master_volume(0.5);
        audio.play(SoundCue::new(SoundEffect::BossShoot, 1.8));
        let played = audio.sink();
        assert_eq!(played.len(), 1);
        assert!((played[0].volume - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_muted_drops_cues() {
        let mut audio = AudioManager::new(Vec::new());
        audio.set_muted(true);
        audio.play_all([
            SoundCue::new(SoundEffect::Shoot, 1.0),
            SoundCue::new(SoundEffect::Hit, 0.8),
        ]);
        assert!(audio.sink().is_empty());
    }

    #[test]
    fn test_volume_clamped() {
        let mut audio = AudioManager::new(Vec::new());
        audio.set_master_volume(3.0);
        audio.set_sfx_volume(-1.0);
        audio.play(SoundCue::new(SoundEffect::Pickup, 1.0));
        assert!(audio.sink().is_empty());
    }

    #[test]
    fn test_names() {
        assert_eq!(SoundEffect::PowerUp.name(), "powerup");
        assert_eq!(SoundEffect::BossDeath.name(), "boss_death");
    }
}
