//! Per-frame vertex displacement.
//!
//! Everything here is a pure function of `(pattern, config, elapsed time,
//! audio sample)` — no hidden state, restartable at any `t`, safe to evaluate
//! for every vertex independently.

use glam::Vec3;

use crate::constants::{
    AUDIO_INTENSITY_WEIGHT, AUDIO_NOISE_FREQUENCY, AUDIO_NOISE_TIME_RATE, AUDIO_NOISE_WEIGHT,
    AUDIO_SPEED_WEIGHT, AUDIO_VARIATION_WEIGHT, COMPLEXITY_NOISE_SCALE, NOISE_BASE_FREQUENCY,
    NOISE_TIME_SCALE, STRENGTH_DISPLAY_SCALE, VISIBILITY_MULTIPLIER,
};
use crate::mesh::BlobMesh;
use crate::presets::{AnimationPattern, PatternKind, VisualConfig};

/// One amplitude reading from the speech audio, both channels in [0, 1].
/// Absence means "no audio-reactive contribution this frame".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioSample {
    pub amplitude: f32,
    pub bass: f32,
}

/// Audio multipliers derived once per frame, not per vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioLevels {
    pub speed_mul: f32,
    pub intensity_mul: f32,
    pub variation_mul: f32,
    /// Raw amplitude, present only while speech is active.
    pub amplitude: Option<f32>,
}

impl AudioLevels {
    pub fn inactive() -> Self {
        Self {
            speed_mul: 1.0,
            intensity_mul: 1.0,
            variation_mul: 1.0,
            amplitude: None,
        }
    }

    pub fn derive(sample: Option<AudioSample>, speech_active: bool) -> Self {
        match sample {
            Some(s) if speech_active => Self {
                speed_mul: 1.0 + s.amplitude * AUDIO_SPEED_WEIGHT,
                intensity_mul: 1.0 + s.amplitude * AUDIO_INTENSITY_WEIGHT,
                variation_mul: 1.0 + s.bass * AUDIO_VARIATION_WEIGHT,
                amplitude: Some(s.amplitude),
            },
            _ => Self::inactive(),
        }
    }
}

/// The deterministic closed-form time signal driving a preset's motion.
/// Bounded: |p(t)| stays within roughly [-2, 2] for every kind.
pub fn pattern_signal(kind: PatternKind, t: f32) -> f32 {
    match kind {
        PatternKind::Pulsing => {
            // irregular pulsing with dramatic pauses
            let pulse = (t * 1.4).sin() * 0.7 + (t * 0.6).sin() * 0.4 + (t * 2.3).sin() * 0.2;
            pulse * (1.0 + (t * 0.3).sin() * 0.3)
        }
        PatternKind::Energetic => {
            (t * 2.8).sin() * 0.6
                + (t * 2.1).cos() * 0.4
                + (t * 3.7).sin() * 0.3
                + (t * 1.6).cos() * 0.2
        }
        PatternKind::Subtle => {
            // attentive micro-movements with concentration peaks
            let base = (t * 0.8).sin() * 0.6 + (t * 0.5).cos() * 0.3;
            base * (1.0 + (t * 0.2).sin() * 0.2)
        }
        PatternKind::Chaotic => {
            // multi-frequency chaos with sudden bursts
            let chaos = (t * 3.2).sin() * 0.5
                + (t * 4.1).cos() * 0.4
                + (t * 5.3).sin() * 0.3
                + (t * 2.7).cos() * 0.2;
            chaos * (1.0 + ((t * 0.9).sin() * 0.4).abs())
        }
        PatternKind::Gentle => (t).sin() * 0.8 + (t * 0.6).sin() * 0.3 + (t * 0.4).cos() * 0.1,
    }
}

/// Tri-sine pseudo-noise over scaled coordinates and time.
#[inline]
fn noise(x: f32, y: f32, z: f32, time: f32) -> f32 {
    (x * 2.0 + time).sin() * (y * 2.0 + time).cos() * (z * 2.0 + time).sin()
}

/// Everything the per-vertex displacement needs, computed once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameDisplacement {
    time: f32,
    base_term: f32,
    noise_freq: f32,
    noise_time: f32,
    noise_scale: f32,
    audio_noise_freq: f32,
    audio_noise_time: f32,
    audio_noise_scale: Option<f32>,
}

impl FrameDisplacement {
    pub fn new(
        pattern: &AnimationPattern,
        config: &VisualConfig,
        elapsed_sec: f64,
        sample: Option<AudioSample>,
        speech_active: bool,
    ) -> Self {
        let audio = AudioLevels::derive(sample, speech_active);
        let effective_speed = config.speed * pattern.float_speed * audio.speed_mul;
        let effective_complexity = config.complexity * COMPLEXITY_NOISE_SCALE;
        let effective_strength = config.strength * STRENGTH_DISPLAY_SCALE;
        let time = elapsed_sec as f32 * effective_speed;
        Self {
            time,
            base_term: pattern_signal(pattern.kind, time)
                * pattern.breathing_intensity
                * effective_strength
                * audio.intensity_mul,
            noise_freq: NOISE_BASE_FREQUENCY * effective_complexity,
            noise_time: time * pattern.breathing_speed * NOISE_TIME_SCALE,
            noise_scale: pattern.scale_variation * effective_strength * audio.variation_mul,
            audio_noise_freq: AUDIO_NOISE_FREQUENCY * effective_complexity,
            audio_noise_time: time * AUDIO_NOISE_TIME_RATE,
            audio_noise_scale: audio
                .amplitude
                .map(|a| a * AUDIO_NOISE_WEIGHT * effective_strength),
        }
    }

    /// The scaled time value this frame animates at.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Radially scale one vertex from its undisplaced position.
    pub fn displace(&self, base: Vec3) -> Vec3 {
        let organic = noise(
            base.x * self.noise_freq,
            base.y * self.noise_freq,
            base.z * self.noise_freq,
            self.noise_time,
        ) * self.noise_scale;
        let audio = match self.audio_noise_scale {
            Some(scale) => {
                noise(
                    base.x * self.audio_noise_freq,
                    base.y * self.audio_noise_freq,
                    base.z * self.audio_noise_freq,
                    self.audio_noise_time,
                ) * scale
            }
            None => 0.0,
        };
        let total = (self.base_term + organic + audio) * VISIBILITY_MULTIPLIER;
        base * (1.0 + total)
    }
}

/// Displace every vertex from the mesh's base shape, then rebuild normals.
pub fn displace_mesh(mesh: &mut BlobMesh, frame: &FrameDisplacement) {
    for i in 0..mesh.vertex_count() {
        let displaced = frame.displace(mesh.base_positions()[i]);
        mesh.set_position(i, displaced);
    }
    mesh.recompute_normals();
}
