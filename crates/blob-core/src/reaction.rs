//! Reaction state machine.
//!
//! Serializes preset transitions from two independent sources — explicit
//! reactions (chat turns, manual controls) and asynchronous speech start/stop
//! — into one consistent state. All scheduling is deadline-based against a
//! caller-supplied clock: the event loop calls [`ReactionMachine::tick`] each
//! frame, and cancelling scheduled work simply clears its deadline, so a
//! cancelled timer can never fire.

use thiserror::Error;

use crate::constants::{
    IDLE_PRESET, INTENSITY_NEUTRAL, LISTENING_PRESET, SPEAKING_PRESET,
    SPEAKING_REASSERT_INTERVAL_SEC,
};
use crate::presets::{AnimationPattern, PresetTable, VisualConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionError {
    /// The requested preset id is absent from the table. State is unchanged.
    #[error("unknown preset id: {0}")]
    UnknownPreset(String),
}

/// One transition request, typically derived from the chat classifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReactionRequest {
    pub preset_id: String,
    pub emotion: Option<String>,
    /// Scales the preset's displacement strength around the 0.5 midpoint.
    pub intensity: Option<f32>,
    /// Auto-reversion delay; ignored for the `speaking` and `idle` targets.
    pub duration_ms: Option<u32>,
    /// Replaces the preset's primary color.
    pub color: Option<[f32; 3]>,
}

impl ReactionRequest {
    pub fn preset(id: &str) -> Self {
        Self {
            preset_id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn with_emotion(mut self, emotion: &str) -> Self {
        self.emotion = Some(emotion.to_string());
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_duration_ms(mut self, ms: u32) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = Some(color);
        self
    }
}

/// Read-only published view of the machine. `revision` increases on every
/// transition so subscribers can cheaply detect change.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    pub preset_id: &'static str,
    pub emotion: Option<String>,
    pub visual: VisualConfig,
    pub animation: AnimationPattern,
    pub speech_active: bool,
    pub revision: u64,
}

#[derive(Debug)]
pub struct ReactionMachine {
    table: PresetTable,
    active_preset: &'static str,
    active_emotion: Option<String>,
    visual: VisualConfig,
    animation: AnimationPattern,
    speech_active: bool,
    /// At most one pending reversion deadline (seconds). Creating a new one
    /// always replaces any prior one.
    pending_reversion: Option<f64>,
    /// Next speaking re-assert deadline while speech is active.
    next_reassert: Option<f64>,
    revision: u64,
}

impl ReactionMachine {
    /// The table must contain an `idle` preset — it is the initial state and
    /// the reversion target.
    pub fn new(table: PresetTable) -> Result<Self, ReactionError> {
        let idle = table
            .get(IDLE_PRESET)
            .ok_or_else(|| ReactionError::UnknownPreset(IDLE_PRESET.to_string()))?
            .clone();
        Ok(Self {
            table,
            active_preset: idle.id,
            active_emotion: None,
            visual: idle.visual,
            animation: idle.animation,
            speech_active: false,
            pending_reversion: None,
            next_reassert: None,
            revision: 0,
        })
    }

    pub fn presets(&self) -> &PresetTable {
        &self.table
    }

    pub fn active_preset(&self) -> &'static str {
        self.active_preset
    }

    pub fn active_emotion(&self) -> Option<&str> {
        self.active_emotion.as_deref()
    }

    pub fn speech_active(&self) -> bool {
        self.speech_active
    }

    pub fn has_pending_reversion(&self) -> bool {
        self.pending_reversion.is_some()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            preset_id: self.active_preset,
            emotion: self.active_emotion.clone(),
            visual: self.visual.clone(),
            animation: self.animation,
            speech_active: self.speech_active,
            revision: self.revision,
        }
    }

    /// Apply a reaction. Fails on an unknown preset id with state untouched;
    /// otherwise cancels any pending reversion before applying.
    pub fn trigger(&mut self, req: &ReactionRequest, now: f64) -> Result<(), ReactionError> {
        let preset = self
            .table
            .get(&req.preset_id)
            .ok_or_else(|| ReactionError::UnknownPreset(req.preset_id.clone()))?
            .clone();

        self.pending_reversion = None;

        if preset.id == IDLE_PRESET && self.speech_active {
            // An active speech session outranks any request to go idle; the
            // caller is expected to retry after reporting speech stop.
            log::debug!("idle requested during speech, asserting speaking instead");
            self.assert_speaking();
            return Ok(());
        }

        let mut visual = preset.visual.clone();
        if let Some(intensity) = req.intensity {
            let intensity = intensity.clamp(0.0, 1.0);
            visual.strength = (visual.strength * (INTENSITY_NEUTRAL + intensity)).clamp(0.0, 1.0);
        }
        if let Some(color) = req.color {
            visual.color1 = color;
        }

        self.active_preset = preset.id;
        self.active_emotion = req.emotion.clone();
        self.visual = visual;
        self.animation = preset.animation;
        self.bump();
        log::info!(
            "reaction: preset={} emotion={:?} duration_ms={:?}",
            preset.id,
            req.emotion,
            req.duration_ms
        );

        // Speaking and idle are left by their callers, never by a timer.
        if let Some(ms) = req.duration_ms {
            if preset.id != SPEAKING_PRESET && preset.id != IDLE_PRESET {
                self.pending_reversion = Some(now + ms as f64 / 1000.0);
            }
        }
        Ok(())
    }

    /// The speech collaborator started playing audio.
    pub fn report_speech_start(&mut self, now: f64) {
        self.speech_active = true;
        self.bump();
        if self.active_preset == IDLE_PRESET || self.active_preset == LISTENING_PRESET {
            self.assert_speaking();
        }
        self.next_reassert = Some(now + SPEAKING_REASSERT_INTERVAL_SEC);
        log::info!("speech start (preset={})", self.active_preset);
    }

    /// The speech collaborator finished (or was cancelled). Cancels all
    /// scheduled work; does not itself transition to idle.
    pub fn report_speech_stop(&mut self) {
        self.speech_active = false;
        self.next_reassert = None;
        self.pending_reversion = None;
        self.bump();
        log::info!("speech stop (preset={})", self.active_preset);
    }

    /// Advance deadline-based work. Called once per frame by the event loop.
    pub fn tick(&mut self, now: f64) {
        if let Some(deadline) = self.pending_reversion {
            if now >= deadline {
                self.pending_reversion = None;
                if self.speech_active {
                    // A live speech session always wins over a stale timer.
                    self.assert_speaking();
                } else {
                    self.revert_to_idle();
                }
            }
        }
        if self.speech_active {
            if let Some(due) = self.next_reassert {
                if now >= due {
                    if self.active_preset == IDLE_PRESET
                        || self.active_preset == LISTENING_PRESET
                    {
                        self.assert_speaking();
                    }
                    self.next_reassert = Some(now + SPEAKING_REASSERT_INTERVAL_SEC);
                }
            }
        }
    }

    fn assert_speaking(&mut self) {
        if let Some(p) = self.table.get(SPEAKING_PRESET) {
            let p = p.clone();
            self.active_preset = p.id;
            self.visual = p.visual;
            self.animation = p.animation;
            self.bump();
        }
    }

    fn revert_to_idle(&mut self) {
        if let Some(p) = self.table.get(IDLE_PRESET) {
            let p = p.clone();
            self.active_preset = p.id;
            self.active_emotion = None;
            self.visual = p.visual;
            self.animation = p.animation;
            self.bump();
            log::info!("reaction timer elapsed, reverting to idle");
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
