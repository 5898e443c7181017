// Shared tuning constants used by the animator, the reaction machine and both
// front-ends.

// Per-frame audio-reactive multiplier weights. Derived once per frame from the
// latest sample, never per vertex.
pub const AUDIO_SPEED_WEIGHT: f32 = 0.15;
pub const AUDIO_INTENSITY_WEIGHT: f32 = 0.2;
pub const AUDIO_VARIATION_WEIGHT: f32 = 0.1;

// Weight of the speech-only secondary noise term.
pub const AUDIO_NOISE_WEIGHT: f32 = 0.015;

// Displacement shaping
pub const VISIBILITY_MULTIPLIER: f32 = 1.2; // lifts the summed displacement into a visible range
pub const COMPLEXITY_NOISE_SCALE: f32 = 0.5; // config complexity -> noise frequency domain
pub const STRENGTH_DISPLAY_SCALE: f32 = 2.0; // config strength -> visible amplitude
pub const NOISE_BASE_FREQUENCY: f32 = 2.0;
pub const NOISE_TIME_SCALE: f32 = 0.8; // breathing speed -> noise time domain
pub const AUDIO_NOISE_FREQUENCY: f32 = 4.0; // 2x the base noise frequency
pub const AUDIO_NOISE_TIME_RATE: f32 = 2.5;

// Reaction machine scheduling (seconds)
pub const SPEAKING_REASSERT_INTERVAL_SEC: f64 = 0.5;

// Preset ids with scheduling significance
pub const IDLE_PRESET: &str = "idle";
pub const SPEAKING_PRESET: &str = "speaking";
pub const LISTENING_PRESET: &str = "listening";

// A classifier intensity of 0.5 leaves the preset's strength untouched;
// 0.0 halves it, 1.0 scales it by 1.5.
pub const INTENSITY_NEUTRAL: f32 = 0.5;

// Mesh/scene defaults shared by both front-ends
pub const BLOB_RADIUS: f32 = 1.0;
pub const BLOB_WIDTH_SEGMENTS: u32 = 128;
pub const BLOB_HEIGHT_SEGMENTS: u32 = 96;
pub const BLOB_BASE_SCALE: f32 = 0.14; // world-space blob size at rest
pub const BLOB_AUDIO_SCALE_GAIN: f32 = 0.1; // whole-mesh swell per unit amplitude
pub const BLOB_SPIN_RATE: f32 = 0.15; // radians per second of idle rotation
pub const CAMERA_Z: f32 = 2.0;
pub const CAMERA_FOV_DEG: f32 = 40.0;

// Reaction durations used by the chat turn choreography (milliseconds)
pub const LISTENING_REACTION_MS: u32 = 1000;
pub const THINKING_REACTION_MS: u32 = 2000;
