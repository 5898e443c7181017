//! The fixed catalogue of emotional states the blob can take.
//!
//! Presets are defined once at startup and never mutated; everything else in
//! the crate looks them up by id. Unknown ids are reported to the caller and
//! never silently substituted.

use fnv::FnvHashMap;

/// Motion family driving a preset's characteristic pattern signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Gentle,
    Pulsing,
    Energetic,
    Subtle,
    Chaotic,
}

impl PatternKind {
    /// Resolve a pattern name, falling back to `Gentle` for anything unknown.
    pub fn from_name(name: &str) -> Self {
        match name {
            "pulsing" => PatternKind::Pulsing,
            "energetic" => PatternKind::Energetic,
            "subtle" => PatternKind::Subtle,
            "chaotic" => PatternKind::Chaotic,
            _ => PatternKind::Gentle,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Gentle => "gentle",
            PatternKind::Pulsing => "pulsing",
            PatternKind::Energetic => "energetic",
            PatternKind::Subtle => "subtle",
            PatternKind::Chaotic => "chaotic",
        }
    }
}

/// Surface/material configuration published to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualConfig {
    /// Shape irregularity; drives the noise frequency.
    pub complexity: f32,
    /// Animation time-scale.
    pub speed: f32,
    /// Displacement amplitude in [0, 1].
    pub strength: f32,
    pub color1: [f32; 3],
    pub color2: [f32; 3],
    pub color3: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub env_map_intensity: f32,
}

/// Per-preset animation descriptor consumed by the displacement engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationPattern {
    pub kind: PatternKind,
    pub breathing_intensity: f32,
    pub breathing_speed: f32,
    pub scale_variation: f32,
    pub float_speed: f32,
}

#[derive(Clone, Debug)]
pub struct Preset {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub visual: VisualConfig,
    pub animation: AnimationPattern,
}

/// Ordered, immutable preset catalogue with O(1) lookup by id.
#[derive(Debug)]
pub struct PresetTable {
    presets: Vec<Preset>,
    index: FnvHashMap<&'static str, usize>,
}

impl PresetTable {
    pub fn builtin() -> Self {
        Self::from_presets(builtin_presets())
    }

    pub fn from_presets(presets: Vec<Preset>) -> Self {
        let index = presets
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect::<FnvHashMap<_, _>>();
        Self { presets, index }
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.index.get(id).map(|&i| &self.presets[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Parse a `#rrggbb` (or bare `rrggbb`) color into normalized RGB.
pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map(|v| v as f32 / 255.0)
            .ok()
    };
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset {
            id: "idle",
            label: "Idle",
            description: "Calm, waiting state",
            visual: VisualConfig {
                complexity: 2.0,
                speed: 0.3,
                strength: 0.2,
                color1: [0.290, 0.565, 0.886], // #4a90e2
                color2: [0.482, 0.408, 0.933], // #7b68ee
                color3: [0.576, 0.439, 0.859], // #9370db
                metalness: 0.6,
                roughness: 0.3,
                env_map_intensity: 1.2,
            },
            animation: AnimationPattern {
                kind: PatternKind::Gentle,
                breathing_intensity: 0.05,
                breathing_speed: 0.8,
                scale_variation: 0.02,
                float_speed: 1.2,
            },
        },
        Preset {
            id: "thinking",
            label: "Thinking",
            description: "Processing, analyzing",
            visual: VisualConfig {
                complexity: 4.0,
                speed: 0.6,
                strength: 0.4,
                color1: [1.0, 0.420, 0.420], // #ff6b6b
                color2: [1.0, 0.647, 0.0],   // #ffa500
                color3: [1.0, 0.8, 0.0],     // #ffcc00
                metalness: 0.8,
                roughness: 0.2,
                env_map_intensity: 1.5,
            },
            animation: AnimationPattern {
                kind: PatternKind::Pulsing,
                breathing_intensity: 0.08,
                breathing_speed: 1.1,
                scale_variation: 0.03,
                float_speed: 1.0,
            },
        },
        Preset {
            id: "speaking",
            label: "Speaking",
            description: "Active, communicating",
            visual: VisualConfig {
                complexity: 3.0,
                speed: 0.8,
                strength: 0.5,
                color1: [0.0, 1.0, 0.533], // #00ff88
                color2: [0.0, 0.831, 1.0], // #00d4ff
                color3: [0.0, 1.0, 1.0],   // #00ffff
                metalness: 0.9,
                roughness: 0.15,
                env_map_intensity: 2.0,
            },
            animation: AnimationPattern {
                kind: PatternKind::Energetic,
                breathing_intensity: 0.10,
                breathing_speed: 1.6,
                scale_variation: 0.04,
                float_speed: 1.4,
            },
        },
        Preset {
            id: "listening",
            label: "Listening",
            description: "Attentive, receiving input",
            visual: VisualConfig {
                complexity: 2.5,
                speed: 0.4,
                strength: 0.25,
                color1: [0.4, 0.494, 0.918],   // #667eea
                color2: [0.463, 0.294, 0.635], // #764ba2
                color3: [0.659, 0.333, 0.969], // #a855f7
                metalness: 0.7,
                roughness: 0.25,
                env_map_intensity: 1.3,
            },
            animation: AnimationPattern {
                kind: PatternKind::Subtle,
                breathing_intensity: 0.04,
                breathing_speed: 0.6,
                scale_variation: 0.015,
                float_speed: 0.9,
            },
        },
        Preset {
            id: "surprised",
            label: "Surprised",
            description: "Reacting, alert",
            visual: VisualConfig {
                complexity: 5.0,
                speed: 1.2,
                strength: 0.7,
                color1: [1.0, 0.0, 1.0],   // #ff00ff
                color2: [1.0, 0.0, 0.502], // #ff0080
                color3: [1.0, 0.078, 0.576], // #ff1493
                metalness: 1.0,
                roughness: 0.1,
                env_map_intensity: 2.5,
            },
            animation: AnimationPattern {
                kind: PatternKind::Chaotic,
                breathing_intensity: 0.14,
                breathing_speed: 2.2,
                scale_variation: 0.06,
                float_speed: 1.8,
            },
        },
    ]
}
