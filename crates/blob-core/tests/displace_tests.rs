use blob_core::{
    displace_mesh, pattern_signal, AnimationPattern, AudioLevels, AudioSample, BlobMesh,
    FrameDisplacement, PatternKind, VisualConfig,
};
use glam::Vec3;

fn make_config() -> VisualConfig {
    VisualConfig {
        complexity: 2.0,
        speed: 0.3,
        strength: 0.2,
        color1: [0.3, 0.5, 0.9],
        color2: [0.5, 0.4, 0.9],
        color3: [0.6, 0.4, 0.85],
        metalness: 0.6,
        roughness: 0.3,
        env_map_intensity: 1.2,
    }
}

fn make_pattern(kind: PatternKind) -> AnimationPattern {
    AnimationPattern {
        kind,
        breathing_intensity: 0.05,
        breathing_speed: 0.8,
        scale_variation: 0.02,
        float_speed: 1.2,
    }
}

const ALL_KINDS: [PatternKind; 5] = [
    PatternKind::Gentle,
    PatternKind::Pulsing,
    PatternKind::Energetic,
    PatternKind::Subtle,
    PatternKind::Chaotic,
];

#[test]
fn gentle_signal_at_origin_matches_closed_form() {
    // All sine terms vanish at t=0; only the cosine term remains.
    let p0 = pattern_signal(PatternKind::Gentle, 0.0);
    assert!((p0 - 0.1).abs() < 1e-6, "p(0) = {p0}");
}

#[test]
fn pattern_signal_is_bounded_for_all_kinds() {
    for kind in ALL_KINDS {
        let mut t = 0.0f32;
        while t < 500.0 {
            let p = pattern_signal(kind, t);
            assert!(
                p.abs() <= 2.5,
                "{} exceeded bound at t={t}: {p}",
                kind.name()
            );
            assert!(p.is_finite());
            t += 0.037;
        }
    }
}

#[test]
fn displace_is_deterministic() {
    let config = make_config();
    let pattern = make_pattern(PatternKind::Energetic);
    let sample = Some(AudioSample {
        amplitude: 0.6,
        bass: 0.3,
    });
    let point = Vec3::new(0.3, -0.7, 0.64);

    let a = FrameDisplacement::new(&pattern, &config, 12.375, sample, true).displace(point);
    let b = FrameDisplacement::new(&pattern, &config, 12.375, sample, true).displace(point);
    assert_eq!(a.to_array(), b.to_array(), "expected bit-identical output");
}

#[test]
fn displacement_is_radial() {
    let config = make_config();
    for kind in ALL_KINDS {
        let frame = FrameDisplacement::new(&make_pattern(kind), &config, 3.21, None, false);
        for base in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.57, 0.57, 0.57),
        ] {
            let out = frame.displace(base);
            // Radial scaling keeps the vertex on its own ray from center.
            assert!(base.cross(out).length() < 1e-5, "{}: not radial", kind.name());
        }
    }
}

#[test]
fn audio_levels_default_to_unity() {
    let sample = AudioSample {
        amplitude: 0.9,
        bass: 0.9,
    };
    // No sample at all, or a sample outside an active speech session, must
    // contribute nothing.
    assert_eq!(AudioLevels::derive(None, true), AudioLevels::inactive());
    assert_eq!(
        AudioLevels::derive(Some(sample), false),
        AudioLevels::inactive()
    );
    let inactive = AudioLevels::inactive();
    assert_eq!(inactive.speed_mul, 1.0);
    assert_eq!(inactive.intensity_mul, 1.0);
    assert_eq!(inactive.variation_mul, 1.0);
    assert!(inactive.amplitude.is_none());
}

#[test]
fn audio_levels_apply_documented_weights() {
    let levels = AudioLevels::derive(
        Some(AudioSample {
            amplitude: 0.5,
            bass: 0.4,
        }),
        true,
    );
    assert!((levels.speed_mul - 1.075).abs() < 1e-6);
    assert!((levels.intensity_mul - 1.1).abs() < 1e-6);
    assert!((levels.variation_mul - 1.04).abs() < 1e-6);
    assert_eq!(levels.amplitude, Some(0.5));
}

#[test]
fn sample_without_speech_matches_no_sample() {
    let config = make_config();
    let pattern = make_pattern(PatternKind::Chaotic);
    let sample = Some(AudioSample {
        amplitude: 0.8,
        bass: 0.5,
    });
    let point = Vec3::new(-0.2, 0.9, 0.4);
    let with_sample = FrameDisplacement::new(&pattern, &config, 7.5, sample, false);
    let without = FrameDisplacement::new(&pattern, &config, 7.5, None, false);
    assert_eq!(
        with_sample.displace(point).to_array(),
        without.displace(point).to_array()
    );
}

#[test]
fn active_audio_changes_the_output() {
    let config = make_config();
    let pattern = make_pattern(PatternKind::Energetic);
    let sample = Some(AudioSample {
        amplitude: 0.8,
        bass: 0.5,
    });
    let point = Vec3::new(-0.2, 0.9, 0.4);
    let speaking = FrameDisplacement::new(&pattern, &config, 7.5, sample, true);
    let silent = FrameDisplacement::new(&pattern, &config, 7.5, None, false);
    assert_ne!(
        speaking.displace(point).to_array(),
        silent.displace(point).to_array()
    );
}

#[test]
fn zero_strength_leaves_mesh_untouched() {
    let mut config = make_config();
    config.strength = 0.0;
    let frame = FrameDisplacement::new(&make_pattern(PatternKind::Gentle), &config, 4.0, None, false);
    let mut mesh = BlobMesh::uv_sphere(1.0, 12, 8);
    let before: Vec<[f32; 3]> = mesh.vertices().iter().map(|v| v.position).collect();
    displace_mesh(&mut mesh, &frame);
    let after: Vec<[f32; 3]> = mesh.vertices().iter().map(|v| v.position).collect();
    assert_eq!(before, after);
}

#[test]
fn displace_mesh_is_deterministic_across_meshes() {
    let config = make_config();
    let frame = FrameDisplacement::new(
        &make_pattern(PatternKind::Pulsing),
        &config,
        2.625,
        Some(AudioSample {
            amplitude: 0.4,
            bass: 0.2,
        }),
        true,
    );
    let mut a = BlobMesh::uv_sphere(1.0, 16, 12);
    let mut b = BlobMesh::uv_sphere(1.0, 16, 12);
    displace_mesh(&mut a, &frame);
    displace_mesh(&mut b, &frame);
    for (va, vb) in a.vertices().iter().zip(b.vertices()) {
        assert_eq!(va.position, vb.position);
        assert_eq!(va.normal, vb.normal);
    }
}

#[test]
fn displaced_normals_stay_unit_length() {
    let config = make_config();
    let frame = FrameDisplacement::new(&make_pattern(PatternKind::Chaotic), &config, 9.1, None, false);
    let mut mesh = BlobMesh::uv_sphere(1.0, 24, 16);
    displace_mesh(&mut mesh, &frame);
    for v in mesh.vertices() {
        let len = Vec3::from(v.normal).length();
        assert!((len - 1.0).abs() < 1e-4, "normal length {len}");
    }
}
