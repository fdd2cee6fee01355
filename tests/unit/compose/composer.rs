use super::*;
use crate::encode::sink::InMemorySink;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn settings_follow_config() {
    let s = ComposeSettings::from_config(&ComposeConfig::default()).unwrap();
    assert_eq!(s, ComposeSettings::default());
    assert_eq!(s.fps, Fps::new(24, 1).unwrap());
    assert_eq!(s.narration_gain, 0.9);

    let bad = ComposeConfig {
        fps: 0,
        ..ComposeConfig::default()
    };
    assert!(ComposeSettings::from_config(&bad).is_err());
}

#[test]
fn captions_are_skipped_without_renderer() {
    let mut composer = VideoComposer::new(ComposeSettings::default(), None);
    let units = vec![CaptionUnit {
        text: "Hello there.".to_string(),
        start_seconds: 0.0,
        end_seconds: 1.0,
        split: false,
    }];
    let images = composer.render_captions(&units, 607);
    assert_eq!(images, vec![None]);
}

#[test]
fn missing_source_is_a_composition_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut composer = VideoComposer::new(ComposeSettings::default(), None);
    let mut sink = InMemorySink::new();
    let mut rng = StdRng::seed_from_u64(3);
    let req = ComposeRequest {
        source_video: &dir.path().join("missing.mp4"),
        narration_audio: &dir.path().join("missing.mp3"),
        captions: &[],
        background_audio: None,
    };
    let err = composer
        .compose_into(&req, &mut sink, dir.path(), &mut rng)
        .unwrap_err();
    assert!(matches!(err, StoryError::CompositionFailure(_)), "{err:?}");
    assert!(sink.frames().is_empty());
}

#[test]
fn unprobeable_narration_length_comes_from_samples() {
    let dir = tempfile::tempdir().unwrap();
    let pcm = AudioPcm {
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
        interleaved_f32: vec![0.0; MIX_SAMPLE_RATE as usize * usize::from(MIX_CHANNELS) * 3],
    };
    let secs = narration_length(&dir.path().join("unprobeable.mp3"), &pcm);
    assert!((secs - 3.0).abs() < 1e-9, "{secs}");
}
