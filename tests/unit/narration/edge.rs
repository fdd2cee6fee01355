use super::*;

#[test]
fn tempo_filter_formatting() {
    assert_eq!(atempo_filter(1.3), "atempo=1.3");
    assert_eq!(atempo_filter(2.0), "atempo=2");
}

#[test]
fn missing_program_is_synthesis_failure() {
    let dir = tempfile::tempdir().unwrap();
    let backend = EdgeTtsCommand::new("storyreel-definitely-missing-tts", 1.3);
    let err = backend
        .synthesize("hello", "en-US-AndrewNeural", &dir.path().join("out.mp3"))
        .unwrap_err();
    assert!(matches!(err, StoryError::SynthesisFailure(_)));
    assert!(!dir.path().join("out.mp3").exists());
}
