use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StoryError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(StoryError::config("x").to_string().contains("config error:"));
    assert!(
        StoryError::source_unavailable("x")
            .to_string()
            .contains("content source unavailable:")
    );
    assert!(
        StoryError::synthesis("x")
            .to_string()
            .contains("narration failed:")
    );
    assert!(
        StoryError::composition("x")
            .to_string()
            .contains("composition failed:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StoryError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn into_composition_keeps_validation_category() {
    let err = StoryError::validation("bad crop").into_composition();
    assert!(matches!(err, StoryError::Validation(_)));

    let err = StoryError::Other(anyhow::anyhow!("ffmpeg died")).into_composition();
    match err {
        StoryError::CompositionFailure(msg) => assert!(msg.contains("ffmpeg died")),
        other => panic!("unexpected error: {other:?}"),
    }
}
