use super::*;

#[test]
fn parses_video_with_audio() {
    let json = br#"{
        "streams": [
            {"codec_type": "video", "width": 1920, "height": 1080, "duration": "12.5"},
            {"codec_type": "audio", "duration": "12.4"}
        ],
        "format": {"duration": "12.500000"}
    }"#;
    let info = parse_probe_json(Path::new("clip.mp4"), json).unwrap();
    assert_eq!(info.video_size, Some((1920, 1080)));
    assert!(info.has_audio);
    assert_eq!(info.duration_sec, Some(12.5));
}

#[test]
fn audio_only_falls_back_to_stream_duration() {
    let json = br#"{
        "streams": [{"codec_type": "audio", "duration": "31.2"}],
        "format": {}
    }"#;
    let info = parse_probe_json(Path::new("n.mp3"), json).unwrap();
    assert_eq!(info.video_size, None);
    assert_eq!(info.duration_sec, Some(31.2));
}

#[test]
fn garbage_durations_are_ignored() {
    let json = br#"{"streams": [{"codec_type": "audio", "duration": "N/A"}], "format": {"duration": "nan"}}"#;
    let info = parse_probe_json(Path::new("x"), json).unwrap();
    assert_eq!(info.duration_sec, None);
}

#[test]
fn invalid_json_is_an_error() {
    assert!(parse_probe_json(Path::new("x"), b"not json").is_err());
}
