use super::*;
use crate::encode::sink::AudioInputConfig;

fn cfg(width: u32, height: u32, audio: bool) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(24, 1).unwrap(),
        audio: audio.then(|| AudioInputConfig {
            path: PathBuf::from("/tmp/mix.f32le"),
            sample_rate: 48_000,
            channels: 2,
        }),
    }
}

fn pos(args: &[String], needle: &str) -> usize {
    args.iter()
        .position(|a| a == needle)
        .unwrap_or_else(|| panic!("missing arg {needle}: {args:?}"))
}

#[test]
fn audio_args_follow_video_input() {
    let args = encoder_args(&cfg(608, 1080, true), Path::new("out.mp4"), true);
    assert_eq!(args[0], "-y");
    assert!(pos(&args, "pipe:0") < pos(&args, "/tmp/mix.f32le"));
    assert!(args.iter().any(|a| a == "aac"));
    assert!(args.iter().any(|a| a == "-shortest"));
    assert!(args.iter().any(|a| a == "+faststart"));
    assert!(!args.iter().any(|a| a == "-vf"));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn odd_sizes_get_pad_filter() {
    let args = encoder_args(&cfg(607, 1080, false), Path::new("out.mp4"), false);
    assert_eq!(args[0], "-n");
    let vf = pos(&args, "-vf");
    assert_eq!(args[vf + 1], "pad=ceil(iw/2)*2:ceil(ih/2)*2");
    assert!(args.iter().any(|a| a == "-an"));
    assert!(args.iter().any(|a| a == "607x1080"));
}

#[test]
fn input_rate_is_rational() {
    let fps = Fps::new(30_000, 1001).unwrap();
    assert_eq!(input_fps_args(fps), ["-r".to_string(), "30000/1001".to_string()]);
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b").join("video.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(out.parent().unwrap().is_dir());
    // A bare file name has no parent to create.
    ensure_parent_dir(Path::new("video.mp4")).unwrap();
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.mp4"));
    let f = FrameRGBA::solid(2, 2, [0, 0, 0]);
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
    assert!(sink.end().is_err());
}
