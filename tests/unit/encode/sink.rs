use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(24, 1).unwrap(),
        audio: None,
    }
}

#[test]
fn in_memory_sink_keeps_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let f = FrameRGBA::solid(2, 2, [1, 2, 3]);
    sink.push_frame(FrameIndex(0), &f).unwrap();
    sink.push_frame(FrameIndex(1), &f).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &f).is_err());
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().width, 2);
}

#[test]
fn solid_frame_is_opaque() {
    let f = FrameRGBA::solid(3, 1, [9, 8, 7]);
    assert_eq!(f.data.len(), 12);
    assert_eq!(f.pixel(2, 0), [9, 8, 7, 255]);
}

#[test]
fn from_raw_checks_length() {
    assert!(FrameRGBA::from_raw(2, 2, vec![0; 15]).is_err());
    assert!(FrameRGBA::from_raw(2, 2, vec![0; 16]).is_ok());
}
