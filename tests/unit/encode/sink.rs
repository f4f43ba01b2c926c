use super::*;

fn frame(width: u32, height: u32) -> Frame {
    Frame {
        width,
        height,
        data: vec![255; width as usize * height as usize * 4],
        delay_ms: 100,
    }
}

fn started(frame_count: u32) -> InMemorySink {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: 3,
        height: 2,
        frame_count,
    })
    .unwrap();
    sink
}

#[test]
fn keeps_a_complete_animation_in_order() {
    let mut sink = started(3);
    for i in 0..3 {
        let mut f = frame(3, 2);
        f.data[0] = i as u8;
        sink.push_frame(FrameIndex(i), &f).unwrap();
    }
    assert!(!sink.is_complete());
    sink.end().unwrap();

    let frames = sink.into_frames().unwrap();
    let firsts: Vec<u8> = frames.iter().map(|f| f.data[0]).collect();
    assert_eq!(firsts, vec![0, 1, 2]);
}

#[test]
fn gaps_repeats_and_extra_frames_are_refused() {
    let mut sink = started(2);
    assert!(matches!(
        sink.push_frame(FrameIndex(1), &frame(3, 2)),
        Err(MemeError::Encode(_))
    ));
    sink.push_frame(FrameIndex(0), &frame(3, 2)).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &frame(3, 2)).is_err());
    sink.push_frame(FrameIndex(1), &frame(3, 2)).unwrap();
    assert!(sink.push_frame(FrameIndex(2), &frame(3, 2)).is_err());
    assert_eq!(sink.frames().len(), 2);
}

#[test]
fn wrong_size_or_zero_delay_is_a_validation_error() {
    let mut sink = started(2);
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame(2, 3)),
        Err(MemeError::Validation(_))
    ));

    let mut short = frame(3, 2);
    short.data.pop();
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &short),
        Err(MemeError::Validation(_))
    ));

    let mut still = frame(3, 2);
    still.delay_ms = 0;
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &still),
        Err(MemeError::Validation(_))
    ));
}

#[test]
fn ending_early_leaves_the_animation_incomplete() {
    let mut sink = started(3);
    sink.push_frame(FrameIndex(0), &frame(3, 2)).unwrap();
    let err = sink.end().unwrap_err();
    assert_eq!(err.to_string(), "encode error: animation ended after 1 of 3 frames");
    assert!(!sink.is_complete());
    assert!(sink.into_frames().is_err());
}

#[test]
fn lifecycle_and_announcement_checks() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(3, 2)).is_err());
    assert!(sink.end().is_err());

    for cfg in [
        SinkConfig {
            width: 0,
            height: 2,
            frame_count: 1,
        },
        SinkConfig {
            width: 3,
            height: 2,
            frame_count: 0,
        },
    ] {
        assert!(matches!(sink.begin(cfg), Err(MemeError::Validation(_))));
    }

    let mut done = started(1);
    done.push_frame(FrameIndex(0), &frame(3, 2)).unwrap();
    done.end().unwrap();
    assert!(done.push_frame(FrameIndex(1), &frame(3, 2)).is_err());
}
