//! Sequential reads over a synthetic decoder.

use rstest::{fixture, rstest};
use sitar_decode::{
    AdapterError, Format, SourceError, StreamAdapter, TimeBase, bytes_to_duration,
};
use sitar_test_utils::{Failure, Stamps, SyntheticSource, init_tracing, pattern_bytes};

const FORMAT: Format = Format::pcm(44_100, 16, 2);
const TOTAL: u64 = 4_000;

fn drain<S: sitar_decode::FrameSource>(adapter: &StreamAdapter<S>, chunk: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = adapter.read(&mut buf).unwrap();
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

/// Ten 400-byte frames; one sample-unit timestamp is exactly one block.
#[fixture]
fn ten_frames() -> SyntheticSource {
    init_tracing();
    SyntheticSource::new(FORMAT, TOTAL, 400)
        .with_time_base(TimeBase::per_sample(&FORMAT).unwrap())
}

#[rstest]
fn chunked_reads_reproduce_every_frame(ten_frames: SyntheticSource) {
    let adapter = StreamAdapter::new(ten_frames).unwrap();

    assert_eq!(drain(&adapter, 150), pattern_bytes(0..TOTAL));
    assert_eq!(adapter.position(), TOTAL);

    let mut buf = [0u8; 150];
    for _ in 0..3 {
        assert_eq!(adapter.read(&mut buf).unwrap(), 0);
    }
}

#[rstest]
#[case::tiny(1)]
#[case::odd(7)]
#[case::frame_sized(400)]
#[case::larger_than_stream(10_000)]
fn chunk_size_does_not_change_content(ten_frames: SyntheticSource, #[case] chunk: usize) {
    let adapter = StreamAdapter::new(ten_frames).unwrap();
    assert_eq!(drain(&adapter, chunk), pattern_bytes(0..TOTAL));
}

#[rstest]
fn uneven_and_empty_frames_are_stitched() {
    init_tracing();
    let source = SyntheticSource::new(FORMAT, 3_000, 0).with_frame_sizes(vec![0, 1, 333, 0, 1_024]);
    let counters = source.counters();
    let adapter = StreamAdapter::new(source).unwrap();

    assert_eq!(drain(&adapter, 97), pattern_bytes(0..3_000));
    assert!(counters.reads() > 5);
}

#[rstest]
fn hundred_nanosecond_stamps_read_the_same(#[values(13, 4_096)] chunk: usize) {
    init_tracing();
    let source = SyntheticSource::new(FORMAT, TOTAL, 400);
    let adapter = StreamAdapter::new(source).unwrap();
    assert_eq!(drain(&adapter, chunk), pattern_bytes(0..TOTAL));
}

#[rstest]
fn length_and_time_views(ten_frames: SyntheticSource) {
    let adapter = StreamAdapter::new(ten_frames).unwrap();
    assert_eq!(adapter.length(), TOTAL);
    assert_eq!(adapter.length_time(), bytes_to_duration(TOTAL, &FORMAT));
    assert_eq!(adapter.format(), FORMAT);
}

#[rstest]
fn unknown_duration_reports_zero_length(ten_frames: SyntheticSource) {
    let adapter = StreamAdapter::new(ten_frames.with_duration_reported(false)).unwrap();
    assert_eq!(adapter.length(), 0);
}

#[rstest]
fn error_flag_on_fifth_fetch_faults_once(ten_frames: SyntheticSource) {
    let source = ten_frames.failing_at(4, Failure::Flag);
    let counters = source.counters();
    let adapter = StreamAdapter::new(source).unwrap();

    let mut buf = vec![0u8; TOTAL as usize];
    match adapter.read(&mut buf) {
        Err(AdapterError::Decode {
            delivered,
            source: SourceError::FrameFailed,
        }) => {
            assert_eq!(delivered, 1_600);
            assert_eq!(&buf[..delivered], &pattern_bytes(0..1_600)[..]);
        }
        other => panic!("expected decode failure, got {other:?}"),
    }
    assert_eq!(counters.reads(), 5);

    assert_eq!(adapter.read(&mut buf).unwrap(), 0);
    assert_eq!(adapter.read(&mut buf).unwrap(), 0);
    assert_eq!(counters.reads(), 5);
    assert!(adapter.is_faulted());
}

#[rstest]
fn source_error_faults_like_error_flag(ten_frames: SyntheticSource) {
    let adapter = StreamAdapter::new(ten_frames.failing_at(0, Failure::Error)).unwrap();
    let mut buf = [0u8; 64];
    assert!(matches!(
        adapter.read(&mut buf),
        Err(AdapterError::Decode {
            delivered: 0,
            source: SourceError::Backend(_)
        })
    ));
    assert_eq!(adapter.read(&mut buf).unwrap(), 0);
}

#[rstest]
fn missing_timestamps_do_not_matter_without_seeks(ten_frames: SyntheticSource) {
    let adapter = StreamAdapter::new(ten_frames.with_stamps(Stamps::Missing)).unwrap();
    assert_eq!(drain(&adapter, 512), pattern_bytes(0..TOTAL));
}
