//! Randomized read/seek sequences checked against the known byte pattern.

use std::{sync::Arc, thread};

use rstest::rstest;
use sitar_decode::{Format, StreamAdapter, TimeBase, align_down};
use sitar_test_utils::{
    SeekLanding, Stamps, SyntheticSource, Xorshift64, init_tracing, pattern_bytes,
};

const TOTAL: u64 = 64 * 1024;

#[rstest]
#[case::stereo_16(Format::pcm(44_100, 16, 2), false, 0xDEAD_BEEF)]
#[case::mono_8(Format::pcm(8_000, 8, 1), false, 0x1234_5678)]
#[case::float_stereo(Format::float(48_000, 2), false, 0xC0FF_EE00)]
#[case::surround_24(Format::pcm(96_000, 24, 6), true, 0x0BAD_F00D)]
fn random_reads_and_seeks_match_pattern(
    #[case] format: Format,
    #[case] per_sample: bool,
    #[case] seed: u64,
    #[values(Stamps::Exact, Stamps::Truncated)] stamps: Stamps,
) {
    init_tracing();
    let mut rng = Xorshift64::new(seed);

    let sizes = (0..7).map(|_| rng.range_usize(0, 3_000)).chain([512]).collect();
    let landing = match rng.range_u64(0, 3) {
        0 => SeekLanding::Exact,
        1 => SeekLanding::Before(u64::from(format.block_align()) * 97),
        _ => SeekLanding::Before(u64::from(format.block_align()) * 256),
    };
    let mut source = SyntheticSource::new(format, TOTAL, 0)
        .with_frame_sizes(sizes)
        .with_seek_landing(landing)
        .with_stamps(stamps);
    if per_sample {
        source = source.with_time_base(TimeBase::per_sample(&format).unwrap());
    }
    let adapter = StreamAdapter::new(source).unwrap();

    let mut expected_pos = 0u64;
    let mut buf = vec![0u8; 8_192];
    for step in 0..400 {
        if rng.chance(20) {
            let target = rng.range_u64(0, TOTAL + 1);
            adapter.seek(target).unwrap();
            expected_pos = align_down(target, &format);
            assert_eq!(adapter.position(), expected_pos, "seed={seed:#x} step={step}");
            continue;
        }

        let want = rng.range_usize(0, buf.len());
        let got = adapter.read(&mut buf[..want]).unwrap();
        let end = (expected_pos + want as u64).min(TOTAL);
        assert_eq!(
            got as u64,
            end - expected_pos,
            "seed={seed:#x} step={step} pos={expected_pos} want={want}"
        );
        assert_eq!(
            &buf[..got],
            &pattern_bytes(expected_pos..end)[..],
            "seed={seed:#x} step={step} pos={expected_pos}"
        );
        expected_pos = end;
        assert_eq!(adapter.position(), expected_pos, "seed={seed:#x} step={step}");
    }
}

#[test]
fn shared_adapter_serializes_readers() {
    init_tracing();
    let format = Format::pcm(44_100, 16, 2);
    let adapter = Arc::new(StreamAdapter::new(SyntheticSource::new(format, TOTAL, 1_000)).unwrap());

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let adapter = Arc::clone(&adapter);
            thread::spawn(move || {
                let mut rng = Xorshift64::new(100 + i);
                let mut chunks = Vec::new();
                let mut buf = vec![0u8; 2_048];
                loop {
                    let want = rng.range_usize(1, buf.len());
                    let n = adapter.read(&mut buf[..want]).unwrap();
                    if n == 0 {
                        return chunks;
                    }
                    chunks.push(buf[..n].to_vec());
                }
            })
        })
        .collect();

    let mut total = 0usize;
    for worker in workers {
        for chunk in worker.join().unwrap() {
            // Every chunk is a contiguous slice of the stream.
            let start = chunk[0];
            let offset = (0..TOTAL)
                .step_by(251)
                .map(|base| base + u64::from(start))
                .find(|off| pattern_bytes(*off..*off + chunk.len() as u64) == chunk);
            assert!(offset.is_some(), "chunk of {} bytes is not contiguous", chunk.len());
            total += chunk.len();
        }
    }
    assert_eq!(total as u64, TOTAL);
    assert_eq!(adapter.position(), TOTAL);
}

#[test]
fn close_from_another_thread_stops_readers() {
    init_tracing();
    let format = Format::pcm(44_100, 16, 2);
    let adapter = Arc::new(StreamAdapter::new(SyntheticSource::new(format, TOTAL, 256)).unwrap());

    let closer = {
        let adapter = Arc::clone(&adapter);
        thread::spawn(move || adapter.close())
    };
    closer.join().unwrap();

    let mut buf = [0u8; 16];
    assert!(adapter.read(&mut buf).is_err());
    assert!(adapter.is_closed());
    assert_eq!(adapter.length(), 0);
}
