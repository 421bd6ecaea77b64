//! Conversion between byte offsets and source time units.
//!
//! All arithmetic runs in `u128`, so no `u64` input overflows and repeated
//! conversions do not drift. Results that do not fit back into `u64`
//! saturate.
//!
//! Byte results are floored to a multiple of the block alignment. Flooring
//! never points past data the source has actually produced, so a seek can
//! only land on or before the requested sample.
//!
//! Frame timestamps are the exception: they name a sample frame, and decoders
//! round them either way (100 ns stamps are usually truncated). They are
//! resolved to the nearest sample frame by [`TimeByteConverter::to_frame_offset`]
//! so a truncated stamp does not point one block early.

use std::time::Duration;

use crate::types::{Format, TimeBase};

/// Stateless converter bound to one negotiated format and time base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeByteConverter {
    format: Format,
    time_base: TimeBase,
}

impl TimeByteConverter {
    /// `format` must satisfy [`Format::validate`].
    #[must_use]
    pub const fn new(format: Format, time_base: TimeBase) -> Self {
        Self { format, time_base }
    }

    #[must_use]
    pub const fn format(&self) -> &Format {
        &self.format
    }

    #[must_use]
    pub const fn time_base(&self) -> TimeBase {
        self.time_base
    }

    /// `floor(time * bytes_per_second / units_per_second)`, floored to
    /// `block_align`.
    #[must_use]
    pub fn to_bytes(&self, time: u64) -> u64 {
        let bytes = mul_div(
            time,
            self.format.bytes_per_second(),
            self.time_base.units_per_second(),
        );
        self.align_down(bytes)
    }

    /// Byte offset of the sample frame nearest to `time`.
    ///
    /// Exact when the time base resolves at least two units per sample
    /// frame, which holds for 100 ns and per-sample bases.
    #[must_use]
    pub fn to_frame_offset(&self, time: u64) -> u64 {
        let rate = u128::from(self.format.sample_rate);
        let units = u128::from(self.time_base.units_per_second());
        let frames = (u128::from(time) * rate * 2 + units) / (units * 2);
        let bytes = frames * u128::from(self.format.block_align());
        u64::try_from(bytes).unwrap_or(u64::MAX)
    }

    /// `bytes * units_per_second / bytes_per_second`, truncated.
    #[must_use]
    pub fn to_time(&self, bytes: u64) -> u64 {
        mul_div(
            bytes,
            self.time_base.units_per_second(),
            self.format.bytes_per_second(),
        )
    }

    #[must_use]
    pub fn align_down(&self, bytes: u64) -> u64 {
        align_down(bytes, &self.format)
    }

    #[must_use]
    pub fn to_duration(&self, bytes: u64) -> Duration {
        bytes_to_duration(bytes, &self.format)
    }
}

/// Largest multiple of `block_align` not above `bytes`.
#[must_use]
pub fn align_down(bytes: u64, format: &Format) -> u64 {
    let block = u64::from(format.block_align());
    if block == 0 {
        return bytes;
    }
    bytes - bytes % block
}

/// Playback time covered by `bytes` of audio in `format`.
#[must_use]
pub fn bytes_to_duration(bytes: u64, format: &Format) -> Duration {
    let bps = format.bytes_per_second();
    if bps == 0 {
        return Duration::ZERO;
    }
    let secs = bytes / bps;
    let nanos = mul_div(bytes % bps, TimeBase::NANOS.units_per_second(), bps);
    Duration::new(secs, nanos as u32)
}

/// Byte offset of `duration`, floored to `block_align`.
#[must_use]
pub fn duration_to_bytes(duration: Duration, format: &Format) -> u64 {
    let bytes = u128::from(format.bytes_per_second()) * duration.as_nanos()
        / u128::from(TimeBase::NANOS.units_per_second());
    align_down(u64::try_from(bytes).unwrap_or(u64::MAX), format)
}

fn mul_div(value: u64, mul: u64, div: u64) -> u64 {
    if div == 0 {
        return 0;
    }
    let wide = u128::from(value) * u128::from(mul) / u128::from(div);
    u64::try_from(wide).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn cd() -> TimeByteConverter {
        TimeByteConverter::new(Format::pcm(44_100, 16, 2), TimeBase::HUNDRED_NANOS)
    }

    #[rstest]
    #[case::zero(0, 0)]
    #[case::one_second(10_000_000, 176_400)]
    #[case::half_second(5_000_000, 88_200)]
    // 1 ms = 176.4 bytes -> 176
    #[case::one_milli(10_000, 176)]
    // 22_675 units = 399.987 bytes -> 399 -> aligned to 396
    #[case::floors_to_block(22_675, 396)]
    fn test_to_bytes(#[case] time: u64, #[case] bytes: u64) {
        assert_eq!(cd().to_bytes(time), bytes);
    }

    #[rstest]
    #[case::zero(0, 0)]
    #[case::one_second(176_400, 10_000_000)]
    #[case::truncates(400, 22_675)]
    #[case::seek_target(2_000, 113_378)]
    fn test_to_time(#[case] bytes: u64, #[case] time: u64) {
        assert_eq!(cd().to_time(bytes), time);
    }

    #[test]
    fn test_to_bytes_is_block_aligned() {
        let conv = cd();
        for time in (0..1_000_000).step_by(7_919) {
            assert_eq!(conv.to_bytes(time) % 4, 0, "time {time}");
        }
    }

    #[test]
    fn test_round_trip_never_overshoots() {
        let conv = cd();
        for bytes in (0..200_000u64).step_by(4) {
            let back = conv.to_bytes(conv.to_time(bytes));
            assert!(back <= bytes, "{bytes} -> {back}");
            assert!(bytes - back <= 4, "{bytes} -> {back} drifted");
        }
    }

    #[rstest]
    // 2000 bytes = 113_378.68 units
    #[case::truncated(113_378, 2_000)]
    #[case::rounded_up(113_379, 2_000)]
    #[case::zero(0, 0)]
    // 400 bytes = 22_675.73 units
    #[case::truncated_first_frame(22_675, 400)]
    fn test_frame_offset_resolves_nearest_sample(#[case] time: u64, #[case] bytes: u64) {
        assert_eq!(cd().to_frame_offset(time), bytes);
    }

    #[test]
    fn test_frame_offset_inverts_truncated_stamps() {
        let conv = cd();
        for bytes in (0..400_000u64).step_by(4) {
            assert_eq!(conv.to_frame_offset(conv.to_time(bytes)), bytes, "bytes {bytes}");
        }
        assert_eq!(conv.to_frame_offset(u64::MAX) % 4, 0);
    }

    #[test]
    fn test_sample_time_base_is_exact() {
        let format = Format::pcm(44_100, 16, 2);
        let conv = TimeByteConverter::new(format, TimeBase::per_sample(&format).unwrap());
        for frame in 0..10u64 {
            assert_eq!(conv.to_bytes(frame * 100), frame * 400);
            assert_eq!(conv.to_time(frame * 400), frame * 100);
        }
    }

    #[test]
    fn test_large_values_saturate_instead_of_overflowing() {
        let conv = cd();
        assert_eq!(conv.to_time(u64::MAX), u64::MAX);
        assert_eq!(conv.to_bytes(u64::MAX) % 4, 0);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 0)]
    #[case(4, 4)]
    #[case(2_001, 2_000)]
    #[case(2_003, 2_000)]
    fn test_align_down(#[case] bytes: u64, #[case] aligned: u64) {
        assert_eq!(align_down(bytes, &Format::pcm(44_100, 16, 2)), aligned);
    }

    #[test]
    fn test_duration_views() {
        let format = Format::pcm(44_100, 16, 2);
        assert_eq!(bytes_to_duration(176_400, &format), Duration::from_secs(1));
        assert_eq!(bytes_to_duration(88_200, &format), Duration::from_millis(500));
        assert_eq!(duration_to_bytes(Duration::from_secs(2), &format), 352_800);
        assert_eq!(duration_to_bytes(Duration::from_millis(1), &format), 176);
    }
}
