//! Owned PCM sample buffers
//!
//! Interleaved stereo, signed 16-bit little-endian, fixed sample rate.

use std::time::Duration;

/// Output sample rate in Hz (not configurable)
pub const SAMPLE_RATE: u32 = 44100;

/// Interleaved channels per frame
pub const CHANNELS: u16 = 2;

/// Bytes per stereo frame (2 channels × 2 bytes)
pub const BYTES_PER_FRAME: usize = CHANNELS as usize * 2;

/// A rendered sound, owned by whoever requested it until it is handed to
/// the output device
#[derive(Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    bytes: Vec<u8>,
}

impl PcmBuffer {
    /// Empty buffer with room for `frames` frames
    pub fn with_frames(frames: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(frames * BYTES_PER_FRAME),
        }
    }

    /// Append one mono sample to both channels.
    ///
    /// `sample` is nominally in [-1, 1]; it is scaled by 32767 and truncated,
    /// saturating at the i16 limits.
    pub fn push_mono(&mut self, sample: f64) {
        let value = (sample * 32767.0) as i16;
        let [lo, hi] = value.to_le_bytes();
        self.bytes.extend_from_slice(&[lo, hi, lo, hi]);
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn frame_count(&self) -> usize {
        self.bytes.len() / BYTES_PER_FRAME
    }

    /// Playback length at `SAMPLE_RATE`
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frame_count() as f64 / SAMPLE_RATE as f64)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decoded `(left, right)` frames
    pub fn frames(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.bytes.chunks_exact(BYTES_PER_FRAME).map(|frame| {
            (
                i16::from_le_bytes([frame[0], frame[1]]),
                i16::from_le_bytes([frame[2], frame[3]]),
            )
        })
    }

    /// Frames as floats in [-1, 1), the format the mixer works in
    pub fn to_f32_frames(&self) -> Vec<[f32; 2]> {
        self.frames()
            .map(|(l, r)| [l as f32 / 32768.0, r as f32 / 32768.0])
            .collect()
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> i16 {
        self.frames()
            .map(|(l, r)| l.saturating_abs().max(r.saturating_abs()))
            .max()
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for PcmBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcmBuffer")
            .field("frames", &self.frame_count())
            .field("duration", &self.duration())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_mono_writes_both_channels() {
        let mut buffer = PcmBuffer::with_frames(2);
        buffer.push_mono(0.5);
        buffer.push_mono(-1.0);

        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.frame_count(), 2);
        let frames: Vec<_> = buffer.frames().collect();
        assert_eq!(frames, vec![(16383, 16383), (-32767, -32767)]);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut buffer = PcmBuffer::with_frames(1);
        buffer.push_mono(1.0);
        assert_eq!(buffer.as_bytes(), &[0xff, 0x7f, 0xff, 0x7f]);
    }

    #[test]
    fn test_out_of_range_saturates() {
        let mut buffer = PcmBuffer::with_frames(2);
        buffer.push_mono(3.0);
        buffer.push_mono(-3.0);
        let frames: Vec<_> = buffer.frames().collect();
        assert_eq!(frames, vec![(i16::MAX, i16::MAX), (i16::MIN, i16::MIN)]);
    }

    #[test]
    fn test_duration() {
        let mut buffer = PcmBuffer::with_frames(4410);
        for _ in 0..4410 {
            buffer.push_mono(0.0);
        }
        assert_eq!(buffer.duration(), Duration::from_millis(100));
        assert_eq!(buffer.peak(), 0);
    }
}
