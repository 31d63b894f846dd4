use std::ops::Range;
use std::time::Duration;

use crate::error::AudioError;

/// Number of samples in one chunk of `length` at `sample_rate`.
pub fn samples_per_chunk(length: Duration, sample_rate: u32) -> Result<usize, AudioError> {
    let samples = (length.as_secs_f64() * f64::from(sample_rate)).round() as usize;
    if samples == 0 {
        return Err(AudioError::InvalidChunkLength);
    }
    Ok(samples)
}

/// Contiguous, non-overlapping ranges covering `0..total`.
///
/// Every range except the last holds exactly `per_chunk` samples. An empty
/// input still yields one (empty) range.
pub fn chunk_ranges(total: usize, per_chunk: usize) -> Vec<Range<usize>> {
    if total == 0 || per_chunk == 0 {
        return vec![0..total];
    }
    (0..total)
        .step_by(per_chunk)
        .map(|start| start..(start + per_chunk).min(total))
        .collect()
}
