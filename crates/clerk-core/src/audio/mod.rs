pub mod chunker;
pub mod decode;
pub mod resample;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info};

use crate::error::AudioError;
use chunker::{chunk_ranges, samples_per_chunk};

/// Rate every chunk is written at.
pub const CHUNK_SAMPLE_RATE: u32 = 16_000;

/// Split `source` into chunks of `chunk_minutes` written under `out_dir`.
pub fn split_audio(
    source: &Path,
    chunk_minutes: u32,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, AudioError> {
    split_audio_by(
        source,
        Duration::from_secs(u64::from(chunk_minutes) * 60),
        out_dir,
    )
}

/// Split `source` into consecutive `chunk_len` pieces of 16 kHz mono WAV.
///
/// Files are named `chunk_1.wav`, `chunk_2.wav`, ... and returned in order.
/// The last chunk may be shorter; an empty source still yields one chunk.
pub fn split_audio_by(
    source: &Path,
    chunk_len: Duration,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, AudioError> {
    if !source.exists() {
        return Err(AudioError::NotFound(source.to_path_buf()));
    }
    let per_chunk = samples_per_chunk(chunk_len, CHUNK_SAMPLE_RATE)?;

    let decoded = decode::decode_mono(source)?;
    info!(
        path = %source.display(),
        duration_secs = decoded.duration_secs(),
        sample_rate = decoded.sample_rate,
        "splitting audio"
    );
    let samples = resample::resample(&decoded.samples, decoded.sample_rate, CHUNK_SAMPLE_RATE)?;

    fs::create_dir_all(out_dir)?;
    let ranges = chunk_ranges(samples.len(), per_chunk);
    let mut paths = Vec::with_capacity(ranges.len());
    for (index, range) in ranges.into_iter().enumerate() {
        let path = out_dir.join(format!("chunk_{}.wav", index + 1));
        write_wav(&path, &samples[range])?;
        debug!(path = %path.display(), "chunk written");
        paths.push(path);
    }

    info!(chunks = paths.len(), "audio split complete");
    Ok(paths)
}

/// Write mono f32 samples as 16-bit PCM WAV.
pub fn write_wav(path: &Path, samples: &[f32]) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: CHUNK_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer =
        WavWriter::create(path, spec).map_err(|e| AudioError::Encode(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(to_i16(sample))
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioError::Encode(e.to_string()))?;
    Ok(())
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
