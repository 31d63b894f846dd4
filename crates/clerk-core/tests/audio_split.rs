mod common;

use std::time::Duration;

use clerk_core::AudioError;
use clerk_core::audio::{CHUNK_SAMPLE_RATE, split_audio, split_audio_by};
use common::{wav_len, write_tone_wav};

#[test]
fn splits_into_ordered_chunks_with_short_tail() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("meeting.wav");
    write_tone_wav(&source, 16_000, 1, 40_000);
    let out_dir = temp.path().join("chunk");

    let chunks = split_audio_by(&source, Duration::from_secs(1), &out_dir).unwrap();

    let names: Vec<_> = chunks
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["chunk_1.wav", "chunk_2.wav", "chunk_3.wav"]);

    let lens: Vec<u32> = chunks.iter().map(|path| wav_len(path).1).collect();
    assert_eq!(lens, [16_000, 16_000, 8_000]);

    let (spec, _) = wav_len(&chunks[0]);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, CHUNK_SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
}

#[test]
fn stereo_low_rate_source_is_downmixed_and_resampled() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("call.wav");
    write_tone_wav(&source, 8_000, 2, 12_000);
    let out_dir = temp.path().join("chunk");

    let chunks = split_audio_by(&source, Duration::from_secs(1), &out_dir).unwrap();

    let lens: Vec<u32> = chunks.iter().map(|path| wav_len(path).1).collect();
    assert_eq!(lens, [16_000, 8_000]);
    for path in &chunks {
        let (spec, _) = wav_len(path);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, CHUNK_SAMPLE_RATE);
    }
}

#[test]
fn source_shorter_than_chunk_yields_single_chunk() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("short.wav");
    write_tone_wav(&source, 16_000, 1, 4_000);
    let out_dir = temp.path().join("nested").join("chunk");

    let chunks = split_audio(&source, 5, &out_dir).unwrap();

    assert_eq!(chunks, [out_dir.join("chunk_1.wav")]);
    assert_eq!(wav_len(&chunks[0]).1, 4_000);
}

#[test]
fn zero_length_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("meeting.wav");
    write_tone_wav(&source, 16_000, 1, 1_000);

    assert!(matches!(
        split_audio(&source, 0, temp.path()),
        Err(AudioError::InvalidChunkLength)
    ));
}

#[test]
fn missing_source_is_not_found() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("absent.m4a");

    assert!(matches!(
        split_audio_by(&missing, Duration::from_secs(60), temp.path()),
        Err(AudioError::NotFound(path)) if path == missing
    ));
    assert!(!temp.path().join("chunk_1.wav").exists());
}
