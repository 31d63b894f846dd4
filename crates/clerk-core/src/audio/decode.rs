use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::AudioError;

/// Mono PCM decoded from a source file at its native rate.
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode the default track of `path` and downmix it to mono.
pub fn decode_mono(path: &Path) -> Result<DecodedAudio, AudioError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(format!("probe: {e}")))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(format!("codec: {e}")))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                debug!("stream reset, resetting decoder");
                decoder.reset();
                continue;
            }
            Err(e) => return Err(AudioError::Decode(format!("packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) => match recovery_for(e) {
                Recovery::Skip => continue,
                Recovery::Reset => {
                    decoder.reset();
                    continue;
                }
                Recovery::Fail(err) => return Err(err),
            },
        };

        let spec = *decoded.spec();
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }

        let mut buffer = SampleBuffer::<f32>::new(frames as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        downmix_into(buffer.samples(), spec.channels.count(), &mut samples);
    }

    debug!(
        path = %path.display(),
        sample_rate,
        samples = samples.len(),
        "audio decoded"
    );

    Ok(DecodedAudio {
        sample_rate,
        samples,
    })
}

#[derive(Debug)]
enum Recovery {
    Skip,
    Reset,
    Fail(AudioError),
}

/// How the decode loop proceeds after a packet fails to decode.
fn recovery_for(err: SymphoniaError) -> Recovery {
    match err {
        SymphoniaError::DecodeError(e) => {
            warn!(error = %e, "skipping corrupt audio frame");
            Recovery::Skip
        }
        SymphoniaError::ResetRequired => {
            debug!("decoder reset required");
            Recovery::Reset
        }
        e => Recovery::Fail(AudioError::Decode(format!("decode: {e}"))),
    }
}

/// Average interleaved frames into mono samples.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}
