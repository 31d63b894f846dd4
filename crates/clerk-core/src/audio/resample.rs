use crate::error::AudioError;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

const CHUNK_SIZE: usize = 1024;

/// Resamples mono audio between arbitrary rates using a windowed sinc filter.
pub struct ResampleConverter {
    inner: SincFixedIn<f32>,
    ratio: f64,
}

impl ResampleConverter {
    pub fn new(from_rate: u32, to_rate: u32) -> Result<Self, AudioError> {
        if from_rate == 0 || to_rate == 0 {
            return Err(AudioError::Resample(format!(
                "invalid rates {from_rate} -> {to_rate}"
            )));
        }
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            oversampling_factor: 256,
            interpolation: SincInterpolationType::Linear,
            window: WindowFunction::BlackmanHarris2,
        };

        let ratio = f64::from(to_rate) / f64::from(from_rate);
        let resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_SIZE, 1)
            .map_err(|e| AudioError::Resample(e.to_string()))?;

        Ok(Self {
            inner: resampler,
            ratio,
        })
    }

    /// Resample a whole buffer.
    ///
    /// The filter delay is trimmed from the front and the tail is flushed with
    /// silence, so the output length is `input.len() * ratio` rounded.
    pub fn process_all(&mut self, input: &[f32]) -> Result<Vec<f32>, AudioError> {
        let expected = (input.len() as f64 * self.ratio).round() as usize;
        let delay = self.inner.output_delay();
        let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);

        let mut padded = vec![0.0f32; CHUNK_SIZE];
        for chunk in input.chunks(CHUNK_SIZE) {
            let frame: &[f32] = if chunk.len() == CHUNK_SIZE {
                chunk
            } else {
                padded[..chunk.len()].copy_from_slice(chunk);
                padded[chunk.len()..].fill(0.0);
                &padded
            };
            self.push(frame, &mut output)?;
        }

        let silence = vec![0.0f32; CHUNK_SIZE];
        while output.len() < expected + delay {
            self.push(&silence, &mut output)?;
        }

        output.drain(..delay.min(output.len()));
        output.truncate(expected);
        Ok(output)
    }

    fn push(&mut self, frame: &[f32], output: &mut Vec<f32>) -> Result<(), AudioError> {
        let result = self
            .inner
            .process(&[frame], None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
        Ok(())
    }
}

/// Resample `samples` from `from_rate` to `to_rate`; a no-op for equal rates.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }
    ResampleConverter::new(from_rate, to_rate)?.process_all(samples)
}
