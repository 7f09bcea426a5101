use anyhow::{Context, Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info, warn};

const BUFFER_SEC: f64 = 0.5;

/// Default output device fed through a lock-free ring. The frame loop pushes
/// mono blocks; the device callback fans them out to every channel.
///
/// `cpal::Stream` is not `Send`, so the output lives on the thread that
/// opened it.
pub struct AudioOutput {
    producer: rtrb::Producer<f32>,
    sample_rate: u32,
    channels: u16,
    _stream: cpal::Stream,
}

impl AudioOutput {
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no default output device"))?;
        let supported = device
            .default_output_config()
            .context("failed to query default output config")?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            warn!(
                format = ?supported.sample_format(),
                "output device prefers another sample format, requesting f32"
            );
        }

        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;
        let capacity = (f64::from(sample_rate) * BUFFER_SEC).ceil() as usize;
        let (producer, mut consumer) = rtrb::RingBuffer::<f32>::new(capacity.max(1));

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    fill_interleaved(data, usize::from(channels), || consumer.pop().ok());
                },
                move |err| {
                    error!(%err, "audio output stream error");
                },
                None,
            )
            .context("failed to build output stream")?;
        stream.play().context("failed to start output stream")?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate, channels, "audio output opened"
        );
        Ok(Self {
            producer,
            sample_rate,
            channels,
            _stream: stream,
        })
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn push_block(&mut self, block: &[f32]) -> usize {
        push_available(&mut self.producer, block)
    }
}

impl std::fmt::Debug for AudioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioOutput")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

fn push_available(producer: &mut rtrb::Producer<f32>, block: &[f32]) -> usize {
    let mut queued = 0;
    for sample in block {
        if producer.push(*sample).is_err() {
            break;
        }
        queued += 1;
    }
    queued
}

// Returns the number of silent frames written on underrun.
fn fill_interleaved(
    data: &mut [f32],
    channels: usize,
    mut next: impl FnMut() -> Option<f32>,
) -> usize {
    let mut underrun = 0;
    for frame in data.chunks_mut(channels.max(1)) {
        let sample = next().unwrap_or_else(|| {
            underrun += 1;
            0.0
        });
        frame.fill(sample);
    }
    underrun
}
