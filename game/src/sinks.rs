//! Audio sinks the demo can play through

use earshot_engine::acoustics::{decibels_to_gain, AudioSink, PlaybackError, SoundClip};
use tracing::info;

/// Equal-power gains `(left, right)` for a pan in [-1, 1]
pub fn pan_gains(pan: f64) -> (f64, f64) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) / 2.0 * std::f64::consts::FRAC_PI_2;
    (angle.cos(), angle.sin())
}

/// Writes every playback to the log instead of a sound device
#[derive(Debug, Default)]
pub struct LoggingSink {
    played: usize,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sounds played so far
    pub fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for LoggingSink {
    fn play(
        &mut self,
        clip: &SoundClip,
        volume_adjustment: f64,
        pan: f64,
    ) -> Result<(), PlaybackError> {
        let (left, right) = pan_gains(pan);
        let gain = decibels_to_gain(volume_adjustment);
        info!(
            clip = %clip,
            volume_adjustment,
            pan,
            left = left * gain,
            right = right * gain,
            "Playing sound"
        );
        self.played += 1;
        Ok(())
    }
}

#[cfg(feature = "audio")]
pub use rodio_sink::RodioSink;

#[cfg(feature = "audio")]
mod rodio_sink {
    use super::pan_gains;
    use crate::panning::StereoPanned;
    use earshot_engine::acoustics::{decibels_to_gain, AudioSink, PlaybackError, SoundClip};
    use rodio::source::Buffered;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Source};
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::PathBuf;
    use tracing::{debug, info};

    type Clip = Buffered<Decoder<BufReader<File>>>;

    /// Plays clips on the default output device.
    ///
    /// A clip named `bird` is read from `<asset_dir>/bird.wav` the first time
    /// it is played and kept in memory afterwards.
    pub struct RodioSink {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        asset_dir: PathBuf,
        clips: HashMap<SoundClip, Clip>,
    }

    impl RodioSink {
        pub fn new(asset_dir: impl Into<PathBuf>) -> Result<Self, PlaybackError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|err| PlaybackError::Sink {
                    clip: String::new(),
                    reason: format!("no output device: {err}"),
                })?;

            let asset_dir = asset_dir.into();
            info!(asset_dir = ?asset_dir, "Audio output ready");
            Ok(Self {
                _stream: stream,
                handle,
                asset_dir,
                clips: HashMap::new(),
            })
        }

        fn clip(&mut self, clip: &SoundClip) -> Result<Clip, PlaybackError> {
            if let Some(data) = self.clips.get(clip) {
                return Ok(data.clone());
            }

            let path = self.asset_dir.join(format!("{}.wav", clip.name()));
            let failed = |reason: String| PlaybackError::Sink {
                clip: clip.to_string(),
                reason,
            };
            let file = File::open(&path).map_err(|err| failed(format!("{}: {err}", path.display())))?;
            let data = Decoder::new(BufReader::new(file))
                .map_err(|err| failed(err.to_string()))?
                .buffered();

            debug!(path = ?path, "Loaded sound clip");
            self.clips.insert(clip.clone(), data.clone());
            Ok(data)
        }
    }

    impl AudioSink for RodioSink {
        fn play(
            &mut self,
            clip: &SoundClip,
            volume_adjustment: f64,
            pan: f64,
        ) -> Result<(), PlaybackError> {
            let data = self.clip(clip)?;
            let gain = decibels_to_gain(volume_adjustment);
            let (left, right) = pan_gains(pan);

            let source = StereoPanned::new(
                data.convert_samples::<f32>(),
                (left * gain) as f32,
                (right * gain) as f32,
            );
            self.handle
                .play_raw(source)
                .map_err(|err| PlaybackError::Sink {
                    clip: clip.to_string(),
                    reason: err.to_string(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_power_panning() {
        let (left, right) = pan_gains(0.0);
        assert!((left - 0.707).abs() < 0.01);
        assert!((right - 0.707).abs() < 0.01);

        let (left, right) = pan_gains(-1.0);
        assert!((left - 1.0).abs() < 1e-9);
        assert!(right.abs() < 1e-9);

        let (left, right) = pan_gains(1.0);
        assert!(left.abs() < 1e-9);
        assert!((right - 1.0).abs() < 1e-9);

        let (left, right) = pan_gains(-0.5);
        assert!((left * left + right * right - 1.0).abs() < 1e-9);
        assert!(left > right);
    }

    #[test]
    fn test_pan_is_clamped() {
        assert_eq!(pan_gains(5.0), pan_gains(1.0));
        assert_eq!(pan_gains(-5.0), pan_gains(-1.0));
    }

    #[test]
    fn test_logging_sink_counts() {
        let mut sink = LoggingSink::new();
        sink.play(&SoundClip::from("bird"), -8.0, -1.0).unwrap();
        sink.play(&SoundClip::from("bird"), -8.0, 1.0).unwrap();
        assert_eq!(sink.played(), 2);
    }
}
