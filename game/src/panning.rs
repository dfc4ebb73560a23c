//! Per-channel gain for rodio sources

use rodio::{Sample, Source};
use std::time::Duration;

/// Stereo output with separate left and right gains.
///
/// Mono input is duplicated onto both channels. Stereo input is scaled per
/// channel. Anything wider gets the average gain on every channel.
pub struct StereoPanned<I>
where
    I: Source,
    I::Item: Sample,
{
    input: I,
    input_channels: u16,
    left_gain: f32,
    right_gain: f32,
    current_sample: Option<I::Item>,
    channel_idx: u16,
}

impl<I> StereoPanned<I>
where
    I: Source,
    I::Item: Sample,
{
    pub fn new(input: I, left_gain: f32, right_gain: f32) -> Self {
        let input_channels = input.channels();
        Self {
            input,
            input_channels,
            left_gain,
            right_gain,
            current_sample: None,
            channel_idx: 0,
        }
    }
}

impl<I> Iterator for StereoPanned<I>
where
    I: Source,
    I::Item: Sample,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.input_channels {
            1 => {
                if self.channel_idx == 0 {
                    self.current_sample = self.input.next();
                    self.channel_idx = 1;
                    self.current_sample.map(|s| s.amplify(self.left_gain))
                } else {
                    self.channel_idx = 0;
                    self.current_sample.map(|s| s.amplify(self.right_gain))
                }
            }
            2 => {
                let sample = self.input.next()?;
                let gain = if self.channel_idx == 0 {
                    self.left_gain
                } else {
                    self.right_gain
                };
                self.channel_idx = (self.channel_idx + 1) % 2;
                Some(sample.amplify(gain))
            }
            _ => {
                let sample = self.input.next()?;
                Some(sample.amplify((self.left_gain + self.right_gain) / 2.0))
            }
        }
    }
}

impl<I> Source for StereoPanned<I>
where
    I: Source,
    I::Item: Sample,
{
    fn current_frame_len(&self) -> Option<usize> {
        match self.input_channels {
            1 => self.input.current_frame_len().map(|len| len * 2),
            _ => self.input.current_frame_len(),
        }
    }

    fn channels(&self) -> u16 {
        match self.input_channels {
            1 => 2,
            channels => channels,
        }
    }

    fn sample_rate(&self) -> u32 {
        self.input.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.input.total_duration()
    }
}
