use rayon::prelude::*;

use crate::signal::channel::ChannelSimulator;
use crate::utils::consts::IQ8_SHIFT;

/// One output sample at raw 16-bit scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IqSample {
    pub i: i16,
    pub q: i16,
}

impl IqSample {
    pub fn to_iq8(self) -> (i8, i8) {
        (narrow_to_iq8(self.i), narrow_to_iq8(self.q))
    }
}

/// Narrow a 16-bit sample to 8 bits: arithmetic shift by 4, then truncate.
#[inline]
pub fn narrow_to_iq8(value: i16) -> i8 {
    (value >> IQ8_SHIFT) as i8
}

/// Sums channel contributions and normalizes them into output samples.
#[derive(Clone, Copy, Debug)]
pub struct SignalCompositor {
    shift: u32,
}

impl SignalCompositor {
    pub fn new(shift: u32) -> Self {
        Self { shift }
    }

    /// Round-half-up right shift, truncated to 16 bits.
    pub fn normalize(&self, acc: i32) -> i16 {
        if self.shift == 0 {
            return acc as i16;
        }
        ((acc + (1 << (self.shift - 1))) >> self.shift) as i16
    }

    /// Sum (I, Q) contributions component-wise.
    pub fn accumulate(contributions: impl IntoIterator<Item = (i32, i32)>) -> (i32, i32) {
        contributions
            .into_iter()
            .fold((0, 0), |(i_acc, q_acc), (i, q)| (i_acc + i, q_acc + q))
    }

    pub fn finish(&self, (i_acc, q_acc): (i32, i32)) -> IqSample {
        IqSample {
            i: self.normalize(i_acc),
            q: self.normalize(q_acc),
        }
    }

    /// Advance every channel by one sample and combine the results.
    pub fn compose_sample(&self, channels: &mut [ChannelSimulator]) -> IqSample {
        let acc = Self::accumulate(
            channels
                .iter_mut()
                .map(|ch| ch.produce_next_iq()),
        );
        self.finish(acc)
    }

    /// Produce `len` samples one at a time.
    pub fn compose_block(&self, channels: &mut [ChannelSimulator], len: usize) -> Vec<IqSample> {
        (0..len)
            .map(|_| self.compose_sample(channels))
            .collect()
    }

    /// Produce `len` samples, rendering each channel's block on the rayon
    /// pool and reducing in channel order. Output is identical to
    /// [`compose_block`](Self::compose_block).
    pub fn compose_block_parallel(
        &self,
        channels: &mut [ChannelSimulator],
        len: usize,
    ) -> Vec<IqSample> {
        let blocks: Vec<Vec<(i32, i32)>> = channels
            .par_iter_mut()
            .map(|ch| ch.render(len))
            .collect();

        (0..len)
            .map(|n| self.finish(Self::accumulate(blocks.iter().map(|b| b[n]))))
            .collect()
    }
}
