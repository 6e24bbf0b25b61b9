//! ADC simulado – sinal de bancada para rodar o nó sem sensores físicos.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use telemetry_core::source::SampleSource;
use telemetry_core::types::Channel;

/// Passeio aleatório limitado por canal.
pub struct SimulatedAdc {
    rng: StdRng,
    raw_max: u16,
    /// Último valor por canal (pressure, moisture, acoustic)
    levels: [u16; 3],
    /// Passo máximo por leitura
    step: u16,
}

impl SimulatedAdc {
    pub fn new(raw_max: u16, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mid = raw_max / 2;
        Self {
            rng,
            raw_max,
            levels: [mid, raw_max / 4, mid],
            step: (raw_max / 40).max(1),
        }
    }
}

fn index(channel: Channel) -> usize {
    match channel {
        Channel::Pressure => 0,
        Channel::Moisture => 1,
        Channel::Acoustic => 2,
    }
}

impl SampleSource for SimulatedAdc {
    fn read(&mut self, channel: Channel) -> u16 {
        let i = index(channel);
        let step = i32::from(self.step);
        let delta = self.rng.gen_range(-step..=step);
        let next = (i32::from(self.levels[i]) + delta).clamp(0, i32::from(self.raw_max));
        self.levels[i] = next as u16;
        self.levels[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_adc_range() {
        let mut adc = SimulatedAdc::new(4095, Some(1));
        for _ in 0..5_000 {
            for channel in Channel::ALL {
                assert!(adc.read(channel) <= 4095);
            }
        }
    }

    #[test]
    fn seeded_adc_is_reproducible() {
        let mut a = SimulatedAdc::new(4095, Some(9));
        let mut b = SimulatedAdc::new(4095, Some(9));
        for _ in 0..100 {
            assert_eq!(a.read(Channel::Acoustic), b.read(Channel::Acoustic));
        }
    }

    #[test]
    fn moves_at_most_one_step() {
        let mut adc = SimulatedAdc::new(4095, Some(3));
        let mut previous = adc.read(Channel::Pressure);
        for _ in 0..1_000 {
            let next = adc.read(Channel::Pressure);
            assert!(next.abs_diff(previous) <= 4095 / 40);
            previous = next;
        }
    }
}
