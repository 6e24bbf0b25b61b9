//! Calibração: amostra bruta do ADC → unidade física limitada.
//!
//! Uma única operação parametrizada por canal:
//!
//! ```text
//! raw ─▶ clamp(raw, RAW_MAX) ─▶ lo + raw/RAW_MAX·(hi−lo) ─▶ round(0.1) ─▶ + jitter ─▶ clamp(lo, hi)
//! ```
//!
//! A ordem importa: arredonda primeiro, depois jitter, depois clamp.

use crate::types::Channel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Resolução padrão do ADC de 12 bits.
pub const DEFAULT_RAW_MAX: u16 = 4095;

/// Faixa física e amplitude de jitter de um canal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCalibration {
    pub lo: f32,
    pub hi: f32,
    /// Jitter uniforme em `[-jitter, +jitter)`
    pub jitter: f32,
}

const PRESSURE: ChannelCalibration = ChannelCalibration { lo: 0.0, hi: 100.0, jitter: 0.5 };
const MOISTURE: ChannelCalibration = ChannelCalibration { lo: 0.0, hi: 100.0, jitter: 0.3 };
const ACOUSTIC: ChannelCalibration = ChannelCalibration { lo: 30.0, hi: 100.0, jitter: 0.2 };

impl ChannelCalibration {
    /// Tabela fixa por canal.
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Pressure => PRESSURE,
            Channel::Moisture => MOISTURE,
            Channel::Acoustic => ACOUSTIC,
        }
    }
}

// ──────────────────────────────────────────────
// Jitter
// ──────────────────────────────────────────────

/// Fonte de jitter injetada no calibrador.
pub trait JitterSource {
    /// Retorna um valor em `[-amplitude, +amplitude)`.
    fn sample(&mut self, amplitude: f32) -> f32;
}

impl<J: JitterSource + ?Sized> JitterSource for Box<J> {
    fn sample(&mut self, amplitude: f32) -> f32 {
        (**self).sample(amplitude)
    }
}

/// Sem jitter: saída puramente determinística.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&mut self, _amplitude: f32) -> f32 {
        0.0
    }
}

/// Jitter pseudo-aleatório reprodutível (mesma seed → mesma sequência).
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed a partir da entropia do sistema.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl JitterSource for SeededJitter {
    fn sample(&mut self, amplitude: f32) -> f32 {
        if amplitude <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-amplitude..amplitude)
    }
}

// ──────────────────────────────────────────────
// Calibrador
// ──────────────────────────────────────────────

/// Reescala afim arredondada a uma casa decimal, sem jitter nem clamp final.
///
/// Monotônica em `raw`. Valores acima de `raw_max` são tratados como `raw_max`.
pub fn rescale(raw: u16, raw_max: u16, cal: &ChannelCalibration) -> f32 {
    let raw_max = raw_max.max(1);
    let raw = raw.min(raw_max);
    let ratio = f32::from(raw) / f32::from(raw_max);
    let value = cal.lo + ratio * (cal.hi - cal.lo);
    (value * 10.0).round() / 10.0
}

/// Converte amostras brutas em valores físicos por canal.
#[derive(Debug, Clone)]
pub struct SensorCalibrator<J> {
    raw_max: u16,
    jitter: J,
}

impl<J: JitterSource> SensorCalibrator<J> {
    pub fn new(raw_max: u16, jitter: J) -> Self {
        Self { raw_max, jitter }
    }

    pub fn raw_max(&self) -> u16 {
        self.raw_max
    }

    /// Calibra uma amostra bruta para o canal indicado.
    pub fn calibrate(&mut self, channel: Channel, raw: u16) -> f32 {
        let cal = ChannelCalibration::for_channel(channel);
        let value = rescale(raw, self.raw_max, &cal) + self.jitter.sample(cal.jitter);
        value.clamp(cal.lo, cal.hi)
    }
}
