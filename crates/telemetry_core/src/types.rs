//! Tipos do nó de telemetria: canais analógicos e o snapshot de cada ciclo.

use std::fmt;

// ──────────────────────────────────────────────
// Canais
// ──────────────────────────────────────────────

/// Canal analógico amostrado pelo nó.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Pressure,
    Moisture,
    Acoustic,
}

impl Channel {
    /// Todos os canais, na ordem de amostragem.
    pub const ALL: [Channel; 3] = [Channel::Pressure, Channel::Moisture, Channel::Acoustic];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Pressure => "Pressure",
            Channel::Moisture => "Moisture",
            Channel::Acoustic => "Acoustic",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::Pressure => "PSI",
            Channel::Moisture => "%",
            Channel::Acoustic => "dB",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ──────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────

/// Leituras calibradas de um ciclo.
///
/// Criado uma vez por ciclo pelo scheduler e descartado após a transmissão.
/// Os campos são somente leitura depois de construído.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pressure: f32,
    moisture: f32,
    acoustic: f32,
    timestamp_ms: u64,
    sequence: u32,
}

impl TelemetrySnapshot {
    pub fn new(pressure: f32, moisture: f32, acoustic: f32, timestamp_ms: u64, sequence: u32) -> Self {
        Self {
            pressure,
            moisture,
            acoustic,
            timestamp_ms,
            sequence,
        }
    }

    /// Pressão (PSI, 0–100)
    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    /// Umidade (%, 0–100)
    pub fn moisture(&self) -> f32 {
        self.moisture
    }

    /// Nível acústico (dB, 30–100)
    pub fn acoustic(&self) -> f32 {
        self.acoustic
    }

    /// Milissegundos monotônicos desde o boot do nó.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Valor calibrado de um canal.
    pub fn value(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Pressure => self.pressure,
            Channel::Moisture => self.moisture,
            Channel::Acoustic => self.acoustic,
        }
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
