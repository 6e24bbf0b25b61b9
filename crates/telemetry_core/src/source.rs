//! Fontes de amostras brutas (ADC).

use crate::types::Channel;

/// Leitura analógica bruta de um canal, em `[0, RAW_MAX]`.
///
/// Infalível: uma fonte real com falha de sensor deve saturar ou repetir a
/// última leitura válida em vez de retornar 0.
pub trait SampleSource {
    fn read(&mut self, channel: Channel) -> u16;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self, channel: Channel) -> u16 {
        (**self).read(channel)
    }
}

/// Fonte com valores constantes por canal (bancada ou testes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSource {
    pub pressure: u16,
    pub moisture: u16,
    pub acoustic: u16,
}

impl FixedSource {
    pub fn new(pressure: u16, moisture: u16, acoustic: u16) -> Self {
        Self {
            pressure,
            moisture,
            acoustic,
        }
    }
}

impl From<[u16; 3]> for FixedSource {
    fn from(raw: [u16; 3]) -> Self {
        Self::new(raw[0], raw[1], raw[2])
    }
}

impl SampleSource for FixedSource {
    fn read(&mut self, channel: Channel) -> u16 {
        match channel {
            Channel::Pressure => self.pressure,
            Channel::Moisture => self.moisture,
            Channel::Acoustic => self.acoustic,
        }
    }
}
