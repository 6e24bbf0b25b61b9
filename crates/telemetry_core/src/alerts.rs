//! Sistema de alertas – flags derivadas de thresholds fixos.

use crate::config::AlertThresholds;
use crate::types::TelemetrySnapshot;
use std::fmt;

/// Condição de alerta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertFlag {
    HighMoisture,
    HighAcoustic,
    AbnormalPressure,
}

impl AlertFlag {
    pub const ALL: [AlertFlag; 3] = [
        AlertFlag::HighMoisture,
        AlertFlag::HighAcoustic,
        AlertFlag::AbnormalPressure,
    ];

    fn bit(self) -> u8 {
        match self {
            AlertFlag::HighMoisture => 1 << 0,
            AlertFlag::HighAcoustic => 1 << 1,
            AlertFlag::AbnormalPressure => 1 << 2,
        }
    }

    /// Mensagem legível para o log.
    pub fn message(self) -> &'static str {
        match self {
            AlertFlag::HighMoisture => "High moisture detected",
            AlertFlag::HighAcoustic => "High acoustic level detected",
            AlertFlag::AbnormalPressure => "Abnormal pressure detected",
        }
    }
}

impl fmt::Display for AlertFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Conjunto de flags de um snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AlertSet(u8);

impl AlertSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, flag: AlertFlag) {
        self.0 |= flag.bit();
    }

    pub fn contains(&self, flag: AlertFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Itera as flags ativas em ordem fixa.
    pub fn iter(&self) -> impl Iterator<Item = AlertFlag> {
        let set = *self;
        AlertFlag::ALL.into_iter().filter(move |f| set.contains(*f))
    }
}

impl FromIterator<AlertFlag> for AlertSet {
    fn from_iter<I: IntoIterator<Item = AlertFlag>>(iter: I) -> Self {
        let mut set = AlertSet::empty();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

/// Avalia um snapshot contra os thresholds e retorna as flags ativas.
///
/// Função pura: mesmo snapshot, mesmo resultado.
pub fn evaluate_alerts(snapshot: &TelemetrySnapshot, thresholds: &AlertThresholds) -> AlertSet {
    let mut alerts = AlertSet::empty();

    if snapshot.moisture() > thresholds.moisture_high {
        alerts.insert(AlertFlag::HighMoisture);
    }
    if snapshot.acoustic() > thresholds.acoustic_high {
        alerts.insert(AlertFlag::HighAcoustic);
    }
    if snapshot.pressure() < thresholds.pressure_low || snapshot.pressure() > thresholds.pressure_high {
        alerts.insert(AlertFlag::AbnormalPressure);
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pressure: f32, moisture: f32, acoustic: f32) -> TelemetrySnapshot {
        TelemetrySnapshot::new(pressure, moisture, acoustic, 0, 0)
    }

    #[test]
    fn no_alerts_for_normal_values() {
        let alerts = evaluate_alerts(&snapshot(50.0, 25.0, 60.0), &AlertThresholds::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn low_pressure_and_wet() {
        let alerts = evaluate_alerts(&snapshot(15.0, 80.0, 60.0), &AlertThresholds::default());
        let expected: AlertSet = [AlertFlag::HighMoisture, AlertFlag::AbnormalPressure]
            .into_iter()
            .collect();
        assert_eq!(alerts, expected);
        assert_eq!(alerts.len(), 2);
        assert!(!alerts.contains(AlertFlag::HighAcoustic));
    }

    #[test]
    fn thresholds_are_strict() {
        let t = AlertThresholds::default();
        assert!(evaluate_alerts(&snapshot(20.0, 70.0, 75.0), &t).is_empty());
        assert!(evaluate_alerts(&snapshot(80.0, 70.0, 75.0), &t).is_empty());
        let alerts = evaluate_alerts(&snapshot(80.1, 70.1, 75.1), &t);
        assert_eq!(alerts.len(), 3);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let s = snapshot(85.0, 10.0, 90.0);
        let t = AlertThresholds::default();
        let first = evaluate_alerts(&s, &t);
        for _ in 0..10 {
            assert_eq!(evaluate_alerts(&s, &t), first);
        }
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            vec![AlertFlag::HighAcoustic, AlertFlag::AbnormalPressure]
        );
    }
}
