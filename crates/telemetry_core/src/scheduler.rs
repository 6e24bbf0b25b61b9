//! Scheduler de intervalo fixo com polling cooperativo.
//!
//! ```text
//! Idle ──(elapsed ≥ interval)──▶ Sampling ─▶ Evaluating ─▶ Transmitting ─▶ Idle
//! ```
//!
//! Sampling, Evaluating e Transmitting rodam em sequência dentro de um único
//! `poll()`. O último envio começa valendo o instante do boot, então a
//! primeira transmissão também espera um intervalo completo.

use crate::alerts::{AlertSet, evaluate_alerts};
use crate::calibration::{JitterSource, SensorCalibrator};
use crate::clock::Clock;
use crate::config::AlertThresholds;
use crate::error::RadioError;
use crate::protocol::{EncodedPacket, encode_snapshot};
use crate::radio::{RadioTransport, transmit};
use crate::source::SampleSource;
use crate::types::{Channel, TelemetrySnapshot};
use std::time::Duration;
use tracing::{error, info, warn};

/// Intervalo padrão entre transmissões (ms).
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Pausa padrão quando ocioso (ms).
pub const DEFAULT_IDLE_PAUSE_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Sampling,
    Evaluating,
    Transmitting,
}

/// Estado que sobrevive entre ciclos. Só o scheduler altera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCounters {
    /// Id do próximo pacote
    pub sequence: u32,
    /// Conclusão do último envio (ms desde o boot)
    pub last_transmission_ms: u64,
}

/// Temporização do scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTiming {
    pub interval_ms: u64,
    pub idle_pause: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            idle_pause: Duration::from_millis(DEFAULT_IDLE_PAUSE_MS),
        }
    }
}

/// Resultado de um ciclo completo.
#[derive(Debug)]
pub struct CycleReport {
    pub snapshot: TelemetrySnapshot,
    pub packet: EncodedPacket,
    pub alerts: AlertSet,
    /// Resultado do envio (at-most-once, sem retry)
    pub delivery: Result<(), RadioError>,
}

impl CycleReport {
    pub fn delivered(&self) -> bool {
        self.delivery.is_ok()
    }
}

/// Amarra fonte, calibrador, avaliador, encoder e rádio num laço de intervalo fixo.
pub struct TelemetryScheduler<S, J, R, C> {
    source: S,
    calibrator: SensorCalibrator<J>,
    radio: R,
    clock: C,
    thresholds: AlertThresholds,
    timing: SchedulerTiming,
    state: SchedulerState,
    counters: NodeCounters,
}

impl<S, J, R, C> TelemetryScheduler<S, J, R, C>
where
    S: SampleSource,
    J: JitterSource,
    R: RadioTransport,
    C: Clock,
{
    pub fn new(
        source: S,
        calibrator: SensorCalibrator<J>,
        radio: R,
        clock: C,
        thresholds: AlertThresholds,
        timing: SchedulerTiming,
    ) -> Self {
        let boot_ms = clock.now_ms();
        Self {
            source,
            calibrator,
            radio,
            clock,
            thresholds,
            timing,
            state: SchedulerState::Idle,
            counters: NodeCounters {
                sequence: 0,
                last_transmission_ms: boot_ms,
            },
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn counters(&self) -> NodeCounters {
        self.counters
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Uma passada do laço. Retorna `Some` se um ciclo foi executado.
    pub fn poll(&mut self) -> Option<CycleReport> {
        let now = self.clock.now_ms();
        let elapsed = now.wrapping_sub(self.counters.last_transmission_ms);
        if elapsed < self.timing.interval_ms {
            self.state = SchedulerState::Idle;
            return None;
        }

        Some(self.run_cycle(now))
    }

    /// Laço principal do nó. Não retorna.
    pub fn run_forever(&mut self) -> ! {
        loop {
            if self.poll().is_none() {
                std::thread::sleep(self.timing.idle_pause);
            }
        }
    }

    fn run_cycle(&mut self, now: u64) -> CycleReport {
        // ── Sampling ──
        self.state = SchedulerState::Sampling;
        let [pressure, moisture, acoustic] = Channel::ALL.map(|channel| {
            let raw = self.source.read(channel);
            self.calibrator.calibrate(channel, raw)
        });
        let snapshot =
            TelemetrySnapshot::new(pressure, moisture, acoustic, now, self.counters.sequence);

        // ── Evaluating ──
        self.state = SchedulerState::Evaluating;
        let alerts = evaluate_alerts(&snapshot, &self.thresholds);

        // ── Transmitting ──
        self.state = SchedulerState::Transmitting;
        let packet = encode_snapshot(&snapshot);
        let delivery = transmit(&mut self.radio, packet.as_bytes());

        let report = CycleReport {
            snapshot,
            packet,
            alerts,
            delivery,
        };
        log_cycle(&report);

        self.counters.sequence = self.counters.sequence.wrapping_add(1);
        self.counters.last_transmission_ms = self.clock.now_ms();
        self.state = SchedulerState::Idle;

        report
    }
}

/// Saída de diagnóstico de um pacote.
fn log_cycle(report: &CycleReport) {
    let s = &report.snapshot;
    match &report.delivery {
        Ok(()) => info!("=== Pacote #{} transmitido ===", s.sequence()),
        Err(e) => error!("Pacote #{} não transmitido: {e}", s.sequence()),
    }
    for channel in Channel::ALL {
        info!("{}: {:.2} {}", channel.label(), s.value(channel), channel.unit());
    }
    info!("Payload: {}", report.packet.as_str());
    info!("Payload Size: {} bytes", report.packet.len());
    for flag in report.alerts.iter() {
        warn!("ALERTA: {flag}!");
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertFlag;
    use crate::calibration::{DEFAULT_RAW_MAX, NoJitter};
    use crate::clock::ManualClock;
    use crate::protocol::decode_packet;
    use crate::source::FixedSource;
    use approx::assert_abs_diff_eq;

    /// Rádio que grava cada frame fechado.
    #[derive(Default)]
    struct RecordingRadio {
        current: Option<Vec<u8>>,
        sent: Vec<Vec<u8>>,
        fail_close: bool,
    }

    impl RadioTransport for RecordingRadio {
        fn open_frame(&mut self) -> Result<(), RadioError> {
            self.current = Some(Vec::new());
            Ok(())
        }

        fn write(&mut self, payload: &[u8]) -> Result<(), RadioError> {
            self.current
                .as_mut()
                .ok_or(RadioError::FrameNotOpen)?
                .extend_from_slice(payload);
            Ok(())
        }

        fn close_frame(&mut self) -> Result<(), RadioError> {
            let frame = self.current.take().ok_or(RadioError::FrameNotOpen)?;
            if self.fail_close {
                return Err(RadioError::Io(std::io::Error::other("tx timeout")));
            }
            self.sent.push(frame);
            Ok(())
        }
    }

    type TestScheduler = TelemetryScheduler<FixedSource, NoJitter, RecordingRadio, ManualClock>;

    fn scheduler(clock: &ManualClock, raw: [u16; 3]) -> TestScheduler {
        TelemetryScheduler::new(
            FixedSource::from(raw),
            SensorCalibrator::new(DEFAULT_RAW_MAX, NoJitter),
            RecordingRadio::default(),
            clock.clone(),
            AlertThresholds::default(),
            SchedulerTiming::default(),
        )
    }

    #[test]
    fn first_transmission_waits_full_interval() {
        let clock = ManualClock::new(0);
        let mut node = scheduler(&clock, [2048, 1024, 3000]);

        assert!(node.poll().is_none());
        clock.set(DEFAULT_INTERVAL_MS - 1);
        assert!(node.poll().is_none());
        assert_eq!(node.state(), SchedulerState::Idle);
        assert!(node.radio().sent.is_empty());

        clock.set(DEFAULT_INTERVAL_MS);
        let report = node.poll().expect("ciclo deveria disparar no intervalo");
        assert_eq!(report.snapshot.timestamp_ms(), DEFAULT_INTERVAL_MS);
        assert_eq!(node.radio().sent.len(), 1);
        assert_eq!(node.state(), SchedulerState::Idle);
    }

    #[test]
    fn boot_time_is_the_reference() {
        let clock = ManualClock::new(1_000);
        let mut node = scheduler(&clock, [0, 0, 0]);
        clock.set(1_000 + DEFAULT_INTERVAL_MS - 1);
        assert!(node.poll().is_none());
        clock.advance(1);
        assert!(node.poll().is_some());
    }

    #[test]
    fn interval_is_measured_from_last_completion() {
        let clock = ManualClock::new(0);
        let mut node = scheduler(&clock, [0, 0, 0]);
        clock.set(7_500);
        assert!(node.poll().is_some());
        assert_eq!(node.counters().last_transmission_ms, 7_500);

        clock.set(7_500 + DEFAULT_INTERVAL_MS - 1);
        assert!(node.poll().is_none());
        clock.set(7_500 + DEFAULT_INTERVAL_MS);
        assert!(node.poll().is_some());
    }

    #[test]
    fn sequence_increments_without_gaps() {
        let clock = ManualClock::new(0);
        let mut node = scheduler(&clock, [2048, 1024, 3000]);

        let mut ids = Vec::new();
        for _ in 0..12 {
            clock.advance(DEFAULT_INTERVAL_MS - 1);
            assert!(node.poll().is_none());
            clock.advance(1);
            let report = node.poll().unwrap();
            ids.push(report.snapshot.sequence());
        }

        assert_eq!(ids, (0..12).collect::<Vec<u32>>());
        let sent_ids: Vec<u32> = node
            .radio()
            .sent
            .iter()
            .map(|frame| decode_packet(frame).unwrap().id)
            .collect();
        assert_eq!(sent_ids, ids);
    }

    #[test]
    fn sequence_wraps_around() {
        let clock = ManualClock::new(0);
        let mut node = scheduler(&clock, [0, 0, 0]);
        node.counters.sequence = u32::MAX;

        clock.advance(DEFAULT_INTERVAL_MS);
        assert_eq!(node.poll().unwrap().snapshot.sequence(), u32::MAX);
        clock.advance(DEFAULT_INTERVAL_MS);
        assert_eq!(node.poll().unwrap().snapshot.sequence(), 0);
    }

    #[test]
    fn failed_send_still_advances() {
        let clock = ManualClock::new(0);
        let mut node = scheduler(&clock, [2048, 1024, 3000]);
        node.radio.fail_close = true;

        clock.set(DEFAULT_INTERVAL_MS);
        let report = node.poll().unwrap();
        assert!(!report.delivered());
        assert_eq!(node.counters().sequence, 1);
        assert_eq!(node.counters().last_transmission_ms, DEFAULT_INTERVAL_MS);

        // Sem retry dentro do mesmo intervalo
        assert!(node.poll().is_none());

        node.radio.fail_close = false;
        clock.advance(DEFAULT_INTERVAL_MS);
        let report = node.poll().unwrap();
        assert!(report.delivered());
        assert_eq!(report.snapshot.sequence(), 1);
        assert_eq!(node.radio().sent.len(), 1);
    }

    #[test]
    fn end_to_end_reference_readings() {
        let clock = ManualClock::new(0);
        let mut node = scheduler(&clock, [2048, 1024, 3000]);
        clock.set(DEFAULT_INTERVAL_MS);
        let report = node.poll().unwrap();

        assert_abs_diff_eq!(report.snapshot.pressure(), 50.0, epsilon = 0.005);
        assert_abs_diff_eq!(report.snapshot.moisture(), 25.0, epsilon = 0.005);
        assert_abs_diff_eq!(report.snapshot.acoustic(), 81.3, epsilon = 0.005);
        assert!(report.alerts.is_empty());
        assert_eq!(
            report.packet.as_str(),
            r#"{"id":0,"pressure":50.00,"moisture":25.00,"acoustic":81.30,"timestamp":5000}"#
        );
        assert_eq!(node.radio().sent[0], report.packet.as_bytes());
    }

    #[test]
    fn alerts_are_reported_per_cycle() {
        let clock = ManualClock::new(0);
        // 15 PSI, 80 %, 60 dB
        let mut node = scheduler(&clock, [614, 3276, 1755]);
        clock.set(DEFAULT_INTERVAL_MS);
        let report = node.poll().unwrap();

        assert!(report.alerts.contains(AlertFlag::HighMoisture));
        assert!(report.alerts.contains(AlertFlag::AbnormalPressure));
        assert!(!report.alerts.contains(AlertFlag::HighAcoustic));
    }

    #[test]
    fn custom_interval() {
        let clock = ManualClock::new(0);
        let mut node = TelemetryScheduler::new(
            FixedSource::new(0, 0, 0),
            SensorCalibrator::new(DEFAULT_RAW_MAX, NoJitter),
            RecordingRadio::default(),
            clock.clone(),
            AlertThresholds::default(),
            SchedulerTiming {
                interval_ms: 250,
                idle_pause: Duration::from_millis(1),
            },
        );
        clock.set(249);
        assert!(node.poll().is_none());
        clock.set(250);
        assert!(node.poll().is_some());
    }
}
