//! Formato do pacote transmitido pelo rádio.
//!
//! Texto UTF-8 compatível com JSON, chaves em ordem fixa:
//!
//! ```text
//! {"id":12,"pressure":50.00,"moisture":25.00,"acoustic":81.30,"timestamp":65000}
//! ```
//!
//! - `id` e `timestamp` como inteiros decimais sem sinal
//! - grandezas físicas com exatamente duas casas decimais
//! - um pacote por frame, sem fragmentação

use crate::types::TelemetrySnapshot;
use serde::Deserialize;
use std::fmt::Write;

/// Tamanho máximo de um frame no rádio (FIFO do transceptor LoRa).
pub const MAX_PACKET_SIZE: usize = 255;

/// Erros de decodificação no lado do receptor.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Pacote vazio")]
    Empty,

    #[error("Pacote muito grande ({0} bytes, máximo {MAX_PACKET_SIZE})")]
    TooLarge(usize),

    #[error("Payload não é UTF-8 válido: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Payload malformado: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Payload pronto para transmissão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    text: String,
}

impl EncodedPacket {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Tamanho em bytes (reportado no log junto com o payload).
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Codifica um snapshot para transmissão. Nunca falha.
pub fn encode_snapshot(snapshot: &TelemetrySnapshot) -> EncodedPacket {
    let mut text = String::with_capacity(96);
    // write! em String não falha
    let _ = write!(
        text,
        "{{\"id\":{},\"pressure\":{:.2},\"moisture\":{:.2},\"acoustic\":{:.2},\"timestamp\":{}}}",
        snapshot.sequence(),
        snapshot.pressure(),
        snapshot.moisture(),
        snapshot.acoustic(),
        snapshot.timestamp_ms(),
    );
    debug_assert!(text.len() <= MAX_PACKET_SIZE);
    EncodedPacket { text }
}

/// Campos de um pacote recebido.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecodedPacket {
    pub id: u32,
    pub pressure: f32,
    pub moisture: f32,
    pub acoustic: f32,
    pub timestamp: u64,
}

impl DecodedPacket {
    /// Reconstrói o snapshot (para reavaliar alertas no receptor).
    pub fn to_snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::new(self.pressure, self.moisture, self.acoustic, self.timestamp, self.id)
    }
}

/// Decodifica bytes recebidos do rádio.
pub fn decode_packet(data: &[u8]) -> Result<DecodedPacket, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::Empty);
    }
    if data.len() > MAX_PACKET_SIZE {
        return Err(ProtocolError::TooLarge(data.len()));
    }

    let text = std::str::from_utf8(data)?;
    Ok(serde_json::from_str(text)?)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
