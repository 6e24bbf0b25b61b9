//! Thread de rede que escuta o enlace e envia pacotes decodificados via channel.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::net::UdpSocket;
use telemetry_core::protocol::{DecodedPacket, decode_packet};
use tracing::{debug, error, info, warn};

/// Mensagem enviada da thread de rede para o laço principal.
#[derive(Debug, Clone)]
pub struct NetMessage {
    pub packet: DecodedPacket,
    pub raw: String,
    pub source_addr: String,
    pub raw_size: usize,
}

/// Inicia a thread de rede. Retorna o receiver do channel.
pub fn spawn_receiver_thread(port: u16, sender_ip_filter: String) -> Receiver<NetMessage> {
    let (tx, rx) = bounded::<NetMessage>(64); // Buffer de 64 mensagens

    std::thread::Builder::new()
        .name("link-receiver".into())
        .spawn(move || {
            receiver_loop(&tx, port, &sender_ip_filter);
        })
        .expect("Falha ao criar thread de rede");

    rx
}

fn receiver_loop(tx: &Sender<NetMessage>, port: u16, sender_ip_filter: &str) {
    loop {
        match UdpSocket::bind(format!("0.0.0.0:{port}")) {
            Ok(sock) => {
                sock.set_read_timeout(Some(std::time::Duration::from_secs(1)))
                    .ok();

                let mode = if sender_ip_filter.is_empty() {
                    "qualquer origem"
                } else {
                    sender_ip_filter
                };
                info!("Receiver escutando em 0.0.0.0:{port} – Aceitando: {mode}");

                let mut buf = [0u8; 1024];
                loop {
                    match sock.recv_from(&mut buf) {
                        Ok((size, addr)) => {
                            let source = addr.ip().to_string();

                            // Filtro de IP se configurado
                            if !sender_ip_filter.is_empty() && source != sender_ip_filter {
                                debug!("Ignorando pacote de {source} (esperado: {sender_ip_filter})");
                                continue;
                            }

                            if let Some(msg) = to_message(&buf[..size], source) {
                                if tx.send(msg).is_err() {
                                    // Laço principal encerrou
                                    return;
                                }
                            }
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut
                            || e.kind() == std::io::ErrorKind::WouldBlock =>
                        {
                            // Timeout normal, continua
                        }
                        Err(e) => {
                            warn!("Erro ao receber UDP: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                error!("Falha ao bind porta {port}: {e}. Tentando novamente em 2s...");
                std::thread::sleep(std::time::Duration::from_secs(2));
            }
        }
    }
}

/// Decodifica um datagrama; pacotes inválidos são só logados.
fn to_message(data: &[u8], source_addr: String) -> Option<NetMessage> {
    match decode_packet(data) {
        Ok(packet) => Some(NetMessage {
            packet,
            raw: String::from_utf8_lossy(data).into_owned(),
            source_addr,
            raw_size: data.len(),
        }),
        Err(e) => {
            warn!("Pacote inválido de {source_addr}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_datagram_becomes_message() {
        let data = br#"{"id":4,"pressure":50.00,"moisture":25.00,"acoustic":81.30,"timestamp":25000}"#;
        let msg = to_message(data, "10.0.0.7".into()).unwrap();
        assert_eq!(msg.packet.id, 4);
        assert_eq!(msg.raw_size, data.len());
        assert_eq!(msg.source_addr, "10.0.0.7");
    }

    #[test]
    fn garbage_is_dropped() {
        assert!(to_message(b"not json", "10.0.0.7".into()).is_none());
    }
}
