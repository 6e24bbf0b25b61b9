//! Transporte de rádio: um frame por pacote, sem ACK nem retransmissão.

use crate::error::RadioError;

/// Primitiva de envio do transceptor.
///
/// `close_frame` só retorna depois que o pacote saiu do rádio.
pub trait RadioTransport {
    fn open_frame(&mut self) -> Result<(), RadioError>;
    fn write(&mut self, payload: &[u8]) -> Result<(), RadioError>;
    fn close_frame(&mut self) -> Result<(), RadioError>;
}

impl<R: RadioTransport + ?Sized> RadioTransport for Box<R> {
    fn open_frame(&mut self) -> Result<(), RadioError> {
        (**self).open_frame()
    }

    fn write(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        (**self).write(payload)
    }

    fn close_frame(&mut self) -> Result<(), RadioError> {
        (**self).close_frame()
    }
}

/// Envia um payload completo em um único frame.
pub fn transmit<R: RadioTransport + ?Sized>(radio: &mut R, payload: &[u8]) -> Result<(), RadioError> {
    radio.open_frame()?;
    radio.write(payload)?;
    radio.close_frame()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CallLog {
        calls: Vec<String>,
        fail_write: bool,
    }

    impl RadioTransport for CallLog {
        fn open_frame(&mut self) -> Result<(), RadioError> {
            self.calls.push("open".into());
            Ok(())
        }

        fn write(&mut self, payload: &[u8]) -> Result<(), RadioError> {
            if self.fail_write {
                return Err(RadioError::FrameTooLarge { size: payload.len(), max: 0 });
            }
            self.calls.push(format!("write {}", payload.len()));
            Ok(())
        }

        fn close_frame(&mut self) -> Result<(), RadioError> {
            self.calls.push("close".into());
            Ok(())
        }
    }

    #[test]
    fn transmit_uses_begin_write_end() {
        let mut radio = CallLog::default();
        transmit(&mut radio, b"abc").unwrap();
        assert_eq!(radio.calls, vec!["open", "write 3", "close"]);
    }

    #[test]
    fn failed_write_skips_close() {
        let mut radio = CallLog {
            fail_write: true,
            ..Default::default()
        };
        assert!(transmit(&mut radio, b"abc").is_err());
        assert_eq!(radio.calls, vec!["open"]);
    }
}
