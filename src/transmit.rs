use crate::chain::BufferChain;
use crate::counters::Counters;
use crate::EncodeError;

// Deliberately the raw, possibly-partial write contract rather than
// write_all: a short write must be observable so the transmit sink can
// resync the remote decoder.
pub trait SerialPort {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize>;
}

#[derive(Debug, Default)]
pub struct MockSerialPort {
    pub written: Vec<u8>,
    pub short_write_limit: Option<usize>,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after(mut self, limit: usize) -> Self {
        self.short_write_limit = Some(limit);
        self
    }
}

impl SerialPort for MockSerialPort {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        match self.short_write_limit {
            Some(limit) => {
                let n = limit.min(bytes.len());
                self.written.extend_from_slice(&bytes[..n]);
                Ok(n)
            }
            None => {
                self.written.extend_from_slice(bytes);
                Ok(bytes.len())
            }
        }
    }
}

// On a short write or I/O error the chain is dropped and the caller gets
// Err so it forces a leading flag on the next frame.
pub fn transmit(
    port: &mut dyn SerialPort,
    chain: BufferChain,
    counters: &Counters,
) -> Result<(), EncodeError> {
    let bytes = chain.into_bytes();
    match port.write(&bytes) {
        Ok(n) if n == bytes.len() => {
            counters.tx_bytes.fetch_add(n as u64, std::sync::atomic::Ordering::Relaxed);
            counters.tx_packets.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ok(())
        }
        Ok(_) => {
            counters.interface_output_discards.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            log::warn!("short write to serial port, dropping frame and forcing resync");
            Err(EncodeError::ShortWrite)
        }
        Err(e) => {
            counters.interface_output_discards.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            log::warn!("serial write failed: {e}");
            Err(EncodeError::ShortWrite)
        }
    }
}
