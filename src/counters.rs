// Incremented from both the RX and TX contexts, so every field is an
// AtomicU64 rather than guarded by a lock.

use std::sync::atomic::AtomicU64;

#[derive(Debug, Default)]
pub struct Counters {
    pub memory_errors: AtomicU64,
    pub length_errors: AtomicU64,
    pub checksum_errors: AtomicU64,
    pub protocol_errors: AtomicU64,
    pub interface_output_discards: AtomicU64,
    pub tx_bytes: AtomicU64,
    pub tx_packets: AtomicU64,
    pub rx_bytes: AtomicU64,
    pub rx_packets: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }
}
