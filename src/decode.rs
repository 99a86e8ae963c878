// Seven-state HDLC-async receive machine. Dispatch to the upper PPP layer
// and counter bookkeeping happen one layer up, in crate::link.

use crate::accm::Accm;
use crate::chain::BufferChain;
use crate::escape::{ESC, ESC_XOR, FLAG};
use crate::fcs::{self, FCS_GOOD, FCS_INIT};
use crate::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    Idle,
    Start,
    Address,
    Control,
    Protocol1,
    Protocol2,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    Dispatched { protocol: u16, payload: Vec<u8> },
    LengthError,
    ChecksumError,
    Allocation,
}

pub struct ReceiveState {
    state: RxState,
    escaped: bool,
    fcs: u16,
    protocol: u16,
    chain: BufferChain,
    chain_limit: Option<usize>,
}

impl ReceiveState {
    pub fn new() -> Self {
        Self {
            state: RxState::Idle,
            escaped: false,
            fcs: FCS_INIT,
            protocol: 0,
            chain: BufferChain::new(),
            chain_limit: None,
        }
    }

    // Bounds how large one in-progress frame's chain may grow, so a fuzzed
    // peer can't force unbounded growth before a flag or FCS failure is seen.
    pub fn with_chain_limit(limit: usize) -> Self {
        Self {
            chain_limit: Some(limit),
            chain: BufferChain::with_limit(limit),
            ..Self::new()
        }
    }

    pub fn reset(&mut self) {
        self.state = RxState::Idle;
        self.escaped = false;
        self.fcs = FCS_INIT;
        self.protocol = 0;
        self.chain = self.fresh_chain();
    }

    fn fresh_chain(&self) -> BufferChain {
        match self.chain_limit {
            Some(limit) => BufferChain::with_limit(limit),
            None => BufferChain::new(),
        }
    }

    pub fn input(&mut self, bytes: &[u8], in_accm: &Accm) -> Vec<FrameEvent> {
        let mut events = Vec::new();
        for &raw in bytes {
            if in_accm.escape_p(raw) {
                if raw == ESC {
                    self.escaped = true;
                } else if raw == FLAG {
                    if let Some(event) = self.handle_flag() {
                        events.push(event);
                    }
                } else {
                    log::trace!("discarding spurious control octet 0x{raw:02x}");
                }
            } else if let Some(event) = self.step_branch_b(raw) {
                events.push(event);
            }
        }
        events
    }

    fn handle_flag(&mut self) -> Option<FrameEvent> {
        let outcome = match self.state {
            RxState::Idle | RxState::Start | RxState::Address => return None,
            RxState::Control | RxState::Protocol1 | RxState::Protocol2 => Err(DecodeError::Length),
            RxState::Data if self.fcs != FCS_GOOD => Err(DecodeError::Checksum),
            RxState::Data => {
                self.chain.trim_trailing(2);
                let protocol = self.protocol;
                let mut bytes = std::mem::replace(&mut self.chain, self.fresh_chain()).into_bytes();
                let payload = if bytes.len() >= 2 { bytes.split_off(2) } else { Vec::new() };
                Ok(FrameEvent::Dispatched { protocol, payload })
            }
        };
        self.reset_for_next_frame();
        Some(match outcome {
            Ok(event) => event,
            Err(DecodeError::Length) => FrameEvent::LengthError,
            Err(DecodeError::Checksum) => FrameEvent::ChecksumError,
            Err(DecodeError::Allocation) => FrameEvent::Allocation,
        })
    }

    fn reset_for_next_frame(&mut self) {
        self.state = RxState::Address;
        self.fcs = FCS_INIT;
        self.escaped = false;
        self.protocol = 0;
        self.chain = self.fresh_chain();
    }

    fn append_data_byte(&mut self, c: u8) -> Result<(), DecodeError> {
        if self.chain.segment_count() == 0 {
            self.chain
                .write_protocol_prefix(self.protocol)
                .map_err(|_| DecodeError::Allocation)?;
        }
        self.chain.push_data(c).map_err(|_| DecodeError::Allocation)
    }

    fn step_branch_b(&mut self, raw: u8) -> Option<FrameEvent> {
        let mut c = raw;
        if self.escaped {
            self.escaped = false;
            c ^= ESC_XOR;
        }
        if self.state == RxState::Idle && c != 0xFF {
            return None;
        }
        // A missing address/control byte falls through to the next state on
        // the same octet instead of consuming a separate one.
        loop {
            match self.state {
                RxState::Idle => {
                    self.state = RxState::Start;
                }
                RxState::Start => {
                    self.fcs = FCS_INIT;
                    self.state = RxState::Address;
                }
                RxState::Address => {
                    self.state = RxState::Control;
                    if c == 0xFF {
                        break;
                    }
                    continue;
                }
                RxState::Control => {
                    self.state = RxState::Protocol1;
                    if c == 0x03 {
                        break;
                    }
                    continue;
                }
                RxState::Protocol1 => {
                    if c & 1 != 0 {
                        self.protocol = c as u16;
                        self.state = RxState::Data;
                    } else {
                        self.protocol = (c as u16) << 8;
                        self.state = RxState::Protocol2;
                    }
                    break;
                }
                RxState::Protocol2 => {
                    self.protocol |= c as u16;
                    self.state = RxState::Data;
                    break;
                }
                RxState::Data => {
                    if let Err(DecodeError::Allocation) = self.append_data_byte(c) {
                        self.reset_for_next_frame();
                        return Some(FrameEvent::Allocation);
                    }
                    break;
                }
            }
        }
        self.fcs = fcs::fcs_step(self.fcs, c);
        None
    }
}

impl Default for ReceiveState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_frame;

    fn decode_all(bytes: &[u8]) -> Vec<FrameEvent> {
        let mut rx = ReceiveState::new();
        rx.input(bytes, &Accm::default_escaping())
    }

    #[test]
    fn round_trips_an_encoded_frame() {
        let accm = Accm::default_escaping();
        let chain = encode_frame(&[0x01, 0x02, 0x03], 0x0021, false, false, true, &accm).unwrap();
        let wire = chain.into_bytes();
        let events = decode_all(&wire);
        assert_eq!(
            events,
            vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0x01, 0x02, 0x03] }]
        );
    }

    #[test]
    fn acfc_frame_is_still_decoded() {
        let accm = Accm::default_escaping();
        let chain = encode_frame(&[], 0x0021, true, false, true, &accm).unwrap();
        let wire = chain.into_bytes();
        let events = decode_all(&wire);
        assert_eq!(events, vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![] }]);
    }

    #[test]
    fn pfc_frame_is_still_decoded_with_full_protocol() {
        let accm = Accm::default_escaping();
        let chain = encode_frame(&[], 0x0021, true, true, true, &accm).unwrap();
        let wire = chain.into_bytes();
        let events = decode_all(&wire);
        assert_eq!(events, vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![] }]);
    }

    #[test]
    fn extra_flags_between_frames_are_ignored() {
        let accm = Accm::default_escaping();
        let chain = encode_frame(&[0xAA], 0x0021, false, false, true, &accm).unwrap();
        let mut wire = chain.into_bytes();
        // Splice extra idle flags right after the opening flag.
        wire.insert(1, FLAG);
        wire.insert(1, FLAG);
        let events = decode_all(&wire);
        assert_eq!(
            events,
            vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0xAA] }]
        );
    }

    #[test]
    fn bad_fcs_is_rejected_and_counted() {
        let wire = [
            FLAG, 0xFF, 0x03, 0x00, 0x21, 0xAA, 0xBB, 0xCC, 0xDE, 0xAD, FLAG,
        ];
        let events = decode_all(&wire);
        assert_eq!(events, vec![FrameEvent::ChecksumError]);
    }

    #[test]
    fn chunking_is_transparent() {
        let accm = Accm::default_escaping();
        let chain = encode_frame(&[1, 2, 3, 4, 5], 0xC021, false, false, true, &accm).unwrap();
        let wire = chain.into_bytes();

        let whole = decode_all(&wire);

        let mut rx = ReceiveState::new();
        let mut chunked = Vec::new();
        for byte in &wire {
            chunked.extend(rx.input(std::slice::from_ref(byte), &accm));
        }
        assert_eq!(whole, chunked);
    }

    #[test]
    fn truncated_frame_missing_protocol_is_a_length_error() {
        let wire = [FLAG, 0xFF, 0x03, FLAG];
        let events = decode_all(&wire);
        assert_eq!(events, vec![FrameEvent::LengthError]);
    }

    #[test]
    fn escaped_payload_bytes_round_trip() {
        let accm = Accm::default_escaping();
        let chain = encode_frame(&[0x7E, 0x7D, 0x7F], 0x0021, false, false, true, &accm).unwrap();
        let wire = chain.into_bytes();
        let events = decode_all(&wire);
        assert_eq!(
            events,
            vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0x7E, 0x7D, 0x7F] }]
        );
    }
}
