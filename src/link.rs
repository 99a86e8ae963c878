// `LinkContext`: the per-session composition root tying the decoder,
// encoder, transmit sink, ACCMs, VJ codec, and dispatcher together into one
// public API.

use std::sync::atomic::Ordering;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::accm::Accm;
use crate::counters::Counters;
use crate::decode::{FrameEvent, ReceiveState};
use crate::dispatch::{DispatchEvent, LinkCommand, LinkId, MagicRandomSource, NoopRandomSource, UpperDispatcher};
use crate::encode::encode_frame_with_limit;
use crate::transmit::{transmit, SerialPort};
use crate::vj::{VjCodec, PPP_IP, PPP_VJC_COMP, PPP_VJC_UNCOMP};
use crate::{EncodeError, EncodeResult, VjError, VjResult};

// Named after the conventional PPP_MAXIDLEFLAG tick count; expressed here
// as wall-clock time since there is no shared coarse timer service.
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_millis(1000);

pub struct LinkContext {
    link_id: LinkId,
    serial: Box<dyn SerialPort + Send>,
    dispatcher: Box<dyn UpperDispatcher>,
    vj: Box<dyn VjCodec + Send>,
    random: Box<dyn MagicRandomSource>,
    rx: ReceiveState,
    in_accm: RwLock<Accm>,
    out_accm: RwLock<Accm>,
    accomp: bool,
    pcomp: bool,
    vj_enabled: bool,
    last_xmit: Option<Instant>,
    max_idle: Duration,
    out_chain_limit: Option<usize>,
    counters: Counters,
}

impl LinkContext {
    pub fn new(
        link_id: LinkId,
        serial: Box<dyn SerialPort + Send>,
        dispatcher: Box<dyn UpperDispatcher>,
        vj: Box<dyn VjCodec + Send>,
    ) -> Self {
        Self::with_random_source(link_id, serial, dispatcher, vj, Box::new(NoopRandomSource))
    }

    pub fn with_random_source(
        link_id: LinkId,
        serial: Box<dyn SerialPort + Send>,
        dispatcher: Box<dyn UpperDispatcher>,
        vj: Box<dyn VjCodec + Send>,
        random: Box<dyn MagicRandomSource>,
    ) -> Self {
        Self {
            link_id,
            serial,
            dispatcher,
            vj,
            random,
            rx: ReceiveState::new(),
            in_accm: RwLock::new(Accm::default_escaping()),
            out_accm: RwLock::new(Accm::default_escaping()),
            accomp: false,
            pcomp: false,
            vj_enabled: false,
            last_xmit: None,
            max_idle: DEFAULT_MAX_IDLE,
            out_chain_limit: None,
            counters: Counters::new(),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn set_compression(&mut self, accomp: bool, pcomp: bool) {
        self.accomp = accomp;
        self.pcomp = pcomp;
    }

    // Mostly useful for tests that don't want to wait out the default idle
    // threshold before a leading flag is re-emitted.
    pub fn set_max_idle(&mut self, max_idle: Duration) {
        self.max_idle = max_idle;
    }

    pub fn set_out_chain_limit(&mut self, limit: Option<usize>) {
        self.out_chain_limit = limit;
    }

    pub fn connect(&mut self) {
        self.rx.reset();
        *self.in_accm.write().unwrap() = Accm::default_escaping();
        *self.out_accm.write().unwrap() = Accm::default_escaping();
        self.vj.configure(false, false, 0);
        self.vj_enabled = false;
        self.last_xmit = None;
        log::debug!("link {:?} connected", self.link_id);
        self.dispatcher.dispatch(self.link_id, DispatchEvent::Command(LinkCommand::Connect));
    }

    // Notifies the upper layer only. The receive chain is left alone — the
    // RX context may still be mid-call.
    pub fn disconnect(&mut self) {
        log::debug!("link {:?} disconnected", self.link_id);
        self.dispatcher.dispatch(self.link_id, DispatchEvent::Command(LinkCommand::Disconnect));
    }

    pub fn input(&mut self, bytes: &[u8]) {
        let in_accm = self.in_accm.read().unwrap().clone();
        let events = self.rx.input(bytes, &in_accm);
        for event in events {
            match event {
                FrameEvent::Dispatched { protocol, payload } => {
                    self.counters.rx_packets.fetch_add(1, Ordering::Relaxed);
                    self.counters
                        .rx_bytes
                        .fetch_add(payload.len() as u64, Ordering::Relaxed);
                    self.route_inbound(protocol, payload);
                }
                FrameEvent::LengthError => {
                    self.counters.length_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("link {:?}: dropping frame, flag seen before data", self.link_id);
                }
                FrameEvent::ChecksumError => {
                    self.counters.checksum_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("link {:?}: dropping frame, FCS mismatch", self.link_id);
                }
                FrameEvent::Allocation => {
                    self.counters.memory_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("link {:?}: dropping frame, receive chain limit exceeded", self.link_id);
                }
            }
        }
        // Fires unconditionally, even if no frame completed.
        self.random.mix(bytes.len() as u64);
    }

    fn route_inbound(&mut self, protocol: u16, payload: Vec<u8>) {
        match protocol {
            PPP_VJC_COMP => {
                if self.vjc_comp(&payload).is_err() {
                    self.counters.protocol_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("link {:?}: dropping malformed VJ-compressed frame", self.link_id);
                }
            }
            PPP_VJC_UNCOMP => {
                if self.vjc_uncomp(&payload).is_err() {
                    self.counters.protocol_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("link {:?}: dropping malformed VJ-uncompressed frame", self.link_id);
                }
            }
            PPP_IP => {
                self.dispatcher
                    .dispatch(self.link_id, DispatchEvent::NetifOutput(payload, protocol));
            }
            _ => {
                self.dispatcher
                    .dispatch(self.link_id, DispatchEvent::Write { protocol, payload });
            }
        }
    }

    pub fn send(&mut self, protocol: u16, payload: &[u8]) -> EncodeResult<()> {
        let (protocol, payload) = match self.vj_remap_outbound(protocol, payload) {
            Ok(remapped) => remapped,
            Err(err) => {
                self.counters.protocol_errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("link {:?}: dropping outbound frame, VJ remap failed: {err}", self.link_id);
                return Err(err);
            }
        };

        let idle = self
            .last_xmit
            .map_or(true, |t| t.elapsed() >= self.max_idle);

        let out_accm = self.out_accm.read().unwrap().clone();
        let chain = match encode_frame_with_limit(
            &payload,
            protocol,
            self.accomp,
            self.pcomp,
            idle,
            &out_accm,
            self.out_chain_limit,
        ) {
            Ok(chain) => chain,
            Err(err) => {
                self.counters.memory_errors.fetch_add(1, Ordering::Relaxed);
                self.counters.interface_output_discards.fetch_add(1, Ordering::Relaxed);
                log::warn!("link {:?}: dropping outbound frame, encode chain limit exceeded", self.link_id);
                return Err(err);
            }
        };

        match transmit(self.serial.as_mut(), chain, &self.counters) {
            Ok(()) => {
                self.last_xmit = Some(Instant::now());
                Ok(())
            }
            Err(err) => {
                // Short write: force the next frame to re-synchronize with
                // a leading flag.
                self.last_xmit = None;
                Err(err)
            }
        }
    }

    fn vj_remap_outbound(&mut self, protocol: u16, payload: &[u8]) -> EncodeResult<(u16, Vec<u8>)> {
        if protocol == PPP_IP && self.vj_enabled {
            match self.vj.compress(payload) {
                Ok((remapped_protocol, bytes)) => Ok((remapped_protocol, bytes)),
                Err(VjError::Malformed(msg)) => Err(EncodeError::Protocol(msg)),
                Err(VjError::NotEnabled) => Ok((protocol, payload.to_vec())),
            }
        } else {
            Ok((protocol, payload.to_vec()))
        }
    }

    pub fn vjc_config(&mut self, enable: bool, slot_compress: bool, max_cid: u8) {
        self.vj_enabled = enable;
        self.vj.configure(enable, slot_compress, max_cid);
    }

    pub fn vjc_comp(&mut self, chain: &[u8]) -> VjResult<()> {
        if !self.vj_enabled {
            return Err(VjError::NotEnabled);
        }
        let ip_packet = self.vj.decompress(chain)?;
        self.dispatcher
            .dispatch(self.link_id, DispatchEvent::NetifOutput(ip_packet, PPP_IP));
        Ok(())
    }

    pub fn vjc_uncomp(&mut self, chain: &[u8]) -> VjResult<()> {
        if !self.vj_enabled {
            return Err(VjError::NotEnabled);
        }
        let ip_packet = self.vj.uncompressed(chain)?;
        self.dispatcher
            .dispatch(self.link_id, DispatchEvent::NetifOutput(ip_packet, PPP_IP));
        Ok(())
    }
}

impl Drop for LinkContext {
    fn drop(&mut self) {
        self.rx.reset();
        self.dispatcher.dispatch(self.link_id, DispatchEvent::Command(LinkCommand::Free));
    }
}
