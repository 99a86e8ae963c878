// Van Jacobson TCP/IP header compression boundary. The compression math
// itself is out of scope; this module only defines the trait the link
// context configures and routes through, plus a fail-closed default.

use crate::{VjError, VjResult};

pub const PPP_IP: u16 = 0x0021;
pub const PPP_VJC_COMP: u16 = 0x002D;
pub const PPP_VJC_UNCOMP: u16 = 0x002F;

pub trait VjCodec {
    fn configure(&mut self, enable: bool, slot_compress: bool, max_slots: u8);

    fn enabled(&self) -> bool;

    // Returns the protocol the packet should actually be sent under
    // (PPP_VJC_COMP, or PPP_IP if compression declined to apply) and the
    // possibly-rewritten bytes.
    fn compress(&mut self, ip_packet: &[u8]) -> VjResult<(u16, Vec<u8>)>;

    fn decompress(&mut self, frame: &[u8]) -> VjResult<Vec<u8>>;

    fn uncompressed(&mut self, frame: &[u8]) -> VjResult<Vec<u8>>;
}

#[derive(Debug, Default)]
pub struct NullVj;

impl VjCodec for NullVj {
    fn configure(&mut self, _enable: bool, _slot_compress: bool, _max_slots: u8) {}

    fn enabled(&self) -> bool {
        false
    }

    fn compress(&mut self, _ip_packet: &[u8]) -> VjResult<(u16, Vec<u8>)> {
        Err(VjError::NotEnabled)
    }

    fn decompress(&mut self, _frame: &[u8]) -> VjResult<Vec<u8>> {
        Err(VjError::NotEnabled)
    }

    fn uncompressed(&mut self, _frame: &[u8]) -> VjResult<Vec<u8>> {
        Err(VjError::NotEnabled)
    }
}
