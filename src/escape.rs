use crate::accm::Accm;
use crate::chain::{BufferChain, ChainFull};

pub const FLAG: u8 = 0x7E;
pub const ESC: u8 = 0x7D;
pub const ESC_XOR: u8 = 0x20;

// accm is None on the transmit side when ACCM negotiation hasn't completed
// yet; ESC and FLAG are still always escaped regardless.
pub fn push_escaped(chain: &mut BufferChain, c: u8, accm: Option<&Accm>) -> Result<(), ChainFull> {
    let must_escape = c == FLAG || c == ESC || accm.is_some_and(|m| m.escape_p(c));
    chain.reserve_for_escape()?;
    if must_escape {
        chain.push(ESC);
        chain.push(c ^ ESC_XOR);
    } else {
        chain.push(c);
    }
    Ok(())
}
