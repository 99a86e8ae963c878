// Builds one framed HDLC packet from a payload and protocol number. VJ
// remapping happens one layer up in crate::link, before this module ever
// sees the bytes.

use crate::accm::Accm;
use crate::chain::BufferChain;
use crate::escape::{push_escaped, FLAG};
use crate::fcs::{fcs_step, FCS_INIT};
use crate::EncodeError;

fn emit_flag(chain: &mut BufferChain) -> Result<(), EncodeError> {
    chain.reserve_for_escape().map_err(|_| EncodeError::Allocation)?;
    chain.push(FLAG);
    Ok(())
}

fn emit_fcs_octet(
    chain: &mut BufferChain,
    fcs: &mut u16,
    accm: &Accm,
    c: u8,
) -> Result<(), EncodeError> {
    *fcs = fcs_step(*fcs, c);
    push_escaped(chain, c, Some(accm)).map_err(|_| EncodeError::Allocation)
}

pub fn encode_frame(
    payload: &[u8],
    protocol: u16,
    accomp: bool,
    pcomp: bool,
    emit_leading_flag: bool,
    out_accm: &Accm,
) -> Result<BufferChain, EncodeError> {
    encode_frame_with_limit(payload, protocol, accomp, pcomp, emit_leading_flag, out_accm, None)
}

// Same as encode_frame, but the output chain refuses to grow past
// chain_limit total bytes instead of being unbounded.
pub fn encode_frame_with_limit(
    payload: &[u8],
    protocol: u16,
    accomp: bool,
    pcomp: bool,
    emit_leading_flag: bool,
    out_accm: &Accm,
    chain_limit: Option<usize>,
) -> Result<BufferChain, EncodeError> {
    let mut chain = match chain_limit {
        Some(limit) => BufferChain::with_limit(limit),
        None => BufferChain::new(),
    };
    let mut fcs = FCS_INIT;

    if emit_leading_flag {
        emit_flag(&mut chain)?;
    }

    if !accomp {
        emit_fcs_octet(&mut chain, &mut fcs, out_accm, 0xFF)?;
        emit_fcs_octet(&mut chain, &mut fcs, out_accm, 0x03)?;
    }

    let use_pfc = pcomp && protocol <= 0xFF && protocol & 1 != 0;
    if !use_pfc {
        emit_fcs_octet(&mut chain, &mut fcs, out_accm, (protocol >> 8) as u8)?;
    }
    emit_fcs_octet(&mut chain, &mut fcs, out_accm, (protocol & 0xFF) as u8)?;

    for &c in payload {
        emit_fcs_octet(&mut chain, &mut fcs, out_accm, c)?;
    }

    // FCS bytes are escape-processed but not themselves folded into fcs.
    let complement = !fcs;
    push_escaped(&mut chain, (complement & 0xFF) as u8, Some(out_accm))
        .map_err(|_| EncodeError::Allocation)?;
    push_escaped(&mut chain, (complement >> 8) as u8, Some(out_accm))
        .map_err(|_| EncodeError::Allocation)?;

    emit_flag(&mut chain)?;

    Ok(chain)
}
