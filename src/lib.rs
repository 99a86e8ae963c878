pub mod accm;
pub mod chain;
pub mod counters;
pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod escape;
pub mod fcs;
pub mod link;
pub mod transmit;
pub mod vj;

pub use accm::Accm;
pub use chain::BufferChain;
pub use dispatch::{
    DirectDispatcher, DispatchEvent, LinkCommand, LinkId, MagicRandomSource, NoopRandomSource,
    QueueDispatcher, UpperDispatcher, UpperPpp,
};
pub use link::LinkContext;
pub use transmit::{MockSerialPort, SerialPort};
pub use vj::{NullVj, VjCodec};

use std::fmt;

#[derive(Debug)]
pub enum EncodeError {
    Allocation,
    ShortWrite,
    Protocol(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Allocation => write!(f, "output chain allocation failed"),
            EncodeError::ShortWrite => write!(f, "short write to serial port"),
            EncodeError::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for EncodeError {}

pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

// Internal to decode.rs's per-frame bookkeeping; LinkContext::input has no
// Result in its signature, so this never reaches that caller directly — it
// gets folded into a decode::FrameEvent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Allocation,
    Length,
    Checksum,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Allocation => write!(f, "receive chain allocation failed"),
            DecodeError::Length => write!(f, "frame ended before the data portion"),
            DecodeError::Checksum => write!(f, "FCS residue mismatch"),
        }
    }
}

impl std::error::Error for DecodeError {}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[derive(Debug)]
pub enum VjError {
    NotEnabled,
    Malformed(String),
}

impl fmt::Display for VjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VjError::NotEnabled => write!(f, "VJ compression is not enabled on this link"),
            VjError::Malformed(msg) => write!(f, "malformed VJ packet: {msg}"),
        }
    }
}

impl std::error::Error for VjError {}

pub type VjResult<T> = std::result::Result<T, VjError>;
