// Licensed under the Apache-2.0 license

#![cfg_attr(not(test), no_std)]

pub mod evidence;

pub use evidence::{GetEvidenceReq, OpCode, Request, MAX_CERTIFICATE_LEN, REQUEST_DATA_SIZE};

/// Status reported to the caller for an evidence-exchange operation.
///
/// Every failure is request-scoped; the agent carries no state from one
/// request to the next, so none of these are fatal to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EvidenceError {
    /// A caller-declared length exceeds [`MAX_CERTIFICATE_LEN`].
    InvalidArgument,
    /// A staging-buffer allocation failed.
    OutOfMemory,
    /// A copy across the caller trust boundary failed; the caller supplied
    /// an invalid or unmapped address.
    FaultyBuffer,
    /// The operation code is not recognized by the agent.
    UnsupportedOperation,
    /// The firmware attestation call returned a non-success status. The
    /// status is carried verbatim; the agent does not interpret it.
    Firmware(i64),
}

pub type ApteeResult<T> = core::result::Result<T, EvidenceError>;
