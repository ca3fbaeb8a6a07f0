// Licensed under the Apache-2.0 license

use core::mem::size_of;
use zerocopy::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Largest acceptable certificate and certificate-request length, in bytes.
///
/// Both `csr_len` and `certificate_len` originate from an untrusted caller
/// and gate staging allocations as well as the buffer sizes handed to the
/// attestation service, so they are checked against this bound before any
/// allocation takes place.
pub const MAX_CERTIFICATE_LEN: usize = 4096;

/// Size of the opaque request context forwarded to the attestation service.
pub const REQUEST_DATA_SIZE: usize = 64;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OpCode(pub u32);

impl OpCode {
    pub const GET_EVIDENCE: Self = Self(0x4556_4944); // "EVID"
}

impl From<u32> for OpCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<OpCode> for u32 {
    fn from(value: OpCode) -> Self {
        value.0
    }
}

/// A trait implemented by request types. Describes the associated operation
/// code.
pub trait Request: IntoBytes + FromBytes + Immutable + KnownLayout + Unaligned {
    const ID: OpCode;
}

// GET_EVIDENCE
//
// Address and length fields use explicit little-endian types: RISC-V guests
// are little-endian, so the encoding is native on target, and the struct
// stays padding-free (a native `u64` following the context array and a `u32`
// would force alignment padding into the wire layout).
#[repr(C)]
#[derive(Clone, Debug, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned, PartialEq, Eq)]
pub struct GetEvidenceReq {
    /// Opaque context/nonce, copied by value. Never dereferenced.
    pub request_data: [u8; REQUEST_DATA_SIZE],
    /// Caller-space address of the CSR bytes.
    pub csr: U64,
    /// Caller-declared length of the CSR.
    pub csr_len: U32,
    /// Caller-space address of the certificate output buffer.
    pub certificate: U64,
    /// Caller-declared capacity of the output buffer; also the exact length
    /// the attestation service is told to produce.
    pub certificate_len: U32,
}

impl Request for GetEvidenceReq {
    const ID: OpCode = OpCode::GET_EVIDENCE;
}

const _: () = assert!(size_of::<GetEvidenceReq>() == 88);

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::FromZeros;

    #[test]
    fn test_opcode_is_fourcc() {
        assert_eq!(&u32::from(OpCode::GET_EVIDENCE).to_be_bytes(), b"EVID");
    }

    #[test]
    fn test_request_wire_layout() {
        let mut req = GetEvidenceReq::new_zeroed();
        req.request_data[0] = 0xA5;
        req.request_data[63] = 0x5A;
        req.csr = U64::new(0x1122_3344_5566_7788);
        req.csr_len = U32::new(32);
        req.certificate = U64::new(0x8877_6655_4433_2211);
        req.certificate_len = U32::new(256);

        let bytes = req.as_bytes();
        assert_eq!(bytes.len(), 88);
        assert_eq!(bytes[0], 0xA5);
        assert_eq!(bytes[63], 0x5A);
        assert_eq!(&bytes[64..72], &0x1122_3344_5566_7788u64.to_le_bytes());
        assert_eq!(&bytes[72..76], &32u32.to_le_bytes());
        assert_eq!(&bytes[76..84], &0x8877_6655_4433_2211u64.to_le_bytes());
        assert_eq!(&bytes[84..88], &256u32.to_le_bytes());
    }

    #[test]
    fn test_request_decode_round_trip() {
        let mut raw = [0u8; 88];
        raw[64..72].copy_from_slice(&0x4000u64.to_le_bytes());
        raw[72..76].copy_from_slice(&64u32.to_le_bytes());
        raw[76..84].copy_from_slice(&0x5000u64.to_le_bytes());
        raw[84..88].copy_from_slice(&4096u32.to_le_bytes());

        let req = GetEvidenceReq::read_from_bytes(&raw[..]).unwrap();
        assert_eq!(req.csr.get(), 0x4000);
        assert_eq!(req.csr_len.get(), 64);
        assert_eq!(req.certificate.get(), 0x5000);
        assert_eq!(req.certificate_len.get(), 4096);
    }
}
