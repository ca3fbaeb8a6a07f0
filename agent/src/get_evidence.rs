// Licensed under the Apache-2.0 license

use crate::{read_request, Drivers};

use aptee_api::{ApteeResult, EvidenceError, GetEvidenceReq, MAX_CERTIFICATE_LEN};
use aptee_drivers::{shared_addr, AttestationService, GuestMemory, StagingBuffer};

pub struct GetEvidenceCmd;
impl GetEvidenceCmd {
    /// Exchange a caller-supplied CSR for attestation evidence.
    ///
    /// `arg_addr` is the caller-space address of a [`GetEvidenceReq`]. The
    /// caller's buffers are never handed to firmware; both directions go
    /// through staging buffers owned by this call and released on every
    /// exit path.
    pub(crate) fn execute<M: GuestMemory, S: AttestationService>(
        drivers: &mut Drivers<M, S>,
        arg_addr: u64,
    ) -> ApteeResult<()> {
        let req: GetEvidenceReq = read_request(&drivers.caller_mem, arg_addr)?;

        // Both lengths gate allocation sizes and the buffer sizes firmware
        // is told about; bound them before touching the allocator.
        let csr_len = req.csr_len.get() as usize;
        let certificate_len = req.certificate_len.get() as usize;
        if csr_len > MAX_CERTIFICATE_LEN || certificate_len > MAX_CERTIFICATE_LEN {
            return Err(EvidenceError::InvalidArgument);
        }

        let mut csr = StagingBuffer::zeroed(csr_len)?;
        drivers.caller_mem.read(req.csr.get(), csr.as_mut_slice())?;

        let certificate = StagingBuffer::zeroed(certificate_len)?;

        let status = drivers.tsm.get_evidence(
            csr.device_addr(),
            req.csr_len.get(),
            shared_addr(&req.request_data),
            0,
            certificate.device_addr(),
            req.certificate_len.get(),
        );

        // Stage out regardless of firmware status; a copy-out fault is what
        // the caller observes even when firmware also failed.
        drivers
            .caller_mem
            .write(req.certificate.get(), certificate.as_slice())?;

        match status {
            0 => Ok(()),
            status => Err(EvidenceError::Firmware(status)),
        }
    }
}
