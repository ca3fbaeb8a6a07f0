// Licensed under the Apache-2.0 license

//! Test doubles for the two far sides of the agent's boundaries: the
//! unprivileged caller's address space and the firmware attestation
//! service. Tests drive the real handler against these.

use std::collections::BTreeMap;

use aptee_api::{ApteeResult, EvidenceError, REQUEST_DATA_SIZE};
use aptee_drivers::{AttestationService, GuestMemory};

/// Model of the caller's address space. Regions are mapped explicitly; any
/// access touching unmapped bytes faults the way an invalid user pointer
/// would.
#[derive(Default)]
pub struct GuestRam {
    regions: BTreeMap<u64, Vec<u8>>,
}

impl GuestRam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `bytes` at `addr`, returning `addr` back for convenience.
    pub fn map(&mut self, addr: u64, bytes: &[u8]) -> u64 {
        self.regions.insert(addr, bytes.to_vec());
        addr
    }

    /// Current contents of the region mapped at `addr`.
    ///
    /// # Panics
    ///
    /// If no region was mapped at exactly `addr`.
    pub fn region(&self, addr: u64) -> &[u8] {
        &self.regions[&addr]
    }

    /// Region base and in-region offset for an access of `len` bytes at
    /// `addr`, or `None` if the access touches unmapped memory.
    fn locate(&self, addr: u64, len: usize) -> Option<(u64, usize)> {
        let (&base, bytes) = self.regions.range(..=addr).next_back()?;
        let offset = usize::try_from(addr - base).ok()?;
        if offset.checked_add(len)? <= bytes.len() {
            Some((base, offset))
        } else {
            None
        }
    }
}

impl GuestMemory for GuestRam {
    fn read(&self, addr: u64, dest: &mut [u8]) -> ApteeResult<()> {
        if dest.is_empty() {
            return Ok(());
        }
        let (base, offset) = self
            .locate(addr, dest.len())
            .ok_or(EvidenceError::FaultyBuffer)?;
        dest.copy_from_slice(&self.regions[&base][offset..offset + dest.len()]);
        Ok(())
    }

    fn write(&mut self, addr: u64, src: &[u8]) -> ApteeResult<()> {
        if src.is_empty() {
            return Ok(());
        }
        let (base, offset) = self
            .locate(addr, src.len())
            .ok_or(EvidenceError::FaultyBuffer)?;
        let region = self.regions.get_mut(&base).ok_or(EvidenceError::FaultyBuffer)?;
        region[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }
}

/// One recorded `get_evidence` invocation, captured from the firmware side
/// of the boundary.
pub struct EvidenceCall {
    /// CSR bytes as firmware saw them in the staging buffer.
    pub csr: Vec<u8>,
    /// The 64-byte request context.
    pub request_data: [u8; REQUEST_DATA_SIZE],
    pub reserved: u64,
    /// Output length firmware was told to produce.
    pub certificate_len: u32,
}

/// Model of the TSM attestation service.
///
/// Reads and writes the agent's staging buffers through the raw shared
/// addresses it is handed, exactly as the real firmware would, and records
/// every invocation so tests can assert on what crossed the boundary.
#[derive(Default)]
pub struct ModelTsm {
    /// Status returned from `get_evidence`; zero is success.
    pub status: i64,
    /// Evidence written into the certificate staging buffer on success.
    pub evidence: Vec<u8>,
    /// Every invocation, in order.
    pub calls: Vec<EvidenceCall>,
}

impl ModelTsm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model that succeeds and writes `evidence` into the certificate
    /// buffer (truncated to the buffer's declared length).
    pub fn with_evidence(evidence: &[u8]) -> Self {
        Self {
            evidence: evidence.to_vec(),
            ..Self::default()
        }
    }

    /// A model whose `get_evidence` fails with `status`.
    pub fn failing(status: i64) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

impl AttestationService for ModelTsm {
    fn get_evidence(
        &mut self,
        csr_addr: u64,
        csr_len: u32,
        request_data_addr: u64,
        reserved: u64,
        certificate_addr: u64,
        certificate_len: u32,
    ) -> i64 {
        // SAFETY: the agent hands this model the addresses of staging
        // buffers (and its by-value request context) that stay alive for
        // the duration of the call; this is the same contract the real
        // firmware relies on.
        let csr = unsafe {
            std::slice::from_raw_parts(csr_addr as *const u8, csr_len as usize)
        }
        .to_vec();
        let mut request_data = [0u8; REQUEST_DATA_SIZE];
        request_data.copy_from_slice(unsafe {
            std::slice::from_raw_parts(request_data_addr as *const u8, REQUEST_DATA_SIZE)
        });
        self.calls.push(EvidenceCall {
            csr,
            request_data,
            reserved,
            certificate_len,
        });

        if self.status == 0 {
            // SAFETY: as above; the agent owns `certificate_len` writable
            // bytes at `certificate_addr` until the call returns.
            let out = unsafe {
                std::slice::from_raw_parts_mut(certificate_addr as *mut u8, certificate_len as usize)
            };
            let n = self.evidence.len().min(out.len());
            out[..n].copy_from_slice(&self.evidence[..n]);
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_ram_read_write() {
        let mut ram = GuestRam::new();
        ram.map(0x1000, &[1, 2, 3, 4]);

        let mut buf = [0u8; 2];
        ram.read(0x1002, &mut buf).unwrap();
        assert_eq!(buf, [3, 4]);

        ram.write(0x1001, &[9]).unwrap();
        assert_eq!(ram.region(0x1000), &[1, 9, 3, 4]);
    }

    #[test]
    fn test_guest_ram_faults_on_unmapped() {
        let mut ram = GuestRam::new();
        ram.map(0x1000, &[0u8; 16]);

        let mut buf = [0u8; 4];
        assert_eq!(
            ram.read(0x2000, &mut buf),
            Err(EvidenceError::FaultyBuffer)
        );
        // Straddles the end of the region.
        assert_eq!(
            ram.read(0x100E, &mut buf),
            Err(EvidenceError::FaultyBuffer)
        );
        assert_eq!(ram.write(0x0FFF, &[0]), Err(EvidenceError::FaultyBuffer));
    }

    #[test]
    fn test_zero_length_access_never_faults() {
        let mut ram = GuestRam::new();
        ram.read(0xDEAD_BEEF, &mut []).unwrap();
        ram.write(0xDEAD_BEEF, &[]).unwrap();
    }
}
