// Licensed under the Apache-2.0 license

use aptee_drivers::{AttestationService, GuestMemory};

/// Capabilities the operation handlers run against: the caller's memory on
/// one side of the trust boundary and the firmware attestation service on
/// the other.
///
/// Holds no per-request state; every request owns its staging buffers for
/// exactly one `handle_operation` call.
pub struct Drivers<M: GuestMemory, S: AttestationService> {
    pub caller_mem: M,
    pub tsm: S,
}

impl<M: GuestMemory, S: AttestationService> Drivers<M, S> {
    pub fn new(caller_mem: M, tsm: S) -> Self {
        Self { caller_mem, tsm }
    }
}
