// Licensed under the Apache-2.0 license

use crate::{handle_operation, Drivers, DRIVER_NAME, DRIVER_VERSION};

use aptee_api::ApteeResult;
use aptee_drivers::{cprintln, AttestationService, GuestMemory};

/// Platform registration collaborator: whatever exposes the agent's device
/// node to callers. Registration state lives with the platform, not the
/// agent; the agent only drives the hooks, once each way.
pub trait DeviceRegistration {
    /// Called once while the device comes up. Failure aborts the probe.
    fn register(&mut self) -> ApteeResult<()>;

    /// Called once when the device goes away.
    fn unregister(&mut self);
}

/// A probed agent device: registered with the platform on construction,
/// unregistered on drop.
pub struct AgentDevice<M: GuestMemory, S: AttestationService, R: DeviceRegistration> {
    pub drivers: Drivers<M, S>,
    registration: R,
}

impl<M: GuestMemory, S: AttestationService, R: DeviceRegistration> AgentDevice<M, S, R> {
    pub fn probe(drivers: Drivers<M, S>, mut registration: R) -> ApteeResult<Self> {
        cprintln!("[{}] probe, version {}", DRIVER_NAME, DRIVER_VERSION);
        registration.register()?;
        Ok(Self {
            drivers,
            registration,
        })
    }

    pub fn handle_operation(&mut self, opcode: u32, arg_addr: u64) -> ApteeResult<()> {
        handle_operation(&mut self.drivers, opcode, arg_addr)
    }
}

impl<M: GuestMemory, S: AttestationService, R: DeviceRegistration> Drop for AgentDevice<M, S, R> {
    fn drop(&mut self) {
        self.registration.unregister();
    }
}
