/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the AP-TEE guest agent and its operation
    dispatch.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod drivers;
mod get_evidence;
mod registration;

pub use drivers::Drivers;
pub use get_evidence::GetEvidenceCmd;
pub use registration::{AgentDevice, DeviceRegistration};

use aptee_api::{ApteeResult, EvidenceError, OpCode, Request};
use aptee_drivers::printer::HexWord;
use aptee_drivers::{cprintln, AttestationService, GuestMemory};
use zerocopy::{FromZeros, IntoBytes};

pub const DRIVER_NAME: &str = "aptee";
pub const DRIVER_VERSION: &str = "0.1";

fn human_readable_opcode(bytes: &[u8]) -> Option<&str> {
    if bytes.len() == 4 && bytes.iter().all(|c| c.is_ascii_alphanumeric()) {
        core::str::from_utf8(bytes).ok()
    } else {
        None
    }
}

/// Handles one caller operation and reports its status.
///
/// `arg_addr` is the caller-space address of the operation's argument
/// structure. Each invocation is independent; the agent keeps no state
/// between requests, so callers may retry at their own discretion.
pub fn handle_operation<M: GuestMemory, S: AttestationService>(
    drivers: &mut Drivers<M, S>,
    opcode: u32,
    arg_addr: u64,
) -> ApteeResult<()> {
    if let Some(ascii) = human_readable_opcode(&opcode.to_be_bytes()) {
        cprintln!("[{}] received op {} ({})", DRIVER_NAME, HexWord(opcode), ascii);
    } else {
        cprintln!("[{}] received op {}", DRIVER_NAME, HexWord(opcode));
    }

    match OpCode::from(opcode) {
        OpCode::GET_EVIDENCE => GetEvidenceCmd::execute(drivers, arg_addr),
        _ => {
            cprintln!("[{}] op {} not supported", DRIVER_NAME, HexWord(opcode));
            Err(EvidenceError::UnsupportedOperation)
        }
    }
}

/// Copy an operation's argument structure out of caller memory and decode
/// it. The agent operates on its own copy from here on; later changes to the
/// caller's mapping cannot alter the request.
pub(crate) fn read_request<R: Request, M: GuestMemory>(mem: &M, addr: u64) -> ApteeResult<R> {
    let mut req = R::new_zeroed();
    mem.read(addr, req.as_mut_bytes())?;
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_readable_opcode() {
        assert_eq!(human_readable_opcode(b"EVID"), Some("EVID"));
        assert_eq!(human_readable_opcode(&[0xDE, 0xAD, 0xBE, 0xEF]), None);
        assert_eq!(human_readable_opcode(b"EV"), None);
    }
}
