/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the AP-TEE guest driver library.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

mod guest_mem;
pub mod printer;
mod sbi;
mod staging;

pub use guest_mem::GuestMemory;
pub use sbi::{AttestationService, SbiRet, COVG_EXT_ID, COVG_GET_EVIDENCE};
pub use staging::{shared_addr, StagingBuffer};

cfg_if::cfg_if! {
    if #[cfg(target_arch = "riscv64")] {
        pub use sbi::CoveGuest;
    }
}
