/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Boot ROM library: provisioning store access and trusted slot selection.

--*/
#![cfg_attr(not(feature = "std"), no_std)]

mod flow;
pub mod print;
mod provision;

pub use flow::{BootFlow, BootTarget, SlotVerdict};
pub use provision::{FlashProvisioning, ProvisioningStore, SlotId};
