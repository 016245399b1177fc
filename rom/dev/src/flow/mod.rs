/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the boot slot selection flow.

--*/

mod slot;

pub use slot::SlotVerdict;

use crate::print::{HexBytes, HexU32};
use crate::{cprint, cprintln};
use crate::provision::{ProvisioningStore, SlotId};
use sb_error::{SbError, SbResult};
use sb_image_types::{BootConfig, FlashRegion};
use sb_image_verify::ImageVerificationEnv;

/// Image selected for boot
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BootTarget {
    pub slot: SlotId,

    /// Entry (vector table) address
    pub firmware_address: u32,

    pub firmware_size: u32,

    /// Reported only; not enforced
    pub firmware_version: u32,
}

/// Boot Flow
pub struct BootFlow<'a, Env: ImageVerificationEnv, Store: ProvisioningStore> {
    /// Memory mapped flash
    flash: FlashRegion<'a>,

    /// Trust anchors
    store: &'a Store,

    /// Crypto environment
    env: Env,

    config: BootConfig,
}

impl<'a, Env: ImageVerificationEnv, Store: ProvisioningStore> BootFlow<'a, Env, Store> {
    /// Create a new instance `BootFlow`
    ///
    /// # Arguments
    ///
    /// * `flash`  - Flash holding both slots
    /// * `store`  - Provisioning store
    /// * `env`    - Crypto environment
    /// * `config` - Boot configuration
    pub fn new(
        flash: FlashRegion<'a>,
        store: &'a Store,
        env: Env,
        config: &BootConfig,
    ) -> SbResult<Self> {
        if !config.is_valid() {
            return Err(SbError::ROM_INVALID_CONFIG);
        }

        Ok(Self {
            flash,
            store,
            env,
            config: *config,
        })
    }

    /// Select the first slot holding a trusted image
    ///
    /// # Returns
    ///
    /// * `BootTarget` - Trusted image to jump to
    /// * `ROM_NO_BOOTABLE_IMAGE` - No slot holds a trusted image
    pub fn select(&self) -> SbResult<BootTarget> {
        cprintln!("[boot] ++");

        for index in 0..self.store.public_key_digest_count() {
            if let Some(digest) = self.store.public_key_digest(index) {
                cprint!("[boot] Key digest {}: ", index);
                cprintln!("{}", HexBytes(&digest));
            }
        }

        for slot in SlotId::ALL {
            let addr = self.store.slot_address(slot);
            cprintln!("[boot] Validating slot {} at {}", slot, HexU32(addr));

            match self.validate_slot(slot) {
                SlotVerdict::Trusted(target) => {
                    cprintln!(
                        "[boot] Slot {} trusted, version {}",
                        slot,
                        target.firmware_version
                    );
                    cprintln!("[boot] --");
                    return Ok(target);
                }
                verdict => cprintln!("[boot] Slot {} rejected: {}", slot, verdict),
            }
        }

        cprintln!("[boot] No bootable image");
        Err(SbError::ROM_NO_BOOTABLE_IMAGE)
    }

    /// Validate the image in `slot`
    ///
    /// Every call starts from flash and recomputes all digests.
    pub fn validate_slot(&self, slot: SlotId) -> SlotVerdict {
        slot::SlotValidator::new(self.flash, &self.env, &self.config)
            .validate(slot, self.store.slot_address(slot), self.store)
    }
}
