/*++

Licensed under the Apache-2.0 license.

File Name:

    slot.rs

Abstract:

    File contains the validation of the image held in one slot.

--*/

use super::BootTarget;
use crate::provision::{ProvisioningStore, SlotId};
use sb_image_types::*;
use sb_image_verify::{
    ImageVerificationEnv, MetadataLocator, TrustChainVerifier, VerificationError,
    VerificationResult,
};

/// Outcome of validating one slot
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotVerdict {
    /// Image may be booted
    Trusted(BootTarget),

    /// No firmware info at the fixed offset
    FirmwareInfoNotFound,

    /// Firmware info was built for another load address
    FirmwareAddressMismatch,

    /// Firmware info lies outside the hashed firmware
    FirmwareInfoNotCovered,

    /// Declared firmware extends past the end of flash
    FirmwareOutOfFlash,

    /// No validation info within the search distance
    ValidationInfoNotFound,

    /// Validation info describes another firmware
    ValidationAddressMismatch,

    /// Chain of trust is broken
    Untrusted(VerificationResult),
}

impl SlotVerdict {
    pub fn is_trusted(&self) -> bool {
        matches!(self, SlotVerdict::Trusted(_))
    }
}

impl ufmt::uDisplay for SlotVerdict {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let reason = match self {
            SlotVerdict::Trusted(_) => "trusted",
            SlotVerdict::FirmwareInfoNotFound => "firmware info not found",
            SlotVerdict::FirmwareAddressMismatch => "firmware address mismatch",
            SlotVerdict::FirmwareInfoNotCovered => "firmware info not covered",
            SlotVerdict::FirmwareOutOfFlash => "firmware out of flash",
            SlotVerdict::ValidationInfoNotFound => "validation info not found",
            SlotVerdict::ValidationAddressMismatch => "validation info address mismatch",
            SlotVerdict::Untrusted(VerificationResult::Trusted) => "trusted",
            SlotVerdict::Untrusted(VerificationResult::HashOutOfBounds) => "hash out of bounds",
            SlotVerdict::Untrusted(VerificationResult::PublicKeyHashMismatch) => {
                "public key hash mismatch"
            }
            SlotVerdict::Untrusted(VerificationResult::SignatureInvalid) => "signature invalid",
            SlotVerdict::Untrusted(VerificationResult::FirmwareHashInvalid) => {
                "firmware hash invalid"
            }
        };
        f.write_str(reason)
    }
}

pub(super) struct SlotValidator<'a, 'e, Env: ImageVerificationEnv> {
    flash: FlashRegion<'a>,

    locator: MetadataLocator<'a>,

    env: &'e Env,

    config: &'e BootConfig,
}

impl<'a, 'e, Env: ImageVerificationEnv> SlotValidator<'a, 'e, Env> {
    pub fn new(flash: FlashRegion<'a>, env: &'e Env, config: &'e BootConfig) -> Self {
        Self {
            flash,
            locator: MetadataLocator::new(flash, config),
            env,
            config,
        }
    }

    /// Validate the image at `slot_address`
    pub fn validate<Store: ProvisioningStore>(
        &self,
        slot: SlotId,
        slot_address: u32,
        store: &Store,
    ) -> SlotVerdict {
        let Some(firmware_info) = self.locator.locate_firmware_info(slot_address) else {
            return SlotVerdict::FirmwareInfoNotFound;
        };

        let firmware_address = firmware_info.firmware_address();
        let firmware_size = firmware_info.firmware_size();
        if firmware_address != slot_address {
            return SlotVerdict::FirmwareAddressMismatch;
        }

        let info_end = self
            .config
            .firmware_info_offset
            .checked_add(FIRMWARE_INFO_BYTE_SIZE as u32);
        if !matches!(info_end, Some(end) if end <= firmware_size) {
            return SlotVerdict::FirmwareInfoNotCovered;
        }

        let Some(firmware) = self.flash.read(firmware_address, firmware_size as usize) else {
            return SlotVerdict::FirmwareOutOfFlash;
        };

        let Some(validation_info) = self
            .locator
            .locate_validation_info(&firmware_info, self.config.validation_search_distance)
        else {
            return SlotVerdict::ValidationInfoNotFound;
        };

        if validation_info.firmware_address() != firmware_address {
            return SlotVerdict::ValidationAddressMismatch;
        }

        // First key whose digest matches decides the verdict
        let verifier = TrustChainVerifier::new(self.env);
        let mut result = Err(VerificationError::PublicKeyHashMismatch);
        for index in 0..store.public_key_digest_count() {
            let Some(digest) = store.public_key_digest(index) else {
                break;
            };
            result = verifier.verify_validation_info(validation_info, &digest, firmware);
            if result != Err(VerificationError::PublicKeyHashMismatch) {
                break;
            }
        }

        let result = VerificationResult::from(result);
        if !result.is_trusted() {
            return SlotVerdict::Untrusted(result);
        }

        SlotVerdict::Trusted(BootTarget {
            slot,
            firmware_address,
            firmware_size,
            firmware_version: firmware_info.firmware_version(),
        })
    }
}
