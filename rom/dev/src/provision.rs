/*++

Licensed under the Apache-2.0 license.

File Name:

    provision.rs

Abstract:

    File contains the provisioning store interface and the flash record reader.

--*/

use sb_error::{SbError, SbResult};
use sb_image_types::*;
use zerocopy::FromBytes;

/// Firmware slot
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotId {
    S0,
    S1,
}

impl SlotId {
    /// Slots in boot priority order
    pub const ALL: [SlotId; 2] = [SlotId::S0, SlotId::S1];
}

impl ufmt::uDisplay for SlotId {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        match self {
            SlotId::S0 => f.write_str("S0"),
            SlotId::S1 => f.write_str("S1"),
        }
    }
}

/// Read-only trust anchors provisioned at manufacturing time
pub trait ProvisioningStore {
    /// Copy of the public key digest at `index`
    fn public_key_digest(&self, index: usize) -> Option<ImageDigest>;

    /// Number of provisioned public key digests
    fn public_key_digest_count(&self) -> usize;

    /// Flash address of `slot`
    fn slot_address(&self, slot: SlotId) -> u32;
}

/// Provisioning record stored in flash
///
/// Layout: `s0_address | s1_address | digest[0] .. digest[n - 1]`
pub struct FlashProvisioning<'a> {
    header: &'a ProvisionDataHeader,

    digests: &'a [u8],
}

impl<'a> FlashProvisioning<'a> {
    /// Parse the provisioning record in `data`
    ///
    /// # Returns
    ///
    /// * `PROVISION_DATA_INVALID` - Short record, partial digest or too many digests
    /// * `PROVISION_NO_PUB_KEY_DIGESTS` - Record holds no digest
    pub fn new(data: &'a [u8]) -> SbResult<Self> {
        let (header, digests) = ProvisionDataHeader::ref_from_prefix(data)
            .map_err(|_| SbError::PROVISION_DATA_INVALID)?;

        if digests.is_empty() {
            return Err(SbError::PROVISION_NO_PUB_KEY_DIGESTS);
        }
        if digests.len() % SHA256_DIGEST_BYTE_SIZE != 0
            || digests.len() / SHA256_DIGEST_BYTE_SIZE > MAX_PUB_KEY_DIGEST_COUNT
        {
            return Err(SbError::PROVISION_DATA_INVALID);
        }

        Ok(Self { header, digests })
    }
}

impl ProvisioningStore for FlashProvisioning<'_> {
    fn public_key_digest(&self, index: usize) -> Option<ImageDigest> {
        let start = index.checked_mul(SHA256_DIGEST_BYTE_SIZE)?;
        let bytes = self.digests.get(start..)?.get(..SHA256_DIGEST_BYTE_SIZE)?;
        bytes.try_into().ok()
    }

    fn public_key_digest_count(&self) -> usize {
        self.digests.len() / SHA256_DIGEST_BYTE_SIZE
    }

    fn slot_address(&self, slot: SlotId) -> u32 {
        match slot {
            SlotId::S0 => self.header.s0_address.get(),
            SlotId::S1 => self.header.s1_address.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(digest_count: usize) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0000_8000u32.to_le_bytes());
        data.extend_from_slice(&0x0004_0000u32.to_le_bytes());
        for i in 0..digest_count {
            data.extend_from_slice(&[i as u8 + 1; SHA256_DIGEST_BYTE_SIZE]);
        }
        data
    }

    #[test]
    fn test_flash_provisioning() {
        let data = record(2);
        let store = FlashProvisioning::new(&data).unwrap();

        assert_eq!(store.slot_address(SlotId::S0), 0x0000_8000);
        assert_eq!(store.slot_address(SlotId::S1), 0x0004_0000);
        assert_eq!(store.public_key_digest_count(), 2);
        assert_eq!(
            store.public_key_digest(0),
            Some([1; SHA256_DIGEST_BYTE_SIZE])
        );
        assert_eq!(
            store.public_key_digest(1),
            Some([2; SHA256_DIGEST_BYTE_SIZE])
        );
        assert_eq!(store.public_key_digest(2), None);
        assert_eq!(store.public_key_digest(usize::MAX), None);
    }

    #[test]
    fn test_flash_provisioning_max_digests() {
        let data = record(MAX_PUB_KEY_DIGEST_COUNT);
        let store = FlashProvisioning::new(&data).unwrap();
        assert_eq!(store.public_key_digest_count(), MAX_PUB_KEY_DIGEST_COUNT);

        let data = record(MAX_PUB_KEY_DIGEST_COUNT + 1);
        assert_eq!(
            FlashProvisioning::new(&data).err(),
            Some(SbError::PROVISION_DATA_INVALID)
        );
    }

    #[test]
    fn test_flash_provisioning_no_digests() {
        let data = record(0);
        assert_eq!(data.len(), PROVISION_DATA_HEADER_BYTE_SIZE);
        assert_eq!(
            FlashProvisioning::new(&data).err(),
            Some(SbError::PROVISION_NO_PUB_KEY_DIGESTS)
        );
    }

    #[test]
    fn test_flash_provisioning_invalid() {
        assert_eq!(
            FlashProvisioning::new(&[0u8; 7]).err(),
            Some(SbError::PROVISION_DATA_INVALID)
        );

        let mut data = record(1);
        data.pop();
        assert_eq!(
            FlashProvisioning::new(&data).err(),
            Some(SbError::PROVISION_DATA_INVALID)
        );
    }
}
