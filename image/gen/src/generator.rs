/*++

Licensed under the Apache-2.0 license.

File Name:

   generator.rs

Abstract:

    Signed firmware image and provisioning record generator

--*/
use anyhow::{bail, Context};
use sb_image_types::*;
use zerocopy::little_endian::U32;
use zerocopy::IntoBytes;

use crate::*;

/// Image generator
pub struct ImageGenerator<Crypto: ImageGeneratorCrypto> {
    crypto: Crypto,
}

impl<Crypto: ImageGeneratorCrypto> ImageGenerator<Crypto> {
    /// Create an instance `ImageGenerator`
    pub fn new(crypto: Crypto) -> Self {
        Self { crypto }
    }

    /// Generate image
    ///
    /// # Arguments
    ///
    /// * `config` - Image generator configuration
    ///
    /// # Returns
    ///
    /// * `ImagePackage` - Stamped firmware, padding and validation info
    pub fn generate<E>(&self, config: &ImageGeneratorConfig<E>) -> anyhow::Result<ImagePackage>
    where
        E: ImageGeneratorExecutable,
    {
        let boot_config = &config.boot_config;
        if !boot_config.is_valid() {
            bail!(
                "Validation info alignment {} is not a power of two within the search distance {}",
                boot_config.validation_info_alignment,
                boot_config.validation_search_distance
            );
        }

        let compat = boot_config.compatibility();
        let load_addr = config.firmware.load_addr();
        let mut firmware = config.firmware.content().clone();

        // Firmware info must be covered by the firmware digest
        let info_offset = boot_config.firmware_info_offset as usize;
        let info_end = info_offset + FIRMWARE_INFO_BYTE_SIZE;
        if firmware.len() < info_end {
            bail!("Firmware smaller than {info_end} bytes");
        }

        let firmware_size =
            u32::try_from(firmware.len()).context("Firmware larger than the address space")?;
        let firmware_end = load_addr
            .checked_add(firmware_size)
            .context("Firmware does not fit below the end of the address space")?;
        let padding = Self::padding(firmware_end, boot_config.validation_info_alignment);
        firmware_end
            .checked_add(padding + VALIDATION_INFO_BYTE_SIZE as u32)
            .context("Validation info does not fit below the end of the address space")?;

        // Stamp firmware info
        let firmware_info = FirmwareInfo {
            magic: ImageMagic::new(MetadataKind::FirmwareInfo, &compat),
            firmware_size: U32::new(firmware_size),
            firmware_version: U32::new(config.firmware.version()),
            firmware_address: U32::new(load_addr),
        };
        firmware[info_offset..info_end].copy_from_slice(firmware_info.as_bytes());

        // Create validation info
        let mut validation_info = ValidationInfo {
            magic: ImageMagic::new(MetadataKind::ValidationInfo, &compat),
            firmware_address: U32::new(load_addr),
            firmware_hash: self.crypto.sha256_digest(&firmware)?,
            public_key: config.pub_key,
            ..Default::default()
        };

        if let Some(priv_key) = &config.priv_key {
            let digest = self.validation_info_digest(&validation_info)?;
            validation_info.signature =
                self.crypto
                    .ecdsa256_sign(&digest, priv_key, &config.pub_key)?;
        }

        Ok(ImagePackage {
            firmware,
            padding: padding as usize,
            validation_info,
        })
    }

    /// Calculate the digest of the signed part of the validation info
    pub fn validation_info_digest(
        &self,
        validation_info: &ValidationInfo,
    ) -> anyhow::Result<ImageDigest> {
        let range = ValidationInfo::signed_range();
        self.crypto
            .sha256_digest(&validation_info.as_bytes()[range])
    }

    /// Calculate public key digest
    pub fn pub_key_digest(&self, pub_key: &ImageEccPubKey) -> anyhow::Result<ImageDigest> {
        self.crypto.sha256_digest(pub_key.as_bytes())
    }

    /// Generate provisioning data
    ///
    /// # Arguments
    ///
    /// * `s0_address` - Flash address of slot 0
    /// * `s1_address` - Flash address of slot 1
    /// * `pub_keys`   - Trusted public keys, in priority order
    pub fn gen_provision_data(
        &self,
        s0_address: u32,
        s1_address: u32,
        pub_keys: &[ImageEccPubKey],
    ) -> anyhow::Result<ProvisionData> {
        if pub_keys.is_empty() {
            bail!("At least one public key is required");
        }
        if pub_keys.len() > MAX_PUB_KEY_DIGEST_COUNT {
            bail!("At most {MAX_PUB_KEY_DIGEST_COUNT} public keys are supported");
        }

        let pub_key_digests = pub_keys
            .iter()
            .map(|pub_key| self.pub_key_digest(pub_key))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(ProvisionData {
            header: ProvisionDataHeader {
                s0_address: U32::new(s0_address),
                s1_address: U32::new(s1_address),
            },
            pub_key_digests,
        })
    }

    /// Bytes from `addr` to the next multiple of `alignment`
    fn padding(addr: u32, alignment: u32) -> u32 {
        addr.wrapping_neg() & (alignment - 1)
    }
}
