/*++

Licensed under the Apache-2.0 license.

File Name:

    locator.rs

Abstract:

    Locates the magic tagged firmware info and validation info records in flash.

--*/

use core::ops::Deref;

use sb_image_types::*;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

/// Record found in flash together with its address
#[derive(Debug)]
pub struct Located<'a, T> {
    /// Flash address of the first byte of the record
    pub addr: u32,

    pub info: &'a T,
}

impl<T> Clone for Located<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Located<'_, T> {}

impl<T> Deref for Located<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.info
    }
}

/// Metadata Locator
pub struct MetadataLocator<'a> {
    flash: FlashRegion<'a>,

    compat: MagicCompatibility,

    firmware_info_offset: u32,
}

impl<'a> MetadataLocator<'a> {
    /// Create a new instance `MetadataLocator`
    ///
    /// # Arguments
    ///
    /// * `flash`  - Flash view the records are read from
    /// * `config` - Boot configuration supplying the magic and offsets
    pub fn new(flash: FlashRegion<'a>, config: &BootConfig) -> Self {
        Self {
            flash,
            compat: config.compatibility(),
            firmware_info_offset: config.firmware_info_offset,
        }
    }

    /// Find the firmware info at the fixed offset inside the image at `image_base`
    ///
    /// # Returns
    ///
    /// * `None` - No firmware info with an exact magic match
    pub fn locate_firmware_info(&self, image_base: u32) -> Option<Located<'a, FirmwareInfo>> {
        let addr = image_base.checked_add(self.firmware_info_offset)?;
        let info = self.record::<FirmwareInfo>(addr)?;
        if !info.magic.is(MetadataKind::FirmwareInfo, &self.compat) {
            return None;
        }
        Some(Located { addr, info })
    }

    /// Find the validation info following the firmware described by `firmware_info`
    ///
    /// Probes byte offsets `0..=search_distance` from the declared firmware end
    /// and returns the nearest exact magic match.
    pub fn locate_validation_info(
        &self,
        firmware_info: &FirmwareInfo,
        search_distance: u32,
    ) -> Option<Located<'a, ValidationInfo>> {
        let start = firmware_info
            .firmware_address()
            .checked_add(firmware_info.firmware_size())?;

        for distance in 0..=search_distance {
            let addr = start.checked_add(distance)?;
            let Some(info) = self.record::<ValidationInfo>(addr) else {
                continue;
            };
            if info.magic.is(MetadataKind::ValidationInfo, &self.compat) {
                return Some(Located { addr, info });
            }
        }

        None
    }

    fn record<T>(&self, addr: u32) -> Option<&'a T>
    where
        T: FromBytes + KnownLayout + Immutable + Unaligned,
    {
        let bytes = self.flash.read(addr, core::mem::size_of::<T>())?;
        T::ref_from_bytes(bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerocopy::little_endian::U32;
    use zerocopy::IntoBytes;

    const FLASH_BASE: u32 = 0x0001_0000;
    const FIRMWARE_SIZE: u32 = 0x1000;

    fn firmware_info(config: &BootConfig) -> FirmwareInfo {
        FirmwareInfo {
            magic: ImageMagic::new(MetadataKind::FirmwareInfo, &config.compatibility()),
            firmware_size: U32::new(FIRMWARE_SIZE),
            firmware_version: U32::new(3),
            firmware_address: U32::new(FLASH_BASE),
        }
    }

    fn validation_info(config: &BootConfig) -> ValidationInfo {
        ValidationInfo {
            magic: ImageMagic::new(MetadataKind::ValidationInfo, &config.compatibility()),
            firmware_address: U32::new(FLASH_BASE),
            ..Default::default()
        }
    }

    /// Flash holding a firmware info and a validation info `padding` bytes past the firmware
    fn flash_image(config: &BootConfig, padding: usize) -> Vec<u8> {
        let mut flash = vec![0xffu8; FIRMWARE_SIZE as usize + 64 + VALIDATION_INFO_BYTE_SIZE];
        let offset = config.firmware_info_offset as usize;
        flash[offset..][..FIRMWARE_INFO_BYTE_SIZE]
            .copy_from_slice(firmware_info(config).as_bytes());
        flash[FIRMWARE_SIZE as usize + padding..][..VALIDATION_INFO_BYTE_SIZE]
            .copy_from_slice(validation_info(config).as_bytes());
        flash
    }

    #[test]
    fn test_locate_firmware_info() {
        let config = BootConfig::default();
        let data = flash_image(&config, 0);
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);

        let found = locator.locate_firmware_info(FLASH_BASE).unwrap();
        assert_eq!(found.addr, FLASH_BASE + config.firmware_info_offset);
        assert_eq!(found.firmware_size(), FIRMWARE_SIZE);
        assert_eq!(found.firmware_version(), 3);
        assert_eq!(found.firmware_address(), FLASH_BASE);
    }

    #[test]
    fn test_locate_firmware_info_any_magic_word_differs() {
        let config = BootConfig::default();
        for word in 0..MAGIC_WORD_SIZE {
            let mut data = flash_image(&config, 0);
            data[config.firmware_info_offset as usize + word * 4 + 2] ^= 0x40;
            let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
            assert!(locator.locate_firmware_info(FLASH_BASE).is_none());
        }
    }

    #[test]
    fn test_locate_firmware_info_wrong_kind() {
        let config = BootConfig::default();
        let mut data = flash_image(&config, 0);
        let magic = ImageMagic::new(MetadataKind::ValidationInfo, &config.compatibility());
        data[config.firmware_info_offset as usize..][..MAGIC_BYTE_SIZE]
            .copy_from_slice(magic.as_bytes());
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
        assert!(locator.locate_firmware_info(FLASH_BASE).is_none());
    }

    #[test]
    fn test_locate_firmware_info_outside_flash() {
        let config = BootConfig::default();
        let data = flash_image(&config, 0);
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
        assert!(locator.locate_firmware_info(0).is_none());
        assert!(locator.locate_firmware_info(u32::MAX).is_none());
        assert!(locator
            .locate_firmware_info(FLASH_BASE + data.len() as u32)
            .is_none());
    }

    #[test]
    fn test_locate_validation_info_at_firmware_end() {
        let config = BootConfig::default();
        let data = flash_image(&config, 0);
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
        let fw_info = locator.locate_firmware_info(FLASH_BASE).unwrap();

        let found = locator.locate_validation_info(&fw_info, 0).unwrap();
        assert_eq!(found.addr, FLASH_BASE + FIRMWARE_SIZE);
        assert_eq!(found.firmware_address(), FLASH_BASE);
    }

    #[test]
    fn test_locate_validation_info_within_bound() {
        let config = BootConfig::default();
        for padding in 1..=3 {
            let data = flash_image(&config, padding);
            let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
            let fw_info = locator.locate_firmware_info(FLASH_BASE).unwrap();

            let found = locator.locate_validation_info(&fw_info, 4).unwrap();
            assert_eq!(found.addr, FLASH_BASE + FIRMWARE_SIZE + padding as u32);

            let found = locator
                .locate_validation_info(&fw_info, padding as u32)
                .unwrap();
            assert_eq!(found.addr, FLASH_BASE + FIRMWARE_SIZE + padding as u32);
        }
    }

    #[test]
    fn test_locate_validation_info_one_past_bound() {
        let config = BootConfig::default();
        let data = flash_image(&config, 5);
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
        let fw_info = locator.locate_firmware_info(FLASH_BASE).unwrap();

        assert!(locator.locate_validation_info(&fw_info, 4).is_none());
        assert!(locator.locate_validation_info(&fw_info, 5).is_some());
    }

    #[test]
    fn test_locate_validation_info_returns_nearest() {
        let config = BootConfig::default();
        let mut data = flash_image(&config, 0);
        let magic = ImageMagic::new(MetadataKind::ValidationInfo, &config.compatibility());
        data[FIRMWARE_SIZE as usize + MAGIC_BYTE_SIZE..][..MAGIC_BYTE_SIZE]
            .copy_from_slice(magic.as_bytes());
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
        let fw_info = locator.locate_firmware_info(FLASH_BASE).unwrap();

        let found = locator.locate_validation_info(&fw_info, 16).unwrap();
        assert_eq!(found.addr, FLASH_BASE + FIRMWARE_SIZE);
    }

    #[test]
    fn test_locate_validation_info_scan_starts_below_flash() {
        let config = BootConfig::default();

        // Declared end two bytes before flash, record at the flash base
        let mut data = vec![0xffu8; VALIDATION_INFO_BYTE_SIZE + 16];
        data[..VALIDATION_INFO_BYTE_SIZE].copy_from_slice(validation_info(&config).as_bytes());
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
        let mut fw_info = firmware_info(&config);
        fw_info.firmware_address = U32::new(FLASH_BASE - 0x100);
        fw_info.firmware_size = U32::new(0x100 - 2);

        let found = locator.locate_validation_info(&fw_info, 4).unwrap();
        assert_eq!(found.addr, FLASH_BASE);
        assert!(locator.locate_validation_info(&fw_info, 1).is_none());
    }

    #[test]
    fn test_locate_validation_info_size_overflow() {
        let config = BootConfig::default();
        let data = flash_image(&config, 0);
        let locator = MetadataLocator::new(FlashRegion::new(FLASH_BASE, &data), &config);
        let mut fw_info = firmware_info(&config);
        fw_info.firmware_size = U32::new(u32::MAX);
        assert!(locator.locate_validation_info(&fw_info, 4).is_none());
    }
}
