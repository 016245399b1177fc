/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    Signed image package and provisioning record serialization routines.

--*/
use sb_image_types::*;
use std::io::Write;
use zerocopy::IntoBytes;

/// Value of erased flash, used for the alignment padding
pub const ERASED_FLASH_BYTE: u8 = 0xff;

/// Image Package Writer
pub struct ImagePackageWriter<W: Write> {
    writer: W,
}

impl<W: Write> ImagePackageWriter<W> {
    /// Create an instance of `ImagePackageWriter`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write `firmware | padding | validation info`
    pub fn write(&mut self, package: &ImagePackage) -> anyhow::Result<()> {
        self.writer.write_all(&package.firmware)?;
        self.writer
            .write_all(&vec![ERASED_FLASH_BYTE; package.padding])?;
        self.writer
            .write_all(package.validation_info.as_bytes())?;
        Ok(())
    }
}

/// Provisioning Record Writer
pub struct ProvisionDataWriter<W: Write> {
    writer: W,
}

impl<W: Write> ProvisionDataWriter<W> {
    /// Create an instance of `ProvisionDataWriter`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the header followed by the public key digests
    pub fn write(&mut self, data: &ProvisionData) -> anyhow::Result<()> {
        self.writer.write_all(data.header.as_bytes())?;
        for digest in &data.pub_key_digests {
            self.writer.write_all(digest)?;
        }
        Ok(())
    }
}
