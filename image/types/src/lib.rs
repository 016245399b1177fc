/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    File contains data structures for the firmware metadata records embedded
    in flash and the provisioning record.

--*/

#![cfg_attr(not(feature = "std"), no_std)]

mod flash;

use core::ops::Range;

use memoffset::span_of;
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use flash::FlashRegion;

pub const SHA256_DIGEST_BYTE_SIZE: usize = 32;
pub const ECC256_SCALAR_BYTE_SIZE: usize = 32;
pub const ECC256_PUB_KEY_BYTE_SIZE: usize = 2 * ECC256_SCALAR_BYTE_SIZE;
pub const ECC256_SIGNATURE_BYTE_SIZE: usize = 2 * ECC256_SCALAR_BYTE_SIZE;
pub const MAGIC_WORD_SIZE: usize = 3;
pub const MAGIC_BYTE_SIZE: usize = MAGIC_WORD_SIZE * 4;
pub const FIRMWARE_INFO_BYTE_SIZE: usize = core::mem::size_of::<FirmwareInfo>();
pub const VALIDATION_INFO_BYTE_SIZE: usize = core::mem::size_of::<ValidationInfo>();
pub const PROVISION_DATA_HEADER_BYTE_SIZE: usize = core::mem::size_of::<ProvisionDataHeader>();

/// Offset inside a firmware at which the firmware info is found
pub const FIRMWARE_INFO_OFFSET: u32 = 0x800;
pub const DEFAULT_VALIDATION_SEARCH_DISTANCE: u32 = 4;
pub const DEFAULT_VALIDATION_INFO_ALIGNMENT: u32 = 4;
pub const MAX_PUB_KEY_DIGEST_COUNT: usize = 5;

pub const MAGIC_COMMON: u32 = 0x281e_e6de;
pub const MAGIC_FIRMWARE_INFO: u32 = 0x8fce_bb4c;
pub const MAGIC_VALIDATION_INFO: u32 = 0x8651_8483;
pub const MAGIC_VALIDATION_POINTER: u32 = 0x6919_b47e;

pub const INFO_FORMAT_VERSION: u8 = 1;
pub const DEFAULT_HARDWARE_ID: u8 = 0x52;
pub const SIG_ALG_ECDSA_P256_SHA256: u8 = 1;

pub type ImageDigest = [u8; SHA256_DIGEST_BYTE_SIZE];
pub type ImageScalar = [u8; ECC256_SCALAR_BYTE_SIZE];

#[repr(C)]
#[derive(
    IntoBytes,
    FromBytes,
    Immutable,
    KnownLayout,
    Unaligned,
    Default,
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
)]
pub struct ImageEccPubKey {
    /// X Coordinate
    pub x: ImageScalar,

    /// Y Coordinate
    pub y: ImageScalar,
}

#[repr(C)]
#[derive(
    IntoBytes,
    FromBytes,
    Immutable,
    KnownLayout,
    Unaligned,
    Default,
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
)]
pub struct ImageEccSignature {
    /// Random point
    pub r: ImageScalar,

    /// Proof
    pub s: ImageScalar,
}

#[derive(Default, Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct ImageEccPrivKey(pub ImageScalar);

/// Closed set of magic tagged record kinds
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MetadataKind {
    /// Firmware info, embedded inside the firmware
    FirmwareInfo,

    /// Validation info, placed after the firmware
    ValidationInfo,

    /// Pointer to a validation info placed elsewhere
    ValidationPointer,
}

impl MetadataKind {
    /// Type word of the kind
    pub const fn type_tag(self) -> u32 {
        match self {
            MetadataKind::FirmwareInfo => MAGIC_FIRMWARE_INFO,
            MetadataKind::ValidationInfo => MAGIC_VALIDATION_INFO,
            MetadataKind::ValidationPointer => MAGIC_VALIDATION_POINTER,
        }
    }

    fn from_type_tag(tag: u32) -> Option<Self> {
        match tag {
            MAGIC_FIRMWARE_INFO => Some(MetadataKind::FirmwareInfo),
            MAGIC_VALIDATION_INFO => Some(MetadataKind::ValidationInfo),
            MAGIC_VALIDATION_POINTER => Some(MetadataKind::ValidationPointer),
            _ => None,
        }
    }
}

/// Packed `{format_version, hardware_id, signature_algorithm_id}` word
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MagicCompatibility {
    pub format_version: u8,
    pub hardware_id: u8,
    pub signature_algorithm_id: u8,
}

impl MagicCompatibility {
    pub const fn word(&self) -> u32 {
        self.format_version as u32
            | (self.hardware_id as u32) << 8
            | (self.signature_algorithm_id as u32) << 16
    }
}

impl Default for MagicCompatibility {
    fn default() -> Self {
        Self {
            format_version: INFO_FORMAT_VERSION,
            hardware_id: DEFAULT_HARDWARE_ID,
            signature_algorithm_id: SIG_ALG_ECDSA_P256_SHA256,
        }
    }
}

/// Three word magic tag
#[repr(C)]
#[derive(
    IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned, Default, Debug, Copy, Clone, Eq, PartialEq,
)]
pub struct ImageMagic {
    common: U32,
    type_tag: U32,
    compatibility: U32,
}

impl ImageMagic {
    /// Create the reference magic for `kind`
    pub fn new(kind: MetadataKind, compat: &MagicCompatibility) -> Self {
        Self {
            common: U32::new(MAGIC_COMMON),
            type_tag: U32::new(kind.type_tag()),
            compatibility: U32::new(compat.word()),
        }
    }

    /// Decode the record kind.
    ///
    /// All three words are read before any is judged. Returns `None` unless the
    /// common word and the compatibility word match exactly and the type word
    /// names a known kind.
    pub fn decode(&self, compat: &MagicCompatibility) -> Option<MetadataKind> {
        let [common, type_tag, compatibility] =
            [self.common.get(), self.type_tag.get(), self.compatibility.get()];
        let kind = MetadataKind::from_type_tag(type_tag);
        if common != MAGIC_COMMON || compatibility != compat.word() {
            return None;
        }
        kind
    }

    /// Returns true only on an exact three word match with the reference magic
    pub fn is(&self, kind: MetadataKind, compat: &MagicCompatibility) -> bool {
        self.decode(compat) == Some(kind)
    }
}

/// Firmware info, embedded at a fixed offset inside the firmware
#[repr(C)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned, Default, Debug, Clone, Copy)]
pub struct FirmwareInfo {
    pub magic: ImageMagic,

    /// Size without validation info and padding
    pub firmware_size: U32,

    /// Monotonically increasing version counter
    pub firmware_version: U32,

    /// Address of the start (vector table) of the firmware
    pub firmware_address: U32,
}

impl FirmwareInfo {
    pub fn firmware_size(&self) -> u32 {
        self.firmware_size.get()
    }

    pub fn firmware_version(&self) -> u32 {
        self.firmware_version.get()
    }

    pub fn firmware_address(&self) -> u32 {
        self.firmware_address.get()
    }
}

/// Validation info, placed after the firmware and its alignment padding
#[repr(C)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned, Default, Debug, Clone, Copy)]
pub struct ValidationInfo {
    pub magic: ImageMagic,

    /// Address of the start (vector table) of the firmware
    pub firmware_address: U32,

    /// Digest of the firmware
    pub firmware_hash: ImageDigest,

    /// Key the signature is checked with; must match a provisioned digest
    pub public_key: ImageEccPubKey,

    /// Signature over `signed_range()`
    pub signature: ImageEccSignature,
}

impl ValidationInfo {
    pub fn firmware_address(&self) -> u32 {
        self.firmware_address.get()
    }

    /// Returns the `Range<usize>` of the record covered by the signature
    pub fn signed_range() -> Range<usize> {
        span_of!(ValidationInfo, magic..=firmware_hash)
    }

    /// Returns the `Range<usize>` of the firmware digest
    pub fn firmware_hash_range() -> Range<usize> {
        span_of!(ValidationInfo, firmware_hash)
    }
}

/// Makes a validation info discoverable from another location
#[repr(C)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned, Default, Debug, Clone, Copy)]
pub struct ValidationPointer {
    pub magic: ImageMagic,

    pub validation_info_address: U32,
}

/// Fixed part of the provisioning record; followed by the public key digests
#[repr(C)]
#[derive(IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned, Default, Debug, Clone, Copy)]
pub struct ProvisionDataHeader {
    pub s0_address: U32,

    pub s1_address: U32,
}

/// Integrator supplied boot configuration
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(
    feature = "std",
    derive(serde_derive::Serialize, serde_derive::Deserialize),
    serde(default)
)]
pub struct BootConfig {
    pub format_version: u8,

    pub hardware_id: u8,

    pub signature_algorithm_id: u8,

    pub firmware_info_offset: u32,

    /// Bytes probed past the declared firmware end. Always finite.
    pub validation_search_distance: u32,

    pub validation_info_alignment: u32,
}

impl BootConfig {
    pub fn compatibility(&self) -> MagicCompatibility {
        MagicCompatibility {
            format_version: self.format_version,
            hardware_id: self.hardware_id,
            signature_algorithm_id: self.signature_algorithm_id,
        }
    }

    /// Alignment padding never runs past the search distance
    pub fn is_valid(&self) -> bool {
        self.validation_info_alignment != 0
            && self.validation_info_alignment.is_power_of_two()
            && self.validation_info_alignment - 1 <= self.validation_search_distance
    }
}

impl Default for BootConfig {
    fn default() -> Self {
        let compat = MagicCompatibility::default();
        Self {
            format_version: compat.format_version,
            hardware_id: compat.hardware_id,
            signature_algorithm_id: compat.signature_algorithm_id,
            firmware_info_offset: FIRMWARE_INFO_OFFSET,
            validation_search_distance: DEFAULT_VALIDATION_SEARCH_DISTANCE,
            validation_info_alignment: DEFAULT_VALIDATION_INFO_ALIGNMENT,
        }
    }
}

/// Signed firmware package: `firmware | padding | validation_info`
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone)]
pub struct ImagePackage {
    /// Firmware with the firmware info stamped in
    pub firmware: Vec<u8>,

    /// Alignment padding in front of the validation info
    pub padding: usize,

    pub validation_info: ValidationInfo,
}

/// Provisioning record contents
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone)]
pub struct ProvisionData {
    pub header: ProvisionDataHeader,

    pub pub_key_digests: Vec<ImageDigest>,
}
