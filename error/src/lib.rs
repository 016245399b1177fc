/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the secure boot crates for error handling

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// Secure Boot Error Type
/// Derives debug, copy, clone, eq, and partial eq
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SbError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: SbError = SbError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(&'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl SbError {
    /// Create an error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get an SbError from a u32 is to
    /// use `SbError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("SbError cannot be 0"),
        }
    }

    define_error_constants![
        (
            DRIVER_CRYPTO_SHA256_FAILURE,
            0x00030001,
            "Driver Error: SHA-256 backend failure"
        ),
        (
            DRIVER_CRYPTO_ECC256_VERIFY_FAILURE,
            0x00030002,
            "Driver Error: ECC-256 verify backend failure"
        ),
        (
            DRIVER_CRYPTO_ECC256_INVALID_PUB_KEY,
            0x00030003,
            "Driver Error: ECC-256 public key is not a valid curve point"
        ),
        (
            DRIVER_CRYPTO_ECC256_INVALID_SIGNATURE,
            0x00030004,
            "Driver Error: ECC-256 signature scalars are malformed"
        ),
        (
            IMAGE_VERIFIER_ERR_HASH_OUT_OF_BOUNDS,
            0x000b0001,
            "Image Verifier Error: Firmware hash is not inside the signed metadata"
        ),
        (
            IMAGE_VERIFIER_ERR_PUB_KEY_DIGEST_MISMATCH,
            0x000b0002,
            "Image Verifier Error: Public key digest does not match the provisioned digest"
        ),
        (
            IMAGE_VERIFIER_ERR_SIGNATURE_INVALID,
            0x000b0003,
            "Image Verifier Error: Metadata signature is invalid"
        ),
        (
            IMAGE_VERIFIER_ERR_FIRMWARE_DIGEST_MISMATCH,
            0x000b0004,
            "Image Verifier Error: Firmware digest does not match the signed digest"
        ),
        (
            PROVISION_DATA_INVALID,
            0x000c0001,
            "Provisioning Error: Provisioning record is truncated or malformed"
        ),
        (
            PROVISION_NO_PUB_KEY_DIGESTS,
            0x000c0002,
            "Provisioning Error: Provisioning record holds no public key digests"
        ),
        (
            ROM_NO_BOOTABLE_IMAGE,
            0x000d0001,
            "ROM Error: No slot holds a trusted firmware image"
        ),
        (
            ROM_INVALID_CONFIG,
            0x000d0002,
            "ROM Error: Boot configuration is invalid"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::SbError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::SbError(val)
    }
}

impl From<SbError> for core::num::NonZeroU32 {
    fn from(val: SbError) -> Self {
        val.0
    }
}

impl From<SbError> for u32 {
    fn from(val: SbError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for SbError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(SbError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type SbResult<T> = Result<T, SbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_try_from() {
        assert!(SbError::try_from(0).is_err());
        assert_eq!(
            Ok(SbError::IMAGE_VERIFIER_ERR_SIGNATURE_INVALID),
            SbError::try_from(0x000b0003)
        );
    }

    #[test]
    fn test_into_u32() {
        assert_eq!(u32::from(SbError::ROM_NO_BOOTABLE_IMAGE), 0x000d0001);
    }

    #[test]
    fn test_error_constants_uniqueness() {
        let constants = SbError::all_constants();
        let mut error_values = HashSet::new();
        let mut duplicates = Vec::new();

        for (name, value) in constants {
            if !error_values.insert(value) {
                duplicates.push((name, value));
            }
        }

        assert!(
            duplicates.is_empty(),
            "Found duplicate error codes: {:?}",
            duplicates
        );
    }
}
