/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    Firmware metadata location and chain of trust verification library.

--*/
#![cfg_attr(not(feature = "std"), no_std)]

mod locator;
mod verifier;

use sb_error::{SbError, SbResult};
use sb_image_types::*;

pub use locator::{Located, MetadataLocator};
pub use verifier::TrustChainVerifier;

/// Image Verification Environment
pub trait ImageVerificationEnv {
    /// Calculate SHA-256 Digest
    fn sha256_digest(&self, data: &[u8]) -> SbResult<ImageDigest>;

    /// Perform ECC-256 Verification of `data`
    fn ecc256_verify(
        &self,
        data: &[u8],
        pub_key: &ImageEccPubKey,
        sig: &ImageEccSignature,
    ) -> SbResult<bool>;
}

impl<T: ImageVerificationEnv + ?Sized> ImageVerificationEnv for &T {
    fn sha256_digest(&self, data: &[u8]) -> SbResult<ImageDigest> {
        (**self).sha256_digest(data)
    }

    fn ecc256_verify(
        &self,
        data: &[u8],
        pub_key: &ImageEccPubKey,
        sig: &ImageEccSignature,
    ) -> SbResult<bool> {
        (**self).ecc256_verify(data, pub_key, sig)
    }
}

/// Trust chain violation
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VerificationError {
    /// Firmware digest lies (partly) outside the signed metadata
    HashOutOfBounds,

    /// Digest of the public key differs from the provisioned digest
    PublicKeyHashMismatch,

    /// Metadata signature did not verify under the public key
    SignatureInvalid,

    /// Digest of the firmware differs from the signed digest
    FirmwareHashInvalid,
}

impl From<VerificationError> for SbError {
    fn from(err: VerificationError) -> SbError {
        match err {
            VerificationError::HashOutOfBounds => SbError::IMAGE_VERIFIER_ERR_HASH_OUT_OF_BOUNDS,
            VerificationError::PublicKeyHashMismatch => {
                SbError::IMAGE_VERIFIER_ERR_PUB_KEY_DIGEST_MISMATCH
            }
            VerificationError::SignatureInvalid => SbError::IMAGE_VERIFIER_ERR_SIGNATURE_INVALID,
            VerificationError::FirmwareHashInvalid => {
                SbError::IMAGE_VERIFIER_ERR_FIRMWARE_DIGEST_MISMATCH
            }
        }
    }
}

/// Trust verdict for a candidate image
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VerificationResult {
    Trusted,
    PublicKeyHashMismatch,
    SignatureInvalid,
    FirmwareHashInvalid,
    HashOutOfBounds,
}

impl VerificationResult {
    pub fn is_trusted(&self) -> bool {
        *self == VerificationResult::Trusted
    }
}

impl From<Result<(), VerificationError>> for VerificationResult {
    fn from(result: Result<(), VerificationError>) -> Self {
        match result {
            Ok(()) => VerificationResult::Trusted,
            Err(VerificationError::HashOutOfBounds) => VerificationResult::HashOutOfBounds,
            Err(VerificationError::PublicKeyHashMismatch) => {
                VerificationResult::PublicKeyHashMismatch
            }
            Err(VerificationError::SignatureInvalid) => VerificationResult::SignatureInvalid,
            Err(VerificationError::FirmwareHashInvalid) => VerificationResult::FirmwareHashInvalid,
        }
    }
}
