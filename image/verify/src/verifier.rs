/*++

Licensed under the Apache-2.0 license.

File Name:

    verifier.rs

Abstract:

    This file is the main implementation of the chain of trust verifier.

--*/

use crate::*;
use constant_time_eq::constant_time_eq;
use sb_image_types::*;
use zerocopy::IntoBytes;

/// Trust Chain Verifier
pub struct TrustChainVerifier<Env: ImageVerificationEnv> {
    /// Verification Environment
    env: Env,
}

impl<Env: ImageVerificationEnv> TrustChainVerifier<Env> {
    /// Create a new instance `TrustChainVerifier`
    ///
    /// # Arguments
    ///
    /// * `env` - Environment
    pub fn new(env: Env) -> Self {
        Self { env }
    }

    /// Verify the chain of trust of a firmware image
    ///
    /// # Arguments
    ///
    /// * `pub_key`            - Public key embedded in the metadata
    /// * `pub_key_digest`     - Provisioned digest of the public key
    /// * `metadata`           - Signed metadata bytes and their flash address
    /// * `sig`                - Signature over `metadata`
    /// * `firmware`           - Firmware bytes
    /// * `firmware_hash_addr` - Flash address of the expected firmware digest
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every check passed; the firmware may be booted
    pub fn verify(
        &self,
        pub_key: &ImageEccPubKey,
        pub_key_digest: &ImageDigest,
        metadata: FlashRegion<'_>,
        sig: &ImageEccSignature,
        firmware: &[u8],
        firmware_hash_addr: u32,
    ) -> Result<(), VerificationError> {
        // The trusted digest must itself be covered by the signature
        let firmware_hash = metadata
            .read(firmware_hash_addr, SHA256_DIGEST_BYTE_SIZE)
            .ok_or(VerificationError::HashOutOfBounds)?;

        self.verify_pub_key_digest(pub_key, pub_key_digest)?;

        self.verify_signature(metadata.data(), pub_key, sig)?;

        self.verify_firmware_digest(firmware, firmware_hash)
    }

    /// Verify a located validation info against `firmware`
    ///
    /// The signed part of the record is used as the metadata and the digest
    /// stored in the record as the expected firmware digest.
    pub fn verify_validation_info(
        &self,
        validation_info: Located<'_, ValidationInfo>,
        pub_key_digest: &ImageDigest,
        firmware: &[u8],
    ) -> Result<(), VerificationError> {
        let bytes = &validation_info.info.as_bytes()[ValidationInfo::signed_range()];
        let metadata = FlashRegion::new(validation_info.addr, bytes);

        let hash_offset = ValidationInfo::firmware_hash_range().start as u32;
        let firmware_hash_addr = validation_info
            .addr
            .checked_add(hash_offset)
            .ok_or(VerificationError::HashOutOfBounds)?;

        self.verify(
            &validation_info.public_key,
            pub_key_digest,
            metadata,
            &validation_info.signature,
            firmware,
            firmware_hash_addr,
        )
    }

    /// Verify public key digest
    fn verify_pub_key_digest(
        &self,
        pub_key: &ImageEccPubKey,
        expected: &ImageDigest,
    ) -> Result<(), VerificationError> {
        let actual = self
            .env
            .sha256_digest(pub_key.as_bytes())
            .map_err(|_| VerificationError::PublicKeyHashMismatch)?;

        if !constant_time_eq(&actual, expected) {
            return Err(VerificationError::PublicKeyHashMismatch);
        }

        Ok(())
    }

    /// Verify metadata signature
    fn verify_signature(
        &self,
        metadata: &[u8],
        pub_key: &ImageEccPubKey,
        sig: &ImageEccSignature,
    ) -> Result<(), VerificationError> {
        let verified = self
            .env
            .ecc256_verify(metadata, pub_key, sig)
            .map_err(|_| VerificationError::SignatureInvalid)?;

        if !verified {
            return Err(VerificationError::SignatureInvalid);
        }

        Ok(())
    }

    /// Verify firmware digest
    fn verify_firmware_digest(
        &self,
        firmware: &[u8],
        expected: &[u8],
    ) -> Result<(), VerificationError> {
        let actual = self
            .env
            .sha256_digest(firmware)
            .map_err(|_| VerificationError::FirmwareHashInvalid)?;

        if !constant_time_eq(&actual, expected) {
            return Err(VerificationError::FirmwareHashInvalid);
        }

        Ok(())
    }
}
