/*++

Licensed under the Apache-2.0 license.

File Name:

   rustcrypto.rs

Abstract:

    SHA-256 and ECDSA P-256 backend built on the RustCrypto crates.

--*/

use core::str::from_utf8;
use std::path::Path;

use anyhow::{anyhow, Context};
use sb_error::{SbError, SbResult};
use sb_image_gen::ImageGeneratorCrypto;
use sb_image_types::*;
use sb_image_verify::ImageVerificationEnv;
use zerocopy::{FromBytes, IntoBytes};
use zeroize::Zeroizing;

use {
    ecdsa::signature::{hazmat::PrehashSigner, Verifier},
    p256::{
        ecdsa::{Signature, SigningKey, VerifyingKey},
        elliptic_curve::sec1::ToEncodedPoint,
        pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding},
        EncodedPoint, FieldBytes, PublicKey, SecretKey,
    },
    rand::rngs::OsRng,
    sha2::{Digest, Sha256},
};

#[derive(Default, Clone, Copy)]
pub struct RustCrypto {}

impl RustCrypto {
    fn verifying_key(pub_key: &ImageEccPubKey) -> SbResult<VerifyingKey> {
        let point = EncodedPoint::from_affine_coordinates(
            FieldBytes::from_slice(&pub_key.x),
            FieldBytes::from_slice(&pub_key.y),
            false,
        );
        VerifyingKey::from_encoded_point(&point)
            .map_err(|_| SbError::DRIVER_CRYPTO_ECC256_INVALID_PUB_KEY)
    }

    fn digest(data: &[u8]) -> ImageDigest {
        let mut digest = ImageDigest::default();
        digest.copy_from_slice(&Sha256::digest(data));
        digest
    }
}

impl ImageVerificationEnv for RustCrypto {
    fn sha256_digest(&self, data: &[u8]) -> SbResult<ImageDigest> {
        Ok(Self::digest(data))
    }

    fn ecc256_verify(
        &self,
        data: &[u8],
        pub_key: &ImageEccPubKey,
        sig: &ImageEccSignature,
    ) -> SbResult<bool> {
        let verifying_key = Self::verifying_key(pub_key)?;
        let signature = Signature::from_slice(sig.as_bytes())
            .map_err(|_| SbError::DRIVER_CRYPTO_ECC256_INVALID_SIGNATURE)?;
        Ok(verifying_key.verify(data, &signature).is_ok())
    }
}

impl ImageGeneratorCrypto for RustCrypto {
    fn sha256_digest(&self, data: &[u8]) -> anyhow::Result<ImageDigest> {
        Ok(Self::digest(data))
    }

    fn ecdsa256_sign(
        &self,
        digest: &ImageDigest,
        priv_key: &ImageEccPrivKey,
        _pub_key: &ImageEccPubKey,
    ) -> anyhow::Result<ImageEccSignature> {
        let sig: Signature = SigningKey::from_slice(&priv_key.0)?.sign_prehash(digest)?;

        ImageEccSignature::read_from_bytes(&sig.to_bytes())
            .map_err(|_| anyhow!("Error encoding signature"))
    }

    fn ecc_pub_key_from_pem(path: &Path) -> anyhow::Result<ImageEccPubKey> {
        let key_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read public key PEM file {}", path.display()))?;

        let pub_key =
            PublicKey::from_public_key_pem(from_utf8(&key_bytes)?)?.to_encoded_point(false);

        let x = pub_key.x().ok_or(anyhow!("Error parsing x coordinate"))?;
        let y = pub_key.y().ok_or(anyhow!("Error parsing y coordinate"))?;

        let image_key = ImageEccPubKey {
            x: x.as_slice().try_into()?,
            y: y.as_slice().try_into()?,
        };
        Ok(image_key)
    }

    fn ecc_priv_key_from_pem(path: &Path) -> anyhow::Result<ImageEccPrivKey> {
        let key_bytes = Zeroizing::new(
            std::fs::read(path).with_context(|| {
                format!("Failed to read private key PEM file {}", path.display())
            })?,
        );
        let pem = from_utf8(&key_bytes)?;

        let priv_key = SecretKey::from_sec1_pem(pem).or_else(|_| SecretKey::from_pkcs8_pem(pem))?;

        Ok(ImageEccPrivKey(priv_key.to_bytes().as_slice().try_into()?))
    }

    fn ecc_key_pair_pem(&self) -> anyhow::Result<(Zeroizing<String>, String)> {
        let priv_key = SecretKey::random(&mut OsRng);
        let priv_pem = priv_key.to_sec1_pem(LineEnding::LF)?;
        let pub_pem = priv_key.public_key().to_public_key_pem(LineEnding::LF)?;
        Ok((priv_pem, pub_pem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn key_pair(crypto: &RustCrypto) -> (ImageEccPrivKey, ImageEccPubKey) {
        let dir = tempfile::tempdir().unwrap();
        let (priv_pem, pub_pem) = crypto.ecc_key_pair_pem().unwrap();
        let priv_path = dir.path().join("priv.pem");
        let pub_path = dir.path().join("pub.pem");
        fs::write(&priv_path, priv_pem.as_bytes()).unwrap();
        fs::write(&pub_path, pub_pem.as_bytes()).unwrap();
        (
            RustCrypto::ecc_priv_key_from_pem(&priv_path).unwrap(),
            RustCrypto::ecc_pub_key_from_pem(&pub_path).unwrap(),
        )
    }

    #[test]
    fn test_sha256_digest() {
        let crypto = RustCrypto::default();
        let digest = ImageVerificationEnv::sha256_digest(&crypto, b"abc").unwrap();
        assert_eq!(
            digest,
            [
                0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
                0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
                0xf2, 0x00, 0x15, 0xad
            ]
        );
    }

    #[test]
    fn test_sign_verify() {
        let crypto = RustCrypto::default();
        let (priv_key, pub_key) = key_pair(&crypto);
        let data = b"validation info bytes";

        let digest = ImageGeneratorCrypto::sha256_digest(&crypto, data).unwrap();
        let sig = crypto.ecdsa256_sign(&digest, &priv_key, &pub_key).unwrap();
        assert!(crypto.ecc256_verify(data, &pub_key, &sig).unwrap());

        assert!(!crypto
            .ecc256_verify(b"validation info bytez", &pub_key, &sig)
            .unwrap());

        let mut bad_sig = sig;
        bad_sig.s[31] ^= 0x01;
        assert!(!crypto.ecc256_verify(data, &pub_key, &bad_sig).unwrap());
    }

    #[test]
    fn test_verify_other_key() {
        let crypto = RustCrypto::default();
        let (priv_key, pub_key) = key_pair(&crypto);
        let (_, other_pub_key) = key_pair(&crypto);
        let data = b"firmware";

        let digest = ImageGeneratorCrypto::sha256_digest(&crypto, data).unwrap();
        let sig = crypto.ecdsa256_sign(&digest, &priv_key, &pub_key).unwrap();
        assert!(!crypto.ecc256_verify(data, &other_pub_key, &sig).unwrap());
    }

    #[test]
    fn test_verify_malformed_inputs() {
        let crypto = RustCrypto::default();
        let (_, pub_key) = key_pair(&crypto);

        assert_eq!(
            crypto.ecc256_verify(b"x", &ImageEccPubKey::default(), &ImageEccSignature::default()),
            Err(SbError::DRIVER_CRYPTO_ECC256_INVALID_PUB_KEY)
        );
        assert_eq!(
            crypto.ecc256_verify(b"x", &pub_key, &ImageEccSignature::default()),
            Err(SbError::DRIVER_CRYPTO_ECC256_INVALID_SIGNATURE)
        );
    }

    #[test]
    fn test_pem_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RustCrypto::ecc_pub_key_from_pem(&dir.path().join("absent.pem")).is_err());
        assert!(RustCrypto::ecc_priv_key_from_pem(&dir.path().join("absent.pem")).is_err());
    }
}
