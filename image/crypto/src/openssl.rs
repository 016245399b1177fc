/*++

Licensed under the Apache-2.0 license.

File Name:

   openssl.rs

Abstract:

    SHA-256 and ECDSA P-256 backend built on OpenSSL.

--*/

use std::path::Path;

use anyhow::Context;
use sb_error::{SbError, SbResult};
use sb_image_gen::ImageGeneratorCrypto;
use sb_image_types::*;
use sb_image_verify::ImageVerificationEnv;
use zeroize::Zeroizing;

use openssl::{
    bn::{BigNum, BigNumContext, BigNumRef},
    ec::{EcGroup, EcKey, EcPoint},
    ecdsa::EcdsaSig,
    hash::{hash, MessageDigest},
    nid::Nid,
    pkey::Public,
    sha::sha256,
};

#[derive(Default, Clone, Copy)]
pub struct OsslCrypto {}

impl OsslCrypto {
    fn group() -> Result<EcGroup, openssl::error::ErrorStack> {
        EcGroup::from_curve_name(Nid::X9_62_PRIME256V1)
    }

    fn public_key(pub_key: &ImageEccPubKey) -> Result<EcKey<Public>, openssl::error::ErrorStack> {
        let group = Self::group()?;
        let x = BigNum::from_slice(&pub_key.x)?;
        let y = BigNum::from_slice(&pub_key.y)?;
        EcKey::from_public_key_affine_coordinates(&group, &x, &y)
    }

    fn scalar(value: &BigNumRef) -> anyhow::Result<ImageScalar> {
        let bytes = value.to_vec_padded(ECC256_SCALAR_BYTE_SIZE as i32)?;
        Ok(bytes.as_slice().try_into()?)
    }
}

impl ImageVerificationEnv for OsslCrypto {
    fn sha256_digest(&self, data: &[u8]) -> SbResult<ImageDigest> {
        let digest =
            hash(MessageDigest::sha256(), data).map_err(|_| SbError::DRIVER_CRYPTO_SHA256_FAILURE)?;
        digest[..]
            .try_into()
            .map_err(|_| SbError::DRIVER_CRYPTO_SHA256_FAILURE)
    }

    fn ecc256_verify(
        &self,
        data: &[u8],
        pub_key: &ImageEccPubKey,
        sig: &ImageEccSignature,
    ) -> SbResult<bool> {
        let key =
            Self::public_key(pub_key).map_err(|_| SbError::DRIVER_CRYPTO_ECC256_INVALID_PUB_KEY)?;

        let r = BigNum::from_slice(&sig.r);
        let s = BigNum::from_slice(&sig.s);
        let sig = match (r, s) {
            (Ok(r), Ok(s)) => EcdsaSig::from_private_components(r, s)
                .map_err(|_| SbError::DRIVER_CRYPTO_ECC256_INVALID_SIGNATURE)?,
            _ => return Err(SbError::DRIVER_CRYPTO_ECC256_INVALID_SIGNATURE),
        };

        sig.verify(&sha256(data), &key)
            .map_err(|_| SbError::DRIVER_CRYPTO_ECC256_VERIFY_FAILURE)
    }
}

impl ImageGeneratorCrypto for OsslCrypto {
    fn sha256_digest(&self, data: &[u8]) -> anyhow::Result<ImageDigest> {
        Ok(sha256(data))
    }

    fn ecdsa256_sign(
        &self,
        digest: &ImageDigest,
        priv_key: &ImageEccPrivKey,
        pub_key: &ImageEccPubKey,
    ) -> anyhow::Result<ImageEccSignature> {
        let group = Self::group()?;
        let mut ctx = BigNumContext::new()?;

        let priv_key = BigNum::from_slice(&priv_key.0)?;
        let pub_key_x = BigNum::from_slice(&pub_key.x)?;
        let pub_key_y = BigNum::from_slice(&pub_key.y)?;

        let mut pub_key = EcPoint::new(&group)?;
        pub_key.set_affine_coordinates_gfp(&group, &pub_key_x, &pub_key_y, &mut ctx)?;

        let ec_key = EcKey::from_private_components(&group, &priv_key, &pub_key)?;
        let sig = EcdsaSig::sign(digest, &ec_key)?;

        let image_sig = ImageEccSignature {
            r: Self::scalar(sig.r())?,
            s: Self::scalar(sig.s())?,
        };
        Ok(image_sig)
    }

    fn ecc_pub_key_from_pem(path: &Path) -> anyhow::Result<ImageEccPubKey> {
        let key_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read public key PEM file {}", path.display()))?;
        let key = EcKey::public_key_from_pem(&key_bytes)?;
        let group = Self::group()?;
        let mut ctx = BigNumContext::new()?;
        let mut x = BigNum::new()?;
        let mut y = BigNum::new()?;

        key.public_key()
            .affine_coordinates_gfp(&group, &mut x, &mut y, &mut ctx)?;

        let image_key = ImageEccPubKey {
            x: Self::scalar(&x)?,
            y: Self::scalar(&y)?,
        };
        Ok(image_key)
    }

    fn ecc_priv_key_from_pem(path: &Path) -> anyhow::Result<ImageEccPrivKey> {
        let key_bytes = Zeroizing::new(
            std::fs::read(path).with_context(|| {
                format!("Failed to read private key PEM file {}", path.display())
            })?,
        );

        let key = EcKey::private_key_from_pem(&key_bytes)?;

        Ok(ImageEccPrivKey(Self::scalar(key.private_key())?))
    }

    fn ecc_key_pair_pem(&self) -> anyhow::Result<(Zeroizing<String>, String)> {
        let key = EcKey::generate(&Self::group()?)?;
        let priv_pem = Zeroizing::new(String::from_utf8(key.private_key_to_pem()?)?);
        let pub_pem = String::from_utf8(key.public_key_to_pem()?)?;
        Ok((priv_pem, pub_pem))
    }
}
