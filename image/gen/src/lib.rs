/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    File contains data structures for the firmware image generator.

--*/

mod generator;

pub use generator::ImageGenerator;

use sb_image_types::*;
use std::path::Path;
use zeroize::Zeroizing;

/// Image Generator Executable
pub trait ImageGeneratorExecutable {
    /// Executable Version Number
    fn version(&self) -> u32;

    /// Executable Load Address
    fn load_addr(&self) -> u32;

    /// Executable Content
    fn content(&self) -> &Vec<u8>;
}

/// Image Generator Crypto Trait
pub trait ImageGeneratorCrypto {
    /// Calculate SHA-256 digest
    fn sha256_digest(&self, data: &[u8]) -> anyhow::Result<ImageDigest>;

    /// Calculate ECDSA P-256 signature over a SHA-256 digest
    fn ecdsa256_sign(
        &self,
        digest: &ImageDigest,
        priv_key: &ImageEccPrivKey,
        pub_key: &ImageEccPubKey,
    ) -> anyhow::Result<ImageEccSignature>;

    /// Read ECC-256 Public Key from PEM file
    fn ecc_pub_key_from_pem(path: &Path) -> anyhow::Result<ImageEccPubKey>;

    /// Read ECC-256 Private Key from PEM file
    fn ecc_priv_key_from_pem(path: &Path) -> anyhow::Result<ImageEccPrivKey>;

    /// Generate a fresh ECC-256 key pair
    ///
    /// # Returns
    ///
    /// * `(private key PEM, public key PEM)`
    fn ecc_key_pair_pem(&self) -> anyhow::Result<(Zeroizing<String>, String)>;
}

/// Flat firmware binary linked to run at `load_addr`
#[derive(Default, Clone)]
pub struct RawExecutable {
    content: Vec<u8>,
    load_addr: u32,
    version: u32,
}

impl RawExecutable {
    pub fn new(content: Vec<u8>, load_addr: u32, version: u32) -> Self {
        Self {
            content,
            load_addr,
            version,
        }
    }
}

impl ImageGeneratorExecutable for RawExecutable {
    fn version(&self) -> u32 {
        self.version
    }

    fn load_addr(&self) -> u32 {
        self.load_addr
    }

    fn content(&self) -> &Vec<u8> {
        &self.content
    }
}

/// Image Generator Configuration
#[derive(Default)]
pub struct ImageGeneratorConfig<T>
where
    T: ImageGeneratorExecutable,
{
    pub boot_config: BootConfig,

    pub firmware: T,

    pub pub_key: ImageEccPubKey,

    /// Image is left unsigned when absent
    pub priv_key: Option<ImageEccPrivKey>,
}
