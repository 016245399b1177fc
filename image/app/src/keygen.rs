/*++

Licensed under the Apache-2.0 license.

File Name:

   keygen.rs

Abstract:

    File contains implementation of the signing key generation command.

--*/

use anyhow::Context;
use clap::ArgMatches;
use sb_image_crypto::Crypto;
use sb_image_gen::{ImageGenerator, ImageGeneratorCrypto};
use std::path::PathBuf;

/// Run the command
pub(crate) fn run_cmd(args: &ArgMatches) -> anyhow::Result<()> {
    let out_path: &PathBuf = args
        .get_one::<PathBuf>("out")
        .with_context(|| "out arg not specified")?;

    let crypto = Crypto::default();
    let (priv_pem, pub_pem) = crypto.ecc_key_pair_pem()?;

    std::fs::write(out_path, priv_pem.as_bytes())
        .with_context(|| format!("Failed to write private key {}", out_path.display()))?;

    // Public key digest is what gets provisioned
    match args.get_one::<PathBuf>("pub-out") {
        Some(pub_path) => {
            std::fs::write(pub_path, pub_pem.as_bytes())
                .with_context(|| format!("Failed to write public key {}", pub_path.display()))?;
            let pub_key = Crypto::ecc_pub_key_from_pem(pub_path)?;
            let digest = ImageGenerator::new(crypto).pub_key_digest(&pub_key)?;
            println!("Public key digest: {}", hex::encode(digest));
        }
        None => print!("{pub_pem}"),
    }

    Ok(())
}
