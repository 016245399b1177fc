/*++

Licensed under the Apache-2.0 license.

File Name:

   provision.rs

Abstract:

    File contains implementation of the provisioning record creation command.

--*/

use anyhow::Context;
use clap::ArgMatches;
use sb_image_crypto::Crypto;
use sb_image_gen::{ImageGenerator, ImageGeneratorCrypto};
use sb_image_serde::ProvisionDataWriter;
use std::path::PathBuf;

/// Run the command
pub(crate) fn run_cmd(args: &ArgMatches) -> anyhow::Result<()> {
    let s0_address: &u32 = args
        .get_one::<u32>("s0")
        .with_context(|| "s0 arg not specified")?;

    let s1_address: &u32 = args
        .get_one::<u32>("s1")
        .with_context(|| "s1 arg not specified")?;

    let pub_keys = args
        .get_many::<PathBuf>("pub-key")
        .with_context(|| "pub-key arg not specified")?
        .map(|path| Crypto::ecc_pub_key_from_pem(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let out_path: &PathBuf = args
        .get_one::<PathBuf>("out")
        .with_context(|| "out arg not specified")?;

    let gen = ImageGenerator::new(Crypto::default());
    let data = gen.gen_provision_data(*s0_address, *s1_address, &pub_keys)?;

    let mut record = Vec::new();
    ProvisionDataWriter::new(&mut record).write(&data)?;
    std::fs::write(out_path, &record)
        .with_context(|| format!("Failed to write file {}", out_path.display()))?;

    for (index, digest) in data.pub_key_digests.iter().enumerate() {
        println!("Public key digest {index}: {}", hex::encode(digest));
    }

    Ok(())
}
