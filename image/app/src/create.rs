/*++

Licensed under the Apache-2.0 license.

File Name:

   create.rs

Abstract:

    File contains implementation of the signed image creation command.

--*/

use anyhow::Context;
use clap::ArgMatches;
use sb_image_crypto::Crypto;
use sb_image_gen::*;
use sb_image_serde::ImagePackageWriter;
use std::path::PathBuf;

use crate::config::load_boot_config;

/// Run the command
pub(crate) fn run_cmd(args: &ArgMatches) -> anyhow::Result<()> {
    let key_path: &PathBuf = args
        .get_one::<PathBuf>("key")
        .with_context(|| "key arg not specified")?;

    let pub_key_path: &PathBuf = args
        .get_one::<PathBuf>("pub-key")
        .with_context(|| "pub-key arg not specified")?;

    let fw_path: &PathBuf = args
        .get_one::<PathBuf>("fw")
        .with_context(|| "fw arg not specified")?;

    let load_addr: &u32 = args
        .get_one::<u32>("load-addr")
        .with_context(|| "load-addr arg not specified")?;

    let version: &u32 = args
        .get_one::<u32>("version")
        .with_context(|| "version arg not specified")?;

    let out_path: &PathBuf = args
        .get_one::<PathBuf>("out")
        .with_context(|| "out arg not specified")?;

    let boot_config = load_boot_config(args.get_one::<PathBuf>("config"))?;

    let content = std::fs::read(fw_path)
        .with_context(|| format!("Failed to read firmware {}", fw_path.display()))?;

    let config = ImageGeneratorConfig {
        boot_config,
        firmware: RawExecutable::new(content, *load_addr, *version),
        pub_key: Crypto::ecc_pub_key_from_pem(pub_key_path)?,
        priv_key: Some(Crypto::ecc_priv_key_from_pem(key_path)?),
    };

    let gen = ImageGenerator::new(Crypto::default());
    let package = gen.generate(&config)?;

    let out_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(out_path)
        .with_context(|| format!("Failed to create file {}", out_path.display()))?;

    let mut writer = ImagePackageWriter::new(out_file);
    writer.write(&package)?;

    println!(
        "Firmware size {} bytes, padding {} bytes, digest {}",
        package.firmware.len(),
        package.padding,
        hex::encode(package.validation_info.firmware_hash)
    );

    Ok(())
}
