/*++

Licensed under the Apache-2.0 license.

File Name:

   verify.rs

Abstract:

    File contains implementation of the flash dump verification command.

--*/

use anyhow::{anyhow, Context};
use clap::ArgMatches;
use sb_image_crypto::Crypto;
use sb_image_types::FlashRegion;
use sb_rom::{BootFlow, FlashProvisioning, SlotId};
use std::path::PathBuf;

use crate::config::load_boot_config;

/// Run the command
pub(crate) fn run_cmd(args: &ArgMatches) -> anyhow::Result<()> {
    let flash_path: &PathBuf = args
        .get_one::<PathBuf>("flash")
        .with_context(|| "flash arg not specified")?;

    let flash_base: &u32 = args
        .get_one::<u32>("flash-base")
        .with_context(|| "flash-base arg not specified")?;

    let provision_path: &PathBuf = args
        .get_one::<PathBuf>("provision")
        .with_context(|| "provision arg not specified")?;

    let boot_config = load_boot_config(args.get_one::<PathBuf>("config"))?;

    let flash = std::fs::read(flash_path)
        .with_context(|| format!("Failed to read flash dump {}", flash_path.display()))?;
    let provision = std::fs::read(provision_path).with_context(|| {
        format!("Failed to read provisioning record {}", provision_path.display())
    })?;

    let store = FlashProvisioning::new(&provision)
        .map_err(|err| anyhow!("Invalid provisioning record: 0x{:08x}", u32::from(err)))?;

    let flow = BootFlow::new(
        FlashRegion::new(*flash_base, &flash),
        &store,
        Crypto::default(),
        &boot_config,
    )
    .map_err(|err| anyhow!("Invalid boot configuration: 0x{:08x}", u32::from(err)))?;

    let target = flow
        .select()
        .map_err(|err| anyhow!("No bootable image: 0x{:08x}", u32::from(err)))?;

    let slot = match target.slot {
        SlotId::S0 => "S0",
        SlotId::S1 => "S1",
    };
    println!(
        "Boot slot {slot}: address 0x{:08x}, size {} bytes, version {}",
        target.firmware_address, target.firmware_size, target.firmware_version
    );

    Ok(())
}
