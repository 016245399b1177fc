/*++

Licensed under the Apache-2.0 license.

File Name:

   main.rs

Abstract:

    Main entry point for the secure boot imaging application

--*/
use std::path::PathBuf;

use clap::{arg, value_parser, ArgAction, Command};

mod config;
mod create;
mod keygen;
mod provision;
mod verify;

/// Parse a decimal or `0x` prefixed hexadecimal address
fn parse_u32(value: &str) -> Result<u32, String> {
    let result = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => value.replace('_', "").parse::<u32>(),
    };
    result.map_err(|err| format!("invalid value {value}: {err}"))
}

fn config_arg() -> clap::Arg {
    arg!(--"config" <FILE> "Boot configuration file (TOML)")
        .required(false)
        .value_parser(value_parser!(PathBuf))
}

/// Entry point
fn main() {
    let sub_cmds = vec![
        Command::new("keygen")
            .about("Generate a new ECDSA P-256 signing key")
            .arg(
                arg!(--"out" <FILE> "Private key output file (PEM)")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                arg!(--"pub-out" <FILE> "Public key output file (PEM)")
                    .required(false)
                    .value_parser(value_parser!(PathBuf)),
            ),
        Command::new("create")
            .about("Create a new signed firmware image")
            .arg(
                arg!(--"key" <FILE> "Private key (PEM)")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                arg!(--"pub-key" <FILE> "Public key (PEM)")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                arg!(--"fw" <FILE> "Firmware binary")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                arg!(--"load-addr" <U32> "Firmware load address")
                    .required(true)
                    .value_parser(parse_u32),
            )
            .arg(
                arg!(--"version" <U32> "Firmware version")
                    .required(true)
                    .value_parser(parse_u32),
            )
            .arg(
                arg!(--"out" <FILE> "Output file")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(config_arg()),
        Command::new("provision")
            .about("Create the provisioning record")
            .arg(
                arg!(--"s0" <U32> "Slot 0 address")
                    .required(true)
                    .value_parser(parse_u32),
            )
            .arg(
                arg!(--"s1" <U32> "Slot 1 address")
                    .required(true)
                    .value_parser(parse_u32),
            )
            .arg(
                arg!(--"pub-key" <FILE> "Trusted public key (PEM); repeat for more keys")
                    .required(true)
                    .action(ArgAction::Append)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                arg!(--"out" <FILE> "Output file")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            ),
        Command::new("verify")
            .about("Select the boot slot of a flash dump")
            .arg(
                arg!(--"flash" <FILE> "Flash dump")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                arg!(--"flash-base" <U32> "Address of the first byte of the dump")
                    .required(true)
                    .value_parser(parse_u32),
            )
            .arg(
                arg!(--"provision" <FILE> "Provisioning record")
                    .required(true)
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(config_arg()),
    ];

    let cmd = Command::new("sb-image-app")
        .arg_required_else_help(true)
        .subcommands(sub_cmds)
        .about("Secure boot imaging tools")
        .get_matches();

    let result = match cmd.subcommand() {
        Some(("keygen", args)) => keygen::run_cmd(args),
        Some(("create", args)) => create::run_cmd(args),
        Some(("provision", args)) => provision::run_cmd(args),
        Some(("verify", args)) => verify::run_cmd(args),
        _ => unreachable!(),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("4096"), Ok(4096));
        assert_eq!(parse_u32("0x8000"), Ok(0x8000));
        assert_eq!(parse_u32("0X0004_0000"), Ok(0x4_0000));
        assert!(parse_u32("0x1_0000_0000").is_err());
        assert!(parse_u32("eight").is_err());
    }
}
