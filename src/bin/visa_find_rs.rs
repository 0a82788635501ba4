// visa-io/src/bin/visa_find_rs.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//

//! Rust application to list the VISA resources attached to the system.
//!
//! For each resource matching the search expression, this prints the
//! interface it uses. Set RUST_LOG=debug to trace the calls into the
//! library.
//!

use clap::{Arg, ArgAction, Command};
use std::{env, process};
use visa_io as visa;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    env_logger::init();

    let args = Command::new("visa_find_rs")
        .version(VERSION)
        .author("Frank Pagliughi")
        .about("Rust VISA resource discovery.")
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .short('?')
                .long("help")
                .global(true)
                .action(ArgAction::Help)
                .help("Print help information")
        )
        .arg(
            Arg::new("library")
                .short('l')
                .long("library")
                .action(ArgAction::Set)
                .help("Path to the VISA shared library")
        )
        .arg(
            Arg::new("expr")
                .action(ArgAction::Set)
                .default_value("?*INSTR")
                .help("The VISA search expression")
        )
        .get_matches();

    if let Some(lib) = args.get_one::<String>("library") {
        env::set_var(visa_sys::LIBRARY_PATH_ENV, lib);
    }

    let rm = visa::ResourceManager::new().unwrap_or_else(|err| {
        eprintln!("Error opening the VISA resource manager: {}", err);
        process::exit(1);
    });

    let expr = args
        .get_one::<String>("expr")
        .map(String::as_str)
        .unwrap_or("?*INSTR");

    let names = rm.find_resource(expr).unwrap_or_else(|err| {
        eprintln!("Error searching for '{}': {}", expr, err);
        process::exit(1);
    });

    if names.is_empty() {
        println!("No resources match '{}'", expr);
        return;
    }

    println!("{} resource(s) found:", names.len());
    for name in names {
        match rm.parse_resource(&name) {
            Ok((intf_type, intf_num)) => {
                println!("\t{} [{:?}, interface {}]", name, intf_type, intf_num)
            }
            Err(err) => println!("\t{} [{}]", name, err),
        }
    }
}
