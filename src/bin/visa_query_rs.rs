// visa-io/src/bin/visa_query_rs.rs
//
// Copyright (c) 2026, Frank Pagliughi
//
// Licensed under the MIT license:
//   <LICENSE or http://opensource.org/licenses/MIT>
// This file may not be copied, modified, or distributed except according
// to those terms.
//

//! Rust application to send a command to a VISA instrument and print the
//! reply.
//!
//! Example:
//!   visa_query_rs GPIB0::12::INSTR '*IDN?'
//!

use clap::{value_parser, Arg, ArgAction, Command};
use std::{env, process, time::Duration};
use visa_io as visa;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    env_logger::init();

    let args = Command::new("visa_query_rs")
        .version(VERSION)
        .author("Frank Pagliughi")
        .about("Rust VISA instrument query.")
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
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .action(ArgAction::Set)
                .value_parser(value_parser!(u64))
                .help("Open timeout in milliseconds [default: 1000]")
        )
        .arg(
            Arg::new("exclusive")
                .short('x')
                .long("exclusive")
                .action(ArgAction::SetTrue)
                .help("Hold an exclusive lock on the instrument")
        )
        .arg(
            Arg::new("max")
                .short('m')
                .long("max")
                .action(ArgAction::Set)
                .value_parser(value_parser!(usize))
                .help("Make a single read of at most this many bytes")
        )
        .arg(
            Arg::new("local")
                .short('L')
                .long("local")
                .action(ArgAction::SetTrue)
                .help("Return a GPIB instrument to local control when done")
        )
        .arg(
            Arg::new("resource")
                .required(true)
                .action(ArgAction::Set)
                .help("The resource descriptor of the instrument")
        )
        .arg(
            Arg::new("command")
                .required(true)
                .action(ArgAction::Set)
                .help("The command to send; a newline is appended")
        )
        .get_matches();

    if let Some(lib) = args.get_one::<String>("library") {
        env::set_var(visa_sys::LIBRARY_PATH_ENV, lib);
    }

    let name = args.get_one::<String>("resource").cloned().unwrap_or_default();
    let cmd = args.get_one::<String>("command").cloned().unwrap_or_default();
    let exclusive = args.get_one::<bool>("exclusive").copied().unwrap_or(false);
    let local = args.get_one::<bool>("local").copied().unwrap_or(false);

    let mut opts = visa::OpenOptions::new().exclusive_lock(exclusive);
    if let Some(&ms) = args.get_one::<u64>("timeout") {
        opts = opts.timeout(Duration::from_millis(ms));
    }

    if let Err(err) = run(&name, &cmd, &opts, args.get_one::<usize>("max").copied(), local) {
        eprintln!("Error querying '{}': {}", name, err);
        process::exit(1);
    }
}

fn run(
    name: &str,
    cmd: &str,
    opts: &visa::OpenOptions,
    max: Option<usize>,
    local: bool,
) -> visa::Result<()> {
    let rm = visa::ResourceManager::new()?;
    let res = rm.open_with(name, opts)?;

    let msg = format!("{}\n", cmd);
    res.write_all(msg.as_bytes())?;

    let reply = match max {
        Some(n) => res.read(n)?,
        None => res.read_to_end()?,
    };
    println!("{}", String::from_utf8_lossy(&reply).trim_end());

    if local {
        res.set_local()?;
    }
    res.close()
}
