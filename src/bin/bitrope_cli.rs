//! Small demo binary exercising [`bitrope::bigstring::BigString`] and
//! [`bitrope::bitset::BitSet`] from the command line.
//!
//! Mirrors the teacher's `main.rs`: a `clap::Command` with one
//! subcommand per operation, each just gluing argument parsing onto a
//! couple of library calls.

use bitrope::bigstring::BigString;
use bitrope::bitset::BitSet;
use clap::{arg, crate_version, Command};

const RCH: &str = "unreachable was reached";

fn parse_ints(s: &str) -> Vec<i64> {
    s.split_whitespace().map(|tok| tok.parse::<i64>().expect("not an integer")).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help = "Examples:
---------
Count views:   `bitrope-cli string -i my_text.txt`
Set algebra:   `bitrope-cli bitset -o union -a \"1 2 3\" -b \"2 3 4\"`";

    let ops = ["union", "intersection", "subtracting", "symmetric-difference"];

    let mut main_cmd = Command::new("bitrope-cli")
        .about("Inspect BigString view counts and run BitSet set algebra")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("string")
            .arg(arg!(-i --input <PATH> "UTF-8 text file").required(true))
            .about("report utf8/utf16/scalar/character counts for a text file"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("bitset")
            .arg(arg!(-o --op <OP> "set-algebra operation").value_parser(ops).required(true))
            .arg(arg!(-a --first <INTS> "space-separated integers").required(true))
            .arg(arg!(-b --second <INTS> "space-separated integers").required(true))
            .about("compute a set-algebra operation over two integer lists"),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("string") {
        let path = cmd.get_one::<String>("input").expect(RCH);
        let text = std::fs::read_to_string(path)?;
        let big = BigString::from(text.as_str());
        println!("utf8: {}", big.len_utf8());
        println!("utf16: {}", big.len_utf16());
        println!("scalars: {}", big.len_scalars());
        println!("characters: {}", big.len_characters());
    }

    if let Some(cmd) = matches.subcommand_matches("bitset") {
        let op = cmd.get_one::<String>("op").expect(RCH);
        let a: BitSet = parse_ints(cmd.get_one::<String>("first").expect(RCH)).into_iter().collect();
        let b: BitSet = parse_ints(cmd.get_one::<String>("second").expect(RCH)).into_iter().collect();
        let result = match op.as_str() {
            "union" => a.union(&b),
            "intersection" => a.intersection(&b),
            "subtracting" => a.subtracting(&b),
            "symmetric-difference" => a.symmetric_difference(&b),
            _ => {
                eprintln!("{op} not supported");
                return Err(Box::new(std::fmt::Error));
            }
        };
        println!("{}", result.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" "));
    }

    Ok(())
}
