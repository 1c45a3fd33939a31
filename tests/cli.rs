//! Integration tests for the `bitrope-cli` demo binary (`cli` feature).
//!
//! Only compiled when the `cli` feature is enabled, since the binary
//! itself is feature-gated (`cargo test --features cli`).

#![cfg(feature = "cli")]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

type StdResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn string_subcommand_reports_four_view_counts() -> StdResult {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "ab\u{{0301}}cd")?;

    let mut cmd = Command::cargo_bin("bitrope-cli")?;
    cmd.arg("string").arg("-i").arg(file.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("utf8: 6"))
        .stdout(predicate::str::contains("utf16: 5"))
        .stdout(predicate::str::contains("scalars: 5"))
        .stdout(predicate::str::contains("characters: 4"));
    Ok(())
}

#[test]
fn bitset_subcommand_computes_union() -> StdResult {
    let mut cmd = Command::cargo_bin("bitrope-cli")?;
    cmd.arg("bitset").arg("-o").arg("union").arg("-a").arg("1 2 3").arg("-b").arg("2 3 4");
    cmd.assert().success().stdout(predicate::str::contains("1 2 3 4"));
    Ok(())
}

#[test]
fn bitset_subcommand_computes_intersection() -> StdResult {
    let mut cmd = Command::cargo_bin("bitrope-cli")?;
    cmd.arg("bitset").arg("-o").arg("intersection").arg("-a").arg("1 2 3").arg("-b").arg("2 3 4");
    cmd.assert().success().stdout(predicate::str::contains("2 3"));
    Ok(())
}

#[test]
fn unknown_op_is_rejected_by_clap() -> StdResult {
    let mut cmd = Command::cargo_bin("bitrope-cli")?;
    cmd.arg("bitset").arg("-o").arg("nonsense").arg("-a").arg("1").arg("-b").arg("2");
    cmd.assert().failure();
    Ok(())
}
