// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Realign aligns the dependencies of a build with an alignment oracle and applies the
//! recorded alignment to the build's files.

#![forbid(unsafe_code)]

use clap::Parser;
use realign::{common::utils::start_logger, Tool};
use std::process::exit;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    start_logger()?;

    // Run the corresponding tool
    let result = Tool::parse().execute().await;

    // Results and errors are both printed as JSON, errors exit with a failure code
    match result {
        Ok(inner) => println!("{}", inner),
        Err(inner) => {
            println!("{}", inner);
            exit(1);
        },
    }
    Ok(())
}
