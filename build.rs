#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use std::path::Path;

use anyhow::bail;
use anyhow::Result;
use vergen::EmitBuilder;

const PERSONA_PATH: &str = "./assets/persona.txt";

fn check_persona() -> Result<()> {
    if !Path::new(PERSONA_PATH).exists() {
        bail!(format!("Default persona is missing at {PERSONA_PATH}"));
    }

    println!("cargo:rerun-if-changed={PERSONA_PATH}");
    return Ok(());
}

fn main() -> Result<()> {
    EmitBuilder::builder().build_timestamp().emit()?;
    check_persona()?;

    return Ok(());
}
