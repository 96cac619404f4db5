#![allow(dead_code, non_snake_case, non_upper_case_globals)]

use std::path::PathBuf;
use anyhow::Context;
use log::{ info, warn };
use doppler_obe::{
    mkdir,
    config::RunConfig,
    pipeline::SpectrumRun,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();

    let config: RunConfig
        = match std::env::args().nth(1) {
            Some(path) => {
                info!("loading config from {}", path);
                RunConfig::load(&path)
                    .with_context(|| format!("reading config {}", path))?
            },
            None => {
                info!("no config given; using the reference scenario");
                RunConfig::default()
            },
        };

    let outdir = PathBuf::from("output");
    mkdir!(outdir).context("creating output directory")?;

    let run = SpectrumRun::compute(&config)?;
    if !run.doppler.is_valid() {
        warn!(
            "Doppler spectrum undefined at {} detunings",
            run.doppler.invalid_columns().len(),
        );
    }

    let path = outdir.join("doppler_eit.npz");
    run.save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("wrote {}", path.display());

    println!("done");
    Ok(())
}
