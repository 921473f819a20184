//! Find fat jets, their subjets and filter jets in collider events
//!
//! # How to use
//!
//!     subjet-filter -c CONFIG.toml EVENTFILE
//!
//! The event file contains one particle per line, given by its
//! momentum `px py pz E`. Events are separated by empty lines. All
//! configuration entries are optional, see [subjet_filter::Config].
mod import;
mod opt;

use std::fs;

use crate::import::import;
use crate::opt::Opt;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use subjet_filter::{Config, EventOutput, Producer};

fn main() -> Result<()> {
    let opt = Opt::parse();

    let env = Env::default().filter_or("SUBJET_FILTER_LOG", opt.verbosity.as_str());
    env_logger::init_from_env(env);

    let config = match &opt.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {path:?}"))?;
            Config::from_toml(&content)
                .with_context(|| format!("Invalid configuration in {path:?}"))?
        }
        None => Config::default(),
    };
    debug!("Configuration: {config:#?}");
    let mut producer = Producer::new(&config)?;

    let mut events = Vec::new();
    for file in &opt.files {
        import(file, &mut events)?;
    }
    info!("Processing {} events", events.len());
    for (nevent, particles) in events.iter().enumerate() {
        let out = producer.produce(particles);
        print_event(nevent, &out);
    }
    producer.end_job();
    Ok(())
}

fn print_event(nevent: usize, out: &EventOutput<usize>) {
    println!("event {nevent}: {} fat jets", out.fat_jets.len());
    for (i, jet) in out.fat_jets.iter().enumerate() {
        let p = &jet.p4;
        print!(
            "  fat jet {i}: pt = {:.3} y = {:.3} phi = {:.3} m = {:.3} area = {:.3}",
            p.pt(),
            p.rap(),
            p.phi(),
            p.m(),
            jet.area
        );
        for tau in &out.taus {
            print!(" {} = {:.4}", tau.name(), tau.values[i]);
        }
        println!();
        for daughter in &jet.constituents {
            use subjet_filter::FatJetDaughter::*;
            let (kind, record) = match *daughter {
                Subjet(idx) => ("subjet", &out.subjets[idx]),
                Filterjet(idx) => ("filter jet", &out.filterjets[idx]),
            };
            let p = &record.p4;
            println!(
                "    {kind}: pt = {:.3} y = {:.3} phi = {:.3} m = {:.3} area = {:.3} constituents = {:?}",
                p.pt(),
                p.rap(),
                p.phi(),
                p.m(),
                record.area,
                record.constituents
            );
        }
    }
}
