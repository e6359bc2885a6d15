//! Prints the statistics overlay for one or more glTF/GLB assets.
//!
//! Every file is loaded into the same viewer in turn, so each one runs a
//! separate load cycle exactly like a page swapping models.

#[cfg(not(target_arch = "wasm32"))]
mod cli_opt;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use model_stats::{ModelStats, ModelViewer};

    model_stats::init_logging();
    let opt = cli_opt::CliOpt::parse();
    let config = opt.to_config();

    let mut viewer = ModelViewer::new();
    let mut stats = ModelStats::attach(&mut viewer, config);

    let mut failures = 0;
    for src in &opt.sources {
        if let Err(err) = viewer.load(src).await {
            log::error!("could not load {}: {:#}", src, err);
            failures += 1;
            continue;
        }
        stats.process_loads(&viewer).await;
        println!("{}", src);
        print!("{}", stats);
        println!();
    }

    if failures > 0 {
        anyhow::bail!("{} of {} assets failed to load", failures, opt.sources.len());
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
