use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use piedrill::catalog::{self, verify_all};
use piedrill::CozyOracle;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "verify-catalog", about = "Compile every opening line and report the ones that do not resolve")]
struct Args {
    /// JSON catalog to check; the built-in catalog when omitted
    #[arg(value_name = "CATALOG")]
    catalog: Option<PathBuf>,
    /// Worker threads (0 = rayon default)
    #[arg(long, default_value_t = 0)]
    threads: usize,
    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let openings = match &args.catalog {
        Some(path) => catalog::load_json(path).with_context(|| format!("loading {}", path.display()))?,
        None => catalog::get_chess_openings(),
    };
    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(args.threads).build_global()?;
    }

    let pb = ProgressBar::new(openings.len() as u64);
    pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} openings")?);
    let results = verify_all(&CozyOracle, &openings, Some(&pb));
    pb.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for r in &results {
            match &r.error {
                None => println!("ok    {:<24} {} plies", r.id, r.plies),
                Some(e) => println!("FAIL  {:<24} {}", r.id, e),
            }
        }
    }
    let failed = results.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} openings failed to compile", failed, results.len());
    }
    eprintln!("All {} openings compile", results.len());
    Ok(())
}
