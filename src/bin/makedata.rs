//! Make some data with the coalescent simulator.

use anyhow::Result;
use clap::Parser;

use coalrustts::{sim_ancestry, AncestryParams};

#[derive(Parser, Debug)]
#[command(about = "Make some data with the coalescent simulator")]
struct Args {
    /// Number of diploid samples
    #[arg(long)]
    nsamples: u32,
    /// Sequence length
    #[arg(long, default_value_t = 100_000_000)]
    seqlen: i64,
    /// Rec rate per "base pair"
    #[arg(long, default_value_t = 1e-9)]
    recrate: f64,
    /// Population size
    #[arg(long, default_value_t = 10_000)]
    popsize: u32,
    /// Output file name
    #[arg(long, default_value = "treefile.trees")]
    treefile: String,
    /// Random number seed.  A random seed is used if not given.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let seed = match args.seed {
        Some(seed) => seed,
        None => rand::random(),
    };
    let params = AncestryParams {
        num_samples: args.nsamples,
        sequence_length: args.seqlen,
        recombination_rate: args.recrate,
        population_size: args.popsize,
        seed,
    };
    let mut ts = sim_ancestry(&params)?;

    println!("{}", ts.num_trees());

    let provenance = serde_json::json!({
        "software": {
            "name": "coalrustts",
            "version": coalrustts::version(),
        },
        "parameters": {
            "nsamples": args.nsamples,
            "seqlen": args.seqlen,
            "recrate": args.recrate,
            "popsize": args.popsize,
            "seed": seed,
        },
    });
    ts.add_provenance(&provenance.to_string())?;

    ts.dump(&args.treefile)?;

    Ok(())
}
