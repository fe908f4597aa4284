//! Print the population table of one or more tables files.

use anyhow::Result;
use clap::Parser;

use coalrustts::TableCollection;

#[derive(Parser, Debug)]
#[command(about = "Print the population table of tables files")]
struct Args {
    /// Input file names
    #[arg(required = true)]
    tablesfiles: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    for f in &args.tablesfiles {
        let tables = TableCollection::load(f)?;
        for (id, pop) in tables.enumerate_populations() {
            println!("PopulationRecord {{ id: {}, {} }}", id, pop);
        }
    }

    Ok(())
}
