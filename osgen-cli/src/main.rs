use std::{fs::File, io::BufWriter, path::PathBuf, time::Instant};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use osgen_core::{
    config::ConfigJobs, generate, generate_all, listing::RecursionListing, operator::Operator,
    GenerationRequest,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: OsCommand,
}

#[derive(Subcommand, Debug)]
enum OsCommand {
    /// Expand the recursion of one integral family at fixed angular momenta
    Expand {
        /// The integral family, as operator symbol (`1`, `T`, `A`, `AG`, `r`, `p`, `U_L`, `U_P`)
        /// or name (`overlap`, `kinetic-energy`, `eri`, ...)
        integral: String,
        /// Angular momentum per center, bra centers first, e.g. `1,2` for (p|d)
        #[arg(long, short, value_delimiter = ',', required = true)]
        angular_momentum: Vec<u32>,
        /// Order of the operator tensor for electric field, multipole and momentum integrals
        #[arg(long, short, default_value_t = 0)]
        operator_order: u32,
        /// Geometric derivative order per center
        #[arg(long, short, value_delimiter = ',')]
        derivative_orders: Option<Vec<u32>>,
        /// Print the expansion as JSON instead of text
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Expand every job of a batch file
    Batch {
        /// A JSON file listing the jobs
        #[arg(long, short)]
        config: PathBuf,
        /// Where to write the listings, stdout if omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    listings: &'a [RecursionListing],
    failures: &'a [String],
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args: Args = Args::parse();

    match args.command {
        OsCommand::Expand {
            integral,
            angular_momentum,
            operator_order,
            derivative_orders,
            json,
        } => {
            let operator = integral.parse::<Operator>()?;
            let mut request =
                GenerationRequest::new(operator, angular_momentum).with_operator_order(operator_order);
            if let Some(orders) = derivative_orders {
                request = request.with_derivative_orders(orders);
            }

            let start = Instant::now();
            let listing =
                generate(&request).with_context(|| format!("failed to expand {request}"))?;
            log::info!(
                "expanded {request} into {} terms in {:0.2?}",
                listing.terms(),
                start.elapsed()
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print!("{listing}");
            }
        }

        OsCommand::Batch { config, output } => {
            let requests = ConfigJobs::load(&config)?.requests()?;
            log::info!("{} requests in {}", requests.len(), config.display());

            let start = Instant::now();
            let mut listings = Vec::with_capacity(requests.len());
            let mut failures = Vec::new();
            for (request, result) in requests.iter().zip(generate_all(&requests)) {
                match result {
                    Ok(listing) => listings.push(listing),
                    Err(error) => {
                        log::error!("{request}: {error}");
                        failures.push(format!("{request}: {error}"));
                    }
                }
            }
            log::info!(
                "expanded {} requests in {:0.2?}",
                listings.len(),
                start.elapsed()
            );

            let batch = BatchOutput {
                listings: &listings,
                failures: &failures,
            };
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("cannot create {}", path.display()))?;
                    serde_json::to_writer_pretty(BufWriter::new(file), &batch)?;
                }
                None => println!("{}", serde_json::to_string_pretty(&batch)?),
            }

            if !failures.is_empty() {
                bail!("{} of {} requests failed", failures.len(), requests.len());
            }
        }
    }

    Ok(())
}
