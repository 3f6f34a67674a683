use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use partforge::{params_json, run_build, BuildOptions, ParamSource, ProductArg};

/// Parametric generator for 3D-printable enclosures and brackets.
#[derive(Parser)]
#[command(name = "partforge")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every part of a product and write STL and native files
    Build {
        #[arg(value_enum)]
        product: ProductArg,

        /// Shipped revision to start from (default: newest)
        #[arg(long)]
        revision: Option<u32>,

        /// JSON file whose fields override the revision's parameters
        #[arg(long)]
        params: Option<PathBuf>,

        /// Output root
        #[arg(long, default_value = "out")]
        out: PathBuf,

        /// Write ASCII instead of binary STL
        #[arg(long)]
        ascii: bool,
    },

    /// Print a product's parameter set as JSON
    Params {
        #[arg(value_enum)]
        product: ProductArg,

        #[arg(long)]
        revision: Option<u32>,
    },
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "partforge=info,assembly_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            product,
            revision,
            params,
            out,
            ascii,
        } => {
            let report = run_build(&BuildOptions {
                params: ParamSource {
                    product: product.into(),
                    revision,
                    overrides: params,
                },
                out,
                ascii,
            })?;
            for part in &report.parts {
                println!("{part}");
            }
            for path in &report.written {
                println!("wrote {}", path.display());
            }
        }
        Commands::Params { product, revision } => {
            println!(
                "{}",
                params_json(&ParamSource {
                    product: product.into(),
                    revision,
                    overrides: None,
                })?
            );
        }
    }
    Ok(())
}
