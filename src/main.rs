use std::path::PathBuf;

use anyhow::Result;
use archimedean_rs::io::load_csv;
use archimedean_rs::io::save_csv;
use archimedean_rs::visualization::plot_margins;
use archimedean_rs::ArchimedeanCopula;
use archimedean_rs::Family;
use archimedean_rs::FitConfig;
use clap::Parser;
use clap::Subcommand;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "archimedean")]
#[command(about = "Fit and sample Archimedean copulas")]
#[command(version)]
struct Cli {
  /// Log verbosity level (trace, debug, info, warn, error)
  #[arg(long, global = true, default_value = "warn")]
  log_level: tracing::Level,

  /// Field separator of the CSV files
  #[arg(long, global = true, default_value = ",")]
  sep: char,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Maximum likelihood fit of a family to the rows of a CSV file
  Fit {
    /// Clayton, Frank, Gumbel, Joe or AMH
    family: Family,

    input: PathBuf,

    /// Skip the first line of the input
    #[arg(long)]
    header: bool,

    /// Confidence level of the bounds
    #[arg(long, default_value = "0.95")]
    level: f64,

    /// Upper search limit for unbounded parameter domains
    #[arg(long, default_value = "10.0")]
    theta_cap: f64,
  },

  /// Draw a sample and write it to a CSV file
  Sample {
    family: Family,

    theta: f64,

    size: usize,

    dim: usize,

    output: PathBuf,

    /// RNG seed; the thread RNG is used when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Also write one margin histogram per column into this directory
    #[arg(long)]
    plot: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_max_level(cli.log_level)
    .with_target(false)
    .init();

  match cli.command {
    Commands::Fit {
      family,
      input,
      header,
      level,
      theta_cap,
    } => {
      let data = load_csv(&input, cli.sep, header)?;
      let config = FitConfig {
        level,
        theta_cap,
        ..FitConfig::default()
      };
      let mut copula = ArchimedeanCopula::new(family, f64::NAN);
      let result = copula.fit_with(&data, &config);
      println!("{family} copula, {} observations of dimension {}", data.nrows(), data.ncols());
      println!("{result}");
    }
    Commands::Sample {
      family,
      theta,
      size,
      dim,
      output,
      seed,
      plot,
    } => {
      anyhow::ensure!(size > 0 && dim > 0, "size and dim must be positive");
      let copula = ArchimedeanCopula::new(family, theta);
      if copula.theta() != theta {
        tracing::warn!(theta, used = copula.theta(), "theta outside the {family} domain");
      }

      let data = match seed {
        Some(seed) => copula.sample_with_rng(&mut StdRng::seed_from_u64(seed), size, dim),
        None => copula.par_sample(size, dim),
      }?;
      save_csv(&data, &output, cli.sep)?;
      println!("wrote {size}x{dim} {family} sample (theta = {}) to {output:?}", copula.theta());

      if let Some(dir) = plot {
        for path in plot_margins(&data, 50, &dir)? {
          println!("wrote {path:?}");
        }
      }
    }
  }

  Ok(())
}
