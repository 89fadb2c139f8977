//! h5grid demo: one single-threaded scalar write, then several writers on
//! their own threads, then every produced file read back.
//!
//! Usage:
//!   h5grid-demo --dir /tmp/h5 --prefix test --threads 4

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use h5grid::{Reader, Writer};

#[derive(Parser)]
#[command(name = "h5grid-demo", about = "Concurrent HDF5 writer demo", version)]
struct Cli {
    /// Directory the files are written to. Must exist and be writable.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// File name prefix.
    #[arg(short, long, default_value = "test")]
    prefix: String,

    /// Number of concurrent writers.
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Value written as "scalar" into every file.
    #[arg(long, default_value_t = 2.5)]
    value: f64,
}

fn single_threaded_write(cli: &Cli) -> Result<PathBuf> {
    let writer = Writer::create(&cli.dir, &cli.prefix)?;
    writer.write_scalar("scalar", cli.value)?;
    let path = writer.path().to_path_buf();
    writer.close()?;
    Ok(path)
}

fn multi_threaded_write(cli: &Cli) -> Result<Vec<PathBuf>> {
    thread::scope(|s| {
        let handles: Vec<_> = (0..cli.threads)
            .map(|_| {
                s.spawn(move || -> Result<PathBuf> {
                    let writer = Writer::create(&cli.dir, &cli.prefix)?;
                    writer.write_scalar("scalar", cli.value)?;
                    let path = writer.path().to_path_buf();
                    writer.close()?;
                    Ok(path)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .map_err(|_| anyhow::anyhow!("writer thread panicked"))?
            })
            .collect()
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut files = vec![single_threaded_write(&cli)?];
    info!("single threaded write complete");
    files.extend(multi_threaded_write(&cli)?);
    info!(writers = cli.threads, "multi threaded write complete");

    for path in &files {
        let reader = Reader::open(path)?;
        let value = reader
            .read_scalar("scalar")
            .with_context(|| format!("reading back {}", path.display()))?;
        info!(path = %path.display(), value, "read back");
    }
    Ok(())
}
