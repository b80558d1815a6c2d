use clap::Parser;
use mp4_creation_time::{FileSource, ScanOptions, find_movie_header, time};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Print the creation time recorded in the movie header of MP4/QuickTime files.
#[derive(Debug, Parser)]
#[command(name = "creation_time")]
struct Args {
    /// Files to inspect
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Bytes read per backward step
    #[arg(long, default_value_t = mp4_creation_time::DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,

    /// Maximum number of bytes examined per file
    #[arg(long, default_value_t = mp4_creation_time::DEFAULT_MAX_BYTES)]
    max_bytes: u64,

    /// Also print the modification time
    #[arg(long)]
    modified: bool,

    /// Tracing log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = ScanOptions::default()
        .with_chunk_size(args.chunk_size)
        .with_max_bytes(args.max_bytes);

    for path in &args.paths {
        let source = match FileSource::open(path) {
            Ok(source) => source,
            Err(e) => {
                warn!("Failed to open {}: {}", path.display(), e);
                continue;
            }
        };

        let Some(header) = find_movie_header(&source, &options)? else {
            println!("{}\t-", path.display());
            continue;
        };

        let created = header.creation_iso8601().unwrap_or_else(|| "-".to_string());
        if args.modified {
            let modified = header
                .modified_at()
                .map(|t| time::to_iso8601(&t))
                .unwrap_or_else(|| "-".to_string());
            println!("{}\t{}\t{}", path.display(), created, modified);
        } else {
            println!("{}\t{}", path.display(), created);
        }
    }

    Ok(())
}
