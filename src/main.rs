use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use vnunpack::{default_registry, FileSaverHdd, InputFile, UnpackOptions, Unpacker};

#[derive(Parser)]
#[command(name = "vnunpack", about = "Extract visual novel archives, images and audio")]
struct Cli {
    /// More log output (-vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// No log output at all
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported formats in detection order
    Formats {
        #[arg(long)]
        json: bool,
    },
    /// List archive contents without extracting
    List {
        input: PathBuf,
        /// Format identifier; skips detection
        #[arg(short, long)]
        format: Option<String>,
        /// Decoder plugin, e.g. a game-specific key set
        #[arg(long)]
        plugin: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Extract archives and convert images/audio
    Unpack {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        #[arg(short, long)]
        format: Option<String>,
        #[arg(long)]
        plugin: Option<String>,
        /// Replace files left by earlier runs
        #[arg(long)]
        overwrite: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    vnunpack::logger::init(log_level(cli.verbose, cli.quiet));
    let registry = default_registry()?;

    match cli.command {

        // ── Formats ──────────────────────────────────────────────────────────
        Commands::Formats { json } => {
            if json {
                let formats: Vec<_> = registry.iter().collect();
                println!("{}", serde_json::to_string_pretty(&formats)?);
            } else {
                for format in registry.iter() {
                    println!("{:<20} {}", format.id, format.kind);
                }
            }
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, format, plugin, json } => {
            let unpacker = Unpacker::new(&registry, UnpackOptions { format, plugin });
            let mut file = InputFile::open(&input)?;
            let (id, meta) = unpacker.list(&mut file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&meta)?);
                return Ok(());
            }
            println!("Archive: {} ({})", input.display(), id);
            println!("{:<40} {:>12} {:>12}  Extra", "Name", "Offset", "Size");
            for entry in &meta.entries {
                let extra: Vec<String> = entry.extra
                    .iter()
                    .map(|(k, v)| format!("{k}={}", hex::encode(v.to_be_bytes())))
                    .collect();
                println!("{:<40} {:>12} {:>12}  {}",
                    entry.path, entry.offset, entry.size, extra.join(" "));
            }
            println!("{} entries", meta.len());
        }

        // ── Unpack ───────────────────────────────────────────────────────────
        Commands::Unpack { inputs, output_dir, format, plugin, overwrite } => {
            let unpacker = Unpacker::new(&registry, UnpackOptions { format, plugin });
            let mut saver = FileSaverHdd::new(&output_dir, overwrite);
            let mut failed = 0usize;
            for path in &inputs {
                let result = InputFile::open(path)
                    .and_then(|mut input| unpacker.unpack(&mut input, &mut saver));
                match result {
                    Ok(report) => {
                        println!("  {:<30} {:<16} {} saved, {} failed",
                            path.display(), report.format, report.saved, report.failures.len());
                        if !report.is_clean() {
                            failed += 1;
                        }
                    }
                    Err(e) => {
                        eprintln!("  {:<30} error: {}", path.display(), e);
                        failed += 1;
                    }
                }
            }
            println!("Unpacked to: {}", saver.output_dir().display());
            if failed > 0 {
                return Err(format!("{failed} of {} input(s) had errors", inputs.len()).into());
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Off,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}
