use std::error::Error;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use edroute::map::FileFormat;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] edroute::map::Error);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Guess from the file extension and content
    Auto,
    Text,
    TextGz,
    TextBz2,
}

/// Serves shortest routes over a city map to an embedded client connected over a serial link.
#[derive(Parser)]
struct Cli {
    /// Path to the serial device. If not provided, stdin and stdout are used.
    #[arg(short, long)]
    serial: Option<PathBuf>,

    /// Path to the map file
    #[arg(short, long, default_value = "edmonton-roads-2.0.1.txt")]
    graph: PathBuf,

    /// Format of the map file
    #[arg(short, long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// Log every message and state change
    #[arg(short, long)]
    verbose: bool,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    colog::default_builder().filter_level(level).init();

    let file_format = match cli.format {
        Format::Auto => FileFormat::from_path(&cli.graph),
        Format::Text => FileFormat::Text,
        Format::TextGz => FileFormat::TextGz,
        Format::TextBz2 => FileFormat::TextBz2,
    };
    let g = load_graph(&cli.graph, file_format)?;
    let mut session = edroute::Session::new(&g);

    match cli.serial {
        Some(path) => {
            log::info!("Opening serial port: {}", path.display());
            let port = OpenOptions::new().read(true).write(true).open(&path)?;
            let mut link = edroute::protocol::Link::new(port.try_clone()?, port);
            edroute::serve(&mut session, &mut link)?;
        }

        None => {
            log::info!("No serial port given, using stdin and stdout");
            let mut link = edroute::protocol::Link::new(io::stdin().lock(), io::stdout().lock());
            edroute::serve(&mut session, &mut link)?;
        }
    }

    Ok(())
}

fn load_graph<P: AsRef<Path>>(
    path: P,
    file_format: FileFormat,
) -> Result<edroute::Graph, GraphLoadError> {
    let mut g = edroute::Graph::default();
    let options = edroute::map::Options { file_format };
    match edroute::map::add_features_from_file(&mut g, &options, path.as_ref()) {
        Ok(()) => Ok(g),
        Err(e) => Err(GraphLoadError(PathBuf::from(path.as_ref()), e)),
    }
}
