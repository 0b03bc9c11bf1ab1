use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{error, info, LevelFilter};

use huffcode::storage::DEFAULT_TREE_PATH;
use huffcode::{compress_to, decompress_from, CompressedData, FileStorage, HuffmanCodec};

const SAMPLE_TEXT: &str = "AABBCDCAASDBSAAABB";

#[derive(Parser, Debug)]
#[command(name = "huffcode", version, about = "Huffman coding over text")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress, store the tree, decompress and compare
    Roundtrip {
        text: Option<String>,
        #[arg(long, default_value = DEFAULT_TREE_PATH)]
        tree: PathBuf,
    },
    /// Print the bit string for the input and store its tree
    Compress {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value = DEFAULT_TREE_PATH)]
        tree: PathBuf,
        /// Also write a packed container to this file
        #[arg(long)]
        packed: Option<PathBuf>,
    },
    /// Decode a bit string with a stored tree
    Decompress {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value = DEFAULT_TREE_PATH)]
        tree: PathBuf,
    },
    /// Decode a packed container
    Unpack { file: PathBuf },
    /// Print the code table for the input
    Codes { text: Option<String> },
}

#[derive(Args, Debug)]
struct Source {
    /// Inline input
    #[arg(conflicts_with = "input")]
    text: Option<String>,
    /// Read the input from a file instead
    #[arg(long)]
    input: Option<PathBuf>,
}

impl Source {
    fn read(&self, default: &str) -> huffcode::Result<String> {
        match (&self.text, &self.input) {
            (_, Some(path)) => Ok(fs::read_to_string(path)?),
            (Some(text), None) => Ok(text.clone()),
            (None, None) => Ok(default.to_string()),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn roundtrip(text: &str, tree: &Path) -> huffcode::Result<bool> {
    let compressed = compress_to(&FileStorage, tree, text)?;
    let bit_string = compressed.bit_string();
    println!("Compressed string: {}", bit_string);

    let decompressed = decompress_from(&FileStorage, tree, &bit_string)?;
    println!("Decompressed string: {}", decompressed);
    Ok(decompressed == text)
}

fn run(command: Command) -> huffcode::Result<bool> {
    match command {
        Command::Roundtrip { text, tree } => {
            roundtrip(text.as_deref().unwrap_or(SAMPLE_TEXT), &tree)
        }
        Command::Compress {
            source,
            tree,
            packed,
        } => {
            let text = source.read(SAMPLE_TEXT)?;
            let compressed = compress_to(&FileStorage, &tree, &text)?;
            println!("{}", compressed.bit_string());
            if let Some(path) = packed {
                let data = CompressedData::from_compressed(&compressed, text.chars().count());
                let bytes = data.serialize()?;
                fs::write(&path, &bytes)?;
                info!("wrote {} bytes to {}", bytes.len(), path.display());
            }
            Ok(true)
        }
        Command::Decompress { source, tree } => {
            let bits = source.read("")?;
            println!("{}", decompress_from(&FileStorage, &tree, bits.trim_end())?);
            Ok(true)
        }
        Command::Unpack { file } => {
            let bytes = fs::read(&file)?;
            println!("{}", CompressedData::deserialize(&bytes)?.decode()?);
            Ok(true)
        }
        Command::Codes { text } => {
            if let Some(codec) = HuffmanCodec::from_text(text.as_deref().unwrap_or(SAMPLE_TEXT))? {
                print!("{}", codec.code_table());
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("decompressed text does not match the input");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
