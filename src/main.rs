//! `wasm-reflect`: print the exports, imports or custom sections of a module binary.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::debug;

use wasm_reflect::config::ParseConfig;
use wasm_reflect::{ExternalKind, ModuleHandle};

#[derive(Parser)]
#[command(name = "wasm-reflect")]
#[command(about = "Reflect over the exports of a WebAssembly module")]
#[command(version)]
struct Cli {
    /// Module binary (.wasm), or a hex dump of one with --hex
    file: PathBuf,

    /// Treat the input file as hex text; whitespace is ignored
    #[arg(long)]
    hex: bool,

    /// Print JSON instead of one line per entry
    #[arg(long)]
    json: bool,

    /// List imports instead of exports
    #[arg(long, conflicts_with = "custom")]
    imports: bool,

    /// Dump the payloads of the custom sections with this name, in hex
    #[arg(long, value_name = "NAME")]
    custom: Option<String>,

    /// Only list exports of this kind
    #[arg(long, value_enum, conflicts_with_all = ["imports", "custom"])]
    kind: Option<KindArg>,

    /// JSON file with decode limits
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Function,
    Table,
    Memory,
    Global,
}

impl From<KindArg> for ExternalKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Function => ExternalKind::Function,
            KindArg::Table => ExternalKind::Table,
            KindArg::Memory => ExternalKind::Memory,
            KindArg::Global => ExternalKind::Global,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", cli.file.display(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => ParseConfig::from_file(path)?,
        None => ParseConfig::default(),
    };

    let raw = fs::read(&cli.file)?;
    let bytes = if cli.hex {
        let text: String = String::from_utf8(raw)?.split_whitespace().collect();
        hex::decode(text)?
    } else {
        raw
    };
    debug!("read {} bytes from {}", bytes.len(), cli.file.display());

    let handle = ModuleHandle::compile_with(&bytes, &config)?;

    if let Some(name) = &cli.custom {
        let sections = handle.custom_sections(name);
        if cli.json {
            let encoded: Vec<String> = sections.iter().map(hex::encode).collect();
            println!("{}", serde_json::to_string_pretty(&encoded)?);
        } else {
            for data in sections {
                println!("{}", hex::encode(data));
            }
        }
    } else if cli.imports {
        let imports = handle.imports();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&imports)?);
        } else {
            for import in imports {
                println!("{}", import);
            }
        }
    } else {
        let exports = match cli.kind {
            Some(kind) => handle.exports_of_kind(kind.into()),
            None => handle.exports(),
        };
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&exports)?);
        } else {
            for export in exports {
                println!("{}", export);
            }
        }
    }

    Ok(())
}
