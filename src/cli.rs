use crate::config::load_config;
use crate::layout::{LayoutEngine, LayoutKind};
use crate::layout_dump::{LayoutDump, write_layout_dump, write_layout_dump_to};
use crate::model::MindMap;
use crate::store;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "mmlay", version, about = "Lay out a mind-map document")]
pub struct Args {
    /// Input document (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout to apply (standard, balanced, left, right, logical, level,
    /// outline, tree-clone, right-clone, left-clone)
    #[arg(short = 'l', long = "layout")]
    pub layout: Option<LayoutKind>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Release every manually positioned node before laying out
    #[arg(long = "unpin")]
    pub unpin: bool,

    /// Write node positions and connector geometry instead of the document
    #[arg(long = "dump")]
    pub dump: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let mut map = store::from_json_with(&input, config.sizing.clone())
        .context("failed to read mind-map document")?;

    let kind = args.layout.unwrap_or(config.default_layout);
    let width = args.width.unwrap_or(config.canvas.width);
    let height = args.height.unwrap_or(config.canvas.height);

    if args.unpin {
        for id in map.node_ids() {
            map.set_manually_positioned(&id, false)?;
        }
    }

    let engine = LayoutEngine::from_kind(kind, &config.layout, width, height);
    engine.relayout(&mut map);
    tracing::info!(layout = %kind, nodes = map.len(), width, height, "layout applied");

    if args.dump {
        let dump = LayoutDump::from_map(&map, engine.strategy_name(), engine.canvas(), &config.edges);
        return match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &dump),
            None => write_layout_dump_to(io::stdout().lock(), &dump),
        };
    }
    write_document(&mut map, args.output.as_deref())
}

fn write_document(map: &mut MindMap, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => store::save(map, path),
        None => {
            let mut stdout = io::stdout().lock();
            store::write_document(map, &mut stdout)?;
            writeln!(stdout)?;
            Ok(())
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_names(false);
    let _ = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init();
}
