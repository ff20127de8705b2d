//! Command-line interface for the parser generator.
//!
//! Reads a grammar description and writes the generated parser to
//! `<OUT_DIR>/<name>.rs`.

use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use grammar::Grammar;
use synth::Options;

#[derive(Parser)]
#[command(about = "Generate an LL(1) recursive-descent parser from a grammar description")]
struct Args {
    /// Path to the grammar description.
    grammar: PathBuf,

    /// Path to the output directory.
    out_dir: PathBuf,

    /// Name of the generated file, without extension.
    #[arg(short = 'n', long, default_value = "parser")]
    name: String,

    /// Also emit a `main` that parses one line of stdin.
    #[arg(long)]
    main: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let src = fs::read_to_string(&args.grammar)
        .with_context(|| format!("file {} can not be opened", args.grammar.display()))?;
    let grammar: Grammar = src
        .parse()
        .with_context(|| format!("reading {}", args.grammar.display()))?;
    let code = synth::generate_file(&grammar, &Options { main: args.main })?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let path = args.out_dir.join(format!("{}.rs", args.name));
    fs::write(&path, code).with_context(|| format!("file {} can not be created", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}
