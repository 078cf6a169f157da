use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use zdom::{Config, Document, NodeId};

#[derive(Debug, Parser)]
#[command(
    name = "zdom",
    version,
    about = "Parse, check and pretty-print XML documents"
)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout); `.xml` is added when it has no extension
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Output format
    #[arg(short, long, value_enum, default_value = "xml")]
    to: FormatArg,
    /// Render only the first element with this name
    #[arg(short, long, value_name = "NAME")]
    select: Option<String>,
    /// Only check that the input is well formed
    #[arg(long)]
    check: bool,
    /// Maximum element nesting depth (0 means unlimited)
    #[arg(long, default_value_t = Config::default().max_depth)]
    max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    #[arg(long, default_value_t = Config::default().max_size)]
    max_size: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Xml,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let input = read_input(&args.input)?;
    let config = Config::new(args.max_depth, args.max_size);
    let doc = zdom::Parser::with_config(&input, config)
        .parse()
        .with_context(|| format!("failed to parse {}", describe(&args.input)))?;

    let Some(root) = doc.root() else {
        bail!("document has no root element");
    };
    info!(nodes = doc.len(), "parsed {}", describe(&args.input));

    if args.check {
        return write_output(&None, format!("{}: ok\n", describe(&args.input)).as_bytes());
    }

    let target = match &args.select {
        Some(name) => find(&doc, root, name)
            .with_context(|| format!("no element named {name}"))?,
        None => root,
    };

    match (args.to, &args.output) {
        (FormatArg::Xml, Some(path)) => {
            let written = doc
                .save_to_path(target, path)
                .with_context(|| format!("failed to write output file {}", path.display()))?;
            info!("wrote {}", written.display());
            Ok(())
        }
        (FormatArg::Xml, None) => {
            let mut rendered = doc.to_xml(target)?;
            rendered.push('\n');
            write_output(&None, rendered.as_bytes())
        }
        (FormatArg::Json, output) => {
            let mut rendered = serde_json::to_string_pretty(&doc.subtree(target))
                .context("failed to serialize json")?;
            rendered.push('\n');
            write_output(output, rendered.as_bytes())
        }
    }
}

/// First element named `name` in document order
fn find(doc: &Document, id: NodeId, name: &str) -> Option<NodeId> {
    let mut pending = vec![id];
    while let Some(next) = pending.pop() {
        if doc.name(next) == Some(name) {
            return Some(next);
        }
        pending.extend(doc.children(next, None).into_iter().rev());
    }
    None
}

fn describe(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string())
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.iter().all(u8::is_ascii_whitespace) {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
