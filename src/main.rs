use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::net::TcpStream;

use topowatch::data::duration::format_duration;
use topowatch::{App, FileSource, Settings, StreamSource};

#[derive(Parser, Debug)]
#[command(name = "topowatch")]
#[command(about = "Merge probe reports and print topology views as JSON")]
struct Args {
    /// Report file written by a probe (repeatable)
    #[arg(short, long)]
    file: Vec<PathBuf>,

    /// Connect to a probe's TCP output for live reports (host:port, repeatable)
    #[arg(short, long)]
    connect: Vec<String>,

    /// Topology view to print (defaults to the configured view)
    #[arg(short, long)]
    topology: Option<String>,

    /// Print the details of one node of the view instead
    #[arg(short, long, conflicts_with = "list")]
    node: Option<String>,

    /// List the available views with their sizes
    #[arg(short, long)]
    list: bool,

    /// Keep nodes that are connected to nothing
    #[arg(long)]
    full: bool,

    /// Keep running and print again whenever a new report arrives
    #[arg(short, long, conflicts_with = "export")]
    watch: bool,

    /// Report retention window (e.g., "15s", "1m")
    #[arg(long)]
    window: Option<String>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Export the view to a JSON file and exit
    #[arg(short, long, conflicts_with_all = ["list", "node"])]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ref window) = args.window {
        settings.window = window.clone();
        settings.window()?;
    }
    init_tracing(&settings.log_level)?;

    if args.file.is_empty() && args.connect.is_empty() {
        bail!("No report sources: pass --file or --connect");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args, settings))
}

fn init_tracing(level: &str) -> Result<()> {
    let level: tracing::Level = level
        .parse()
        .with_context(|| format!("invalid log level {:?}", level))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut app = App::from_settings(&settings)?;

    for path in &args.file {
        app.add_source(Box::new(FileSource::new(path)));
    }
    for addr in &args.connect {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to {}", addr))?;
        tracing::info!(addr = %addr, "connected");
        app.add_source(Box::new(StreamSource::spawn(stream, addr)));
    }

    let topology = args.topology.clone().unwrap_or_else(|| settings.topology.clone());
    let refresh = settings.refresh()?;
    tracing::info!(
        window = %format_duration(app.collector().window()),
        refresh = %format_duration(refresh),
        topology = %topology,
        "collecting reports"
    );

    // Streams deliver their first report asynchronously
    let deadline = Instant::now() + refresh;
    while app.poll() == 0 && app.collector().is_empty() && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    for (source, error) in app.errors() {
        tracing::warn!(source = %source, error = %error, "source failed");
    }

    if let Some(ref path) = args.export {
        app.export(&topology, args.full, path)?;
        tracing::info!(path = %path.display(), topology = %topology, "exported view");
        return Ok(());
    }

    print(&app, &args, &topology)?;
    if !args.watch {
        return Ok(());
    }

    let mut changed = app.collector().subscribe();
    let mut ticker = tokio::time::interval(refresh);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                app.poll();
            }
            Some(()) = changed.recv() => {
                print(&app, &args, &topology)?;
            }
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Print the requested view, node or listing as JSON on stdout.
fn print(app: &App, args: &Args, topology: &str) -> Result<()> {
    let json = if args.list {
        serde_json::to_string_pretty(&app.topologies())?
    } else if let Some(ref id) = args.node {
        serde_json::to_string_pretty(&app.node(topology, id)?)?
    } else {
        serde_json::to_string_pretty(&app.topology(topology, args.full)?)?
    };
    println!("{}", json);
    Ok(())
}
