//! tryit - render and exercise a single OpenAPI operation from the terminal
//!
//! Reads a path/operation fragment, prints the generated form, fills it
//! from `--set` arguments and sends the request to the selected server.

use anyhow::{bail, Context};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

use tryit_panel::fragment::{HttpMethod, OperationSelector};
use tryit_panel::{
    mount, mount_selected, RenderTarget, RequestExecutor, SettingsManager, SubmitBlocked,
    TextTarget,
};

/// Try out one OpenAPI operation
#[derive(Parser, Debug)]
#[command(name = "tryit")]
#[command(version)]
#[command(about = "Render a request form for one OpenAPI operation and send it")]
struct Args {
    /// File containing the JSON path/operation fragment ("-" for stdin)
    #[arg(long, default_value = "-")]
    payload: String,

    /// Path to render (defaults to the first path in the fragment)
    #[arg(long, requires = "method")]
    path: Option<String>,

    /// Method to render (get, post, put, delete, patch)
    #[arg(long, requires = "path")]
    method: Option<String>,

    /// Index of the server to send the request to
    #[arg(long, default_value = "0")]
    server: usize,

    /// Field value as NAME=VALUE or LOCATION.NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    values: Vec<String>,

    /// Directory holding settings.json
    #[arg(long, env = "TRYIT_SETTINGS_DIR")]
    settings_dir: Option<PathBuf>,

    /// Only print the form, do not send a request
    #[arg(long)]
    describe: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings_dir = match args.settings_dir {
        Some(dir) => dir,
        None => SettingsManager::default_dir()?,
    };
    let settings = SettingsManager::new(&settings_dir)
        .with_context(|| format!("failed to load settings from {}", settings_dir.display()))?
        .get()
        .clone();

    let payload = read_payload(&args.payload)?;

    let mut target = TextTarget::new();
    let panel = match (&args.path, &args.method) {
        (Some(path), Some(method)) => {
            let method = HttpMethod::from_key(method)
                .with_context(|| format!("unsupported method {}", method))?;
            mount_selected(
                &mut target,
                &payload,
                &OperationSelector::new(path.clone(), method),
                &settings,
            )
        }
        _ => mount(&mut target, &payload, &settings),
    };

    let Some(mut panel) = panel else {
        eprint!("{}", target.take());
        bail!("could not render operation");
    };

    if args.server != 0 {
        panel.select_server(args.server)?;
    }
    for assignment in &args.values {
        let (key, value) = assignment
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got {}", assignment))?;
        panel.set_named(key, value)?;
    }

    if args.describe {
        target.take();
        target.render_panel(&panel);
        print!("{}", target.take());
        return Ok(());
    }

    let executor = RequestExecutor::new(&settings)?;
    let submitted = panel.submit(&executor).await;
    let failed = match &submitted {
        Ok(Ok(_)) => false,
        Ok(Err(_)) | Err(SubmitBlocked::Request(_)) => true,
        Err(SubmitBlocked::Invalid(errors)) => {
            info!("{} field(s) need a value", errors.len());
            true
        }
    };

    target.take();
    target.render_panel(&panel);
    print!("{}", target.take());

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn read_payload(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .context("failed to read payload from stdin")?;
        return Ok(payload);
    }

    std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source))
}
