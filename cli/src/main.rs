//! Terminal stand-in for the CCView panel: drives a command session over
//! the session message protocol from stdin.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ccview_core::BridgeTimeouts;
use ccview_core::CclibBridge;
use ccview_core::Dispatcher;
use ccview_core::PanelSinks;
use ccview_core::PresentationChannel;
use ccview_core::Session;
use ccview_core::SessionContext;
use ccview_core::env::resolve_environment;
use ccview_protocol::MessagePayload;
use ccview_protocol::SessionMessage;
use ccview_protocol::StatusKind;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc::unbounded_channel;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Inspect quantum chemistry output files through the cclib backend.
#[derive(Debug, Parser)]
#[command(name = "ccview", version)]
struct Cli {
    /// Data file to open as the session subject.
    file: Option<PathBuf>,

    /// Python interpreter used for the cclib backend.
    #[arg(long, default_value = "python3")]
    interpreter: PathBuf,

    /// Path to the backend parser script.
    #[arg(long)]
    script: PathBuf,

    /// Wall-clock budget for property queries, in seconds.
    #[arg(long, default_value_t = 20)]
    query_timeout: u64,

    /// Wall-clock budget for conversions and full parses, in seconds.
    #[arg(long, default_value_t = 90)]
    bulk_timeout: u64,
}

/// Stdout-backed presentation channel. A terminal cannot be unprinted, so
/// `clear` just draws a separator.
struct StdoutChannel {
    prefix: &'static str,
}

impl PresentationChannel for StdoutChannel {
    fn append(&mut self, text: &str) {
        for line in text.lines() {
            println!("{}{line}", self.prefix);
        }
    }

    fn clear(&mut self) {
        println!("{}----", self.prefix);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let env = match resolve_environment(cli.interpreter, cli.script).await {
        Ok(state) => {
            if !state.is_valid() {
                warn!(missing = ?state.missing, "interpreter environment incomplete");
            }
            Some(state)
        }
        Err(err) => {
            warn!(%err, "could not probe the interpreter; data commands will fail");
            None
        }
    };

    let bridge = CclibBridge::new(env).with_timeouts(BridgeTimeouts {
        query: Duration::from_secs(cli.query_timeout),
        bulk: Duration::from_secs(cli.bulk_timeout),
    });
    let dispatcher = Dispatcher::new(Arc::new(bridge));
    let context = SessionContext {
        current_subject: cli.file.clone(),
    };
    let sinks = PanelSinks {
        transcript: Box::new(StdoutChannel { prefix: "" }),
        structured: Box::new(StdoutChannel { prefix: "  " }),
    };

    let (ui_tx, inbox) = unbounded_channel();
    let (outgoing, mut ui_rx) = unbounded_channel();
    let session = tokio::spawn(Session::new(dispatcher, context, sinks, outgoing).run(inbox));

    // The panel side of the protocol: records already render through the
    // sinks above, so only the relayed notices need handling here.
    let pump = tokio::spawn(async move {
        while let Some(message) = ui_rx.recv().await {
            match message.payload {
                MessagePayload::StatusNotice {
                    status: StatusKind::SceneScript,
                    text,
                } => println!("[viewer] {text}"),
                MessagePayload::FailureNotice { message } => eprintln!("{message}"),
                _ => {}
            }
        }
    });

    if let Some(file) = &cli.file {
        println!("Opened {}", file.display());
    }
    println!("Type `help` for commands; results print as they arrive. Ctrl-D exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        if ui_tx.send(SessionMessage::submit(line)).is_err() {
            break;
        }
    }

    // Closing our side disposes the session.
    drop(ui_tx);
    session.await.context("session task")?;
    pump.await.context("panel pump task")?;
    Ok(())
}
