//! Host-side session: the state machine connecting the UI surface to the
//! dispatcher over the session message protocol.
//!
//! One session per open panel. The submission state machine is
//! `Idle -> Submitted -> Idle` per command; overlapping submissions are
//! serialized through a single-slot in-flight guard with a FIFO queue, so
//! every submission eventually produces its deliveries and cross-command
//! output order follows submission order. History recall is a separate
//! request/reply round trip that is answered immediately, even while a
//! command is in flight.

use std::collections::VecDeque;

use ccview_protocol::MessagePayload;
use ccview_protocol::SessionMessage;
use ccview_protocol::StatusKind;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::command::CommandKind;
use crate::command::parse;
use crate::dispatch::Dispatcher;
use crate::dispatch::SessionContext;
use crate::history::HistoryNavigator;
use crate::router::OutputRouter;
use crate::router::PanelSinks;
use crate::router::RoutedOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmissionState {
    Idle,
    Submitted { verb: CommandKind },
}

/// Internal completion event from the in-flight dispatch task.
struct CommandFinished {
    verb: CommandKind,
    records: Vec<ccview_protocol::OutputRecord>,
}

pub struct Session {
    dispatcher: Dispatcher,
    context: SessionContext,
    history: HistoryNavigator,
    router: OutputRouter,
    sinks: PanelSinks,
    outgoing: UnboundedSender<SessionMessage>,
    state: SubmissionState,
    pending: VecDeque<String>,
    done_tx: UnboundedSender<CommandFinished>,
    done_rx: Option<UnboundedReceiver<CommandFinished>>,
}

impl Session {
    /// `context.current_subject` is fixed at panel-open time; `outgoing`
    /// carries host → UI-surface messages.
    pub fn new(
        dispatcher: Dispatcher,
        context: SessionContext,
        sinks: PanelSinks,
        outgoing: UnboundedSender<SessionMessage>,
    ) -> Self {
        let (done_tx, done_rx) = unbounded_channel();
        Self {
            dispatcher,
            context,
            history: HistoryNavigator::new(),
            router: OutputRouter::new(),
            sinks,
            outgoing,
            state: SubmissionState::Idle,
            pending: VecDeque::new(),
            done_tx,
            done_rx: Some(done_rx),
        }
    }

    /// Drive the session until the UI surface closes its side of `inbox`.
    /// After that the session is disposed: queued submissions are discarded
    /// and completions from any still-running invocation are dropped
    /// silently.
    pub async fn run(mut self, mut inbox: UnboundedReceiver<SessionMessage>) {
        let Some(mut done_rx) = self.done_rx.take() else {
            return;
        };
        loop {
            tokio::select! {
                message = inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => break,
                },
                Some(finished) = done_rx.recv() => self.finish_command(finished),
            }
        }
        let in_flight = self.state != SubmissionState::Idle;
        info!(pending = self.pending.len(), in_flight, "panel disposed; session ending");
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message.payload {
            MessagePayload::CommandSubmit { raw_text } => self.submit(raw_text),
            MessagePayload::HistoryRequest { direction } => {
                let recalled_text = self.history.navigate(direction);
                self.deliver(MessagePayload::HistoryReply { recalled_text });
            }
            // Scene-script outcomes reported back by the UI surface.
            MessagePayload::StatusNotice { status, text } => {
                debug!(?status, %text, "status notice from panel");
            }
            MessagePayload::FailureNotice { message } => {
                warn!(%message, "failure notice from panel");
            }
            other => debug!(?other, "ignoring unexpected panel message"),
        }
    }

    fn submit(&mut self, raw_text: String) {
        // Exactly one history entry per dispatched command, in submission
        // order, regardless of outcome. Blank lines are dropped by the
        // navigator itself.
        self.history.record(&raw_text);
        if let SubmissionState::Submitted { verb } = self.state {
            debug!(in_flight = verb.verb(), "queueing submission behind in-flight command");
            self.pending.push_back(raw_text);
            return;
        }
        self.start_command(raw_text);
    }

    fn start_command(&mut self, raw_text: String) {
        let cmd = parse(&raw_text);
        if cmd.was_unrecognized {
            debug!(%raw_text, "unrecognized verb; degrading to help");
        }
        // The script itself goes to the viewer context now; the dispatcher
        // only leaves a transcript trace for it.
        if cmd.kind == CommandKind::SceneScript {
            self.deliver(MessagePayload::StatusNotice {
                status: StatusKind::SceneScript,
                text: cmd.arguments.join(" "),
            });
        }

        self.state = SubmissionState::Submitted { verb: cmd.kind };
        let dispatcher = self.dispatcher.clone();
        let context = self.context.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let records = dispatcher.execute(&cmd, &context).await;
            // The session may already be disposed; dropping the completion
            // is the contract, not an error.
            let _ = done_tx.send(CommandFinished {
                verb: cmd.kind,
                records,
            });
        });
    }

    fn finish_command(&mut self, finished: CommandFinished) {
        for record in finished.records {
            let routed = self.router.route(&record, finished.verb);
            self.sinks.apply(&routed);
            match routed {
                RoutedOutput::Cleared => self.deliver(MessagePayload::StatusNotice {
                    status: StatusKind::Cleared,
                    text: String::new(),
                }),
                _ => self.deliver(MessagePayload::ResultDelivery { record }),
            }
        }
        self.state = SubmissionState::Idle;
        if let Some(next) = self.pending.pop_front() {
            self.start_command(next);
        }
    }

    fn deliver(&self, payload: MessagePayload) {
        if self.outgoing.send(SessionMessage::new(payload)).is_err() {
            // Panel already gone; deliveries are dropped, never errored.
            debug!("dropping delivery for disposed panel");
        }
    }
}
