//! Channel-driven coordination in a background thread.
//!
//! The coordinator runs in a separate `std::thread`. Stage requests, log
//! lines and the final outcome travel to the owner over `crossbeam_channel`;
//! the owner answers each request with [`CoordinationHandle::respond`].

use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use thermocurve_core::{Error, Result};

use crate::context::ExecutionContext;
use crate::coordinator::{AnalysisEngine, InteractionCoordinator, InteractionProvider, StageInput, StageRequest};
use crate::descriptor::AlgorithmDescriptor;
use crate::messages::{AnalysisMessage, LogEntry};

/// Provider that forwards requests over a channel and waits for the answer.
///
/// A closed channel or a `None` answer cancels the stage.
pub struct ChannelProvider {
    tx: Sender<AnalysisMessage>,
    rx: Receiver<Option<StageInput>>,
}

impl ChannelProvider {
    pub fn new(tx: Sender<AnalysisMessage>, rx: Receiver<Option<StageInput>>) -> Self {
        Self { tx, rx }
    }
}

impl InteractionProvider for ChannelProvider {
    fn request(&mut self, request: &StageRequest) -> Option<StageInput> {
        if self.tx.send(AnalysisMessage::Request(request.clone())).is_err() {
            return None;
        }
        self.rx.recv().ok().flatten()
    }
}

/// Owner side of a coordination thread.
pub struct CoordinationHandle {
    messages: Receiver<AnalysisMessage>,
    responses: Sender<Option<StageInput>>,
    thread: JoinHandle<Result<ExecutionContext>>,
}

impl CoordinationHandle {
    pub fn messages(&self) -> &Receiver<AnalysisMessage> {
        &self.messages
    }

    /// Block for the next message; `None` once the thread has finished.
    pub fn recv(&self) -> Option<AnalysisMessage> {
        self.messages.recv().ok()
    }

    /// Answer the pending request. `None` declines it.
    pub fn respond(&self, input: Option<StageInput>) -> Result<()> {
        self.responses
            .send(input)
            .map_err(|_| Error::Other("coordination thread has stopped".into()))
    }

    pub fn cancel(&self) -> Result<()> {
        self.respond(None)
    }

    /// Wait for the thread and return its outcome.
    pub fn join(self) -> Result<ExecutionContext> {
        self.thread
            .join()
            .map_err(|_| Error::Other("coordination thread panicked".into()))?
    }
}

/// Run `descriptor` through a coordinator on a background thread.
pub fn spawn_coordination<E>(descriptor: AlgorithmDescriptor, engine: E, inbound: ExecutionContext) -> CoordinationHandle
where
    E: AnalysisEngine + Send + 'static,
{
    let (msg_tx, msg_rx) = unbounded();
    let (resp_tx, resp_rx) = unbounded();

    let thread = std::thread::spawn(move || {
        let name = descriptor.display_name.clone();
        let _ = msg_tx.send(AnalysisMessage::Log(LogEntry::info(format!("Running {}...", name))));

        let start = Instant::now();
        let mut coordinator = InteractionCoordinator::new(&descriptor);
        let mut provider = ChannelProvider::new(msg_tx.clone(), resp_rx);
        let result = coordinator.run(&mut provider, &engine, &inbound);

        let elapsed = start.elapsed();
        let entry = match &result {
            Ok(_) => LogEntry::success(format!("{} completed in {:.2?}", name, elapsed)),
            Err(Error::Cancelled(_)) => LogEntry::warning(format!("{} cancelled", name)),
            Err(e) => LogEntry::error(format!("{} failed: {}", name, e)),
        };
        let _ = msg_tx.send(AnalysisMessage::Log(entry));

        let _ = match &result {
            Ok(context) => msg_tx.send(AnalysisMessage::Complete {
                name,
                context: context.clone(),
                elapsed,
            }),
            Err(e) => msg_tx.send(AnalysisMessage::Error {
                context: name,
                message: e.to_string(),
            }),
        };
        result
    });

    CoordinationHandle {
        messages: msg_rx,
        responses: resp_tx,
        thread,
    }
}
