//! Scripted transport and recording sink for state machine tests.

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::Interest;

use crate::client::{ClientEvent, ClientState, EventSink};
use crate::transport::{
    Connector, ReadOutcome, Readiness, Session, TransportError, TransportResult,
};

/// What one readiness pass of a scripted session reports.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Nothing fires.
    Idle,
    /// Connect-ready; `complete_connect` succeeds if `true`.
    Connect(bool),
    /// Write-ready.
    Write(WriteStep),
    /// Read-ready.
    Read(ReadStep),
    /// Write-ready and read-ready in the same pass.
    WriteRead(WriteStep, ReadStep),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum WriteStep {
    All,
    Partial(usize),
    Fail,
    Panic,
}

#[derive(Debug, Clone)]
pub(crate) enum ReadStep {
    Data(Vec<u8>),
    Empty,
    Eof,
    Fail,
}

/// Observations of one scripted session, shared with the test.
#[derive(Debug, Default)]
pub(crate) struct Probe {
    pub(crate) id: usize,
    close_calls: AtomicUsize,
    writes: Mutex<Vec<Vec<u8>>>,
}

impl Probe {
    pub(crate) fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }
}

/// All sessions a [`ScriptedConnector`] has opened.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProbeLog {
    probes: Arc<Mutex<Vec<Arc<Probe>>>>,
    attempts: Arc<AtomicUsize>,
}

impl ProbeLog {
    pub(crate) fn all(&self) -> Vec<Arc<Probe>> {
        self.probes.lock().unwrap().clone()
    }

    pub(crate) fn open_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

pub(crate) struct ScriptedSession {
    probe: Arc<Probe>,
    steps: VecDeque<Step>,
    current: Step,
    closed: bool,
}

#[async_trait]
impl Session for ScriptedSession {
    async fn poll_readiness(&mut self, _timeout: Duration) -> TransportResult<Readiness> {
        if self.closed {
            return Err(TransportError::NotConnected);
        }
        self.current = self.steps.pop_front().unwrap_or(Step::Idle);
        Ok(match self.current {
            Step::Idle => Readiness::NONE,
            Step::Connect(_) => Readiness::CONNECT,
            Step::Write(_) => Readiness::WRITE,
            Step::Read(_) => Readiness::READ,
            Step::WriteRead(..) => Readiness::WRITE_READ,
        })
    }

    fn complete_connect(&mut self) -> TransportResult<()> {
        match self.current {
            Step::Connect(true) => Ok(()),
            Step::Connect(false) => {
                self.closed = true;
                Err(TransportError::Connect(io::Error::from(
                    io::ErrorKind::ConnectionRefused,
                )))
            }
            _ => Err(TransportError::NotConnected),
        }
    }

    fn set_interest(&mut self, _interest: Interest) {}

    fn write_bytes(&mut self, data: &[u8]) -> TransportResult<usize> {
        let step = match self.current {
            Step::Write(step) | Step::WriteRead(step, _) => step,
            _ => return Err(TransportError::NotConnected),
        };
        self.probe.writes.lock().unwrap().push(data.to_vec());
        match step {
            WriteStep::All => Ok(data.len()),
            WriteStep::Partial(n) => Ok(n.min(data.len())),
            WriteStep::Fail => Err(TransportError::Write(io::Error::from(
                io::ErrorKind::BrokenPipe,
            ))),
            WriteStep::Panic => panic!("write handler blew up"),
        }
    }

    fn read_bytes(&mut self) -> TransportResult<ReadOutcome> {
        let step = match &self.current {
            Step::Read(step) | Step::WriteRead(_, step) => step.clone(),
            _ => return Ok(ReadOutcome::NoData),
        };
        match step {
            ReadStep::Data(data) => Ok(ReadOutcome::Data(data)),
            ReadStep::Empty => Ok(ReadOutcome::NoData),
            ReadStep::Eof => Ok(ReadOutcome::Eof),
            ReadStep::Fail => Err(TransportError::Read(io::Error::from(
                io::ErrorKind::ConnectionReset,
            ))),
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.probe.close_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Hands out scripted sessions in order; idle sessions once the scripts run out.
#[derive(Debug, Default)]
pub(crate) struct ScriptedConnector {
    scripts: VecDeque<Option<Vec<Step>>>,
    log: ProbeLog,
}

impl ScriptedConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a session that plays `steps`.
    pub(crate) fn session(mut self, steps: Vec<Step>) -> Self {
        self.scripts.push_back(Some(steps));
        self
    }

    /// Queue an `open` that fails.
    pub(crate) fn failing_open(mut self) -> Self {
        self.scripts.push_back(None);
        self
    }

    pub(crate) fn probes(&self) -> ProbeLog {
        self.log.clone()
    }
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    fn open(&mut self, _addr: SocketAddr) -> TransportResult<ScriptedSession> {
        self.log.attempts.fetch_add(1, Ordering::SeqCst);
        let Some(steps) = self.scripts.pop_front().unwrap_or_else(|| Some(Vec::new())) else {
            return Err(TransportError::Connect(io::Error::other("too many open files")));
        };

        let mut probes = self.log.probes.lock().unwrap();
        let probe = Arc::new(Probe {
            id: probes.len(),
            ..Probe::default()
        });
        probes.push(Arc::clone(&probe));

        Ok(ScriptedSession {
            probe,
            steps: steps.into(),
            current: Step::Idle,
            closed: false,
        })
    }
}

/// Sink that keeps every event for later inspection.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSink {
    events: Arc<Mutex<Vec<ClientEvent>>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Short names of every non-transition event, in order.
    pub(crate) fn labels(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .filter_map(|event| match event {
                ClientEvent::ConnectAttempt { .. } => Some("connect-attempt"),
                ClientEvent::Connected { .. } => Some("connected"),
                ClientEvent::ConnectFailed { .. } => Some("connect-failed"),
                ClientEvent::LoginSent { .. } => Some("login-sent"),
                ClientEvent::LoginDeferred => Some("login-deferred"),
                ClientEvent::DataSent { .. } => Some("data-sent"),
                ClientEvent::DataReceived { .. } => Some("data-received"),
                ClientEvent::Disconnected { .. } => Some("disconnected"),
                ClientEvent::Reconnecting { .. } => Some("reconnecting"),
                ClientEvent::Stopped { .. } => Some("stopped"),
                ClientEvent::Transition { .. } => None,
            })
            .collect()
    }

    pub(crate) fn transitions(&self) -> Vec<(ClientState, ClientState)> {
        self.events()
            .iter()
            .filter_map(|event| match event {
                ClientEvent::Transition { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: ClientEvent) {
        self.events.lock().unwrap().push(event);
    }
}
