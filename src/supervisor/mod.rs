//! Client Supervisor - starts and stops simulated devices.
//!
//! The supervisor assigns credentials and names; it has no connection logic
//! of its own. Every client runs as an independent tokio task with its own
//! session, buffer and sink, so a failing or panicking client never touches
//! its siblings.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::client::{
    ClientConfig, ClientState, ClientSummary, EventSink, ShutdownTrigger, SmartwatchClient,
    TracingSink, shutdown_channel,
};
use crate::payload::Credential;
use crate::transport::{Connector, TcpConnector};

/// A running client.
#[derive(Debug)]
pub struct ClientHandle {
    /// Client name.
    name: String,
    /// User the client logs in as.
    user: String,
    /// Latest lifecycle state.
    state: watch::Receiver<ClientState>,
    /// Stops this client only.
    trigger: ShutdownTrigger,
    /// The client's task.
    task: JoinHandle<ClientSummary>,
}

impl ClientHandle {
    /// Get the client name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the user the client logs in as.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Get the client's current lifecycle state.
    pub fn state(&self) -> ClientState {
        *self.state.borrow()
    }

    /// Subscribe to the client's lifecycle state.
    pub fn watch_state(&self) -> watch::Receiver<ClientState> {
        self.state.clone()
    }

    /// Check if the client task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal this client to stop.
    pub fn stop(&self) {
        self.trigger.trigger();
    }

    /// Stop the client and wait for it to release its session.
    ///
    /// Returns `None` if the client task panicked outside a lifecycle
    /// attempt (panics inside one are retried by the client itself).
    pub async fn join(self) -> Option<ClientSummary> {
        self.trigger.trigger();
        match self.task.await {
            Ok(summary) => {
                info!(
                    client = %summary.name,
                    retries = summary.retries,
                    "Stopped client"
                );
                Some(summary)
            }
            Err(e) => {
                error!(client = %self.name, error = %e, "Client task failed");
                None
            }
        }
    }
}

/// Owns every running client.
#[derive(Debug)]
pub struct Supervisor {
    /// Configuration handed to each new client.
    config: ClientConfig,
    /// Running clients, in start order.
    clients: Vec<ClientHandle>,
}

impl Supervisor {
    /// Create a supervisor that starts clients with `config`.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            clients: Vec::new(),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of clients started.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Check if no client has been started.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Running clients, in start order.
    pub fn clients(&self) -> &[ClientHandle] {
        &self.clients
    }

    /// Start a TCP client for `credential`, logging through `tracing`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&mut self, credential: Credential) -> &ClientHandle {
        let name = self.next_name();
        let connector = TcpConnector::new().inbound_buffer_size(self.config.inbound_buffer_size);
        let sink = TracingSink::new(name.clone());
        self.start(name, credential, connector, sink)
    }

    /// Start a client for `credential` on a custom connector and sink.
    pub fn spawn_with<C, K>(&mut self, credential: Credential, connector: C, sink: K) -> &ClientHandle
    where
        C: Connector + 'static,
        K: EventSink + 'static,
    {
        let name = self.next_name();
        self.start(name, credential, connector, sink)
    }

    /// Stop every client and wait for all of them.
    ///
    /// Summaries come back in start order; clients whose task panicked are
    /// left out.
    pub async fn shutdown_all(self) -> Vec<ClientSummary> {
        info!(clients = self.clients.len(), "Shutting down clients");
        for client in &self.clients {
            client.stop();
        }

        let mut summaries = Vec::with_capacity(self.clients.len());
        for client in self.clients {
            if let Some(summary) = client.join().await {
                summaries.push(summary);
            }
        }
        summaries
    }

    fn next_name(&self) -> String {
        format!("ClientThread-{}", self.clients.len() + 1)
    }

    fn start<C, K>(
        &mut self,
        name: String,
        credential: Credential,
        connector: C,
        sink: K,
    ) -> &ClientHandle
    where
        C: Connector + 'static,
        K: EventSink + 'static,
    {
        let user = credential.user().to_owned();
        let client = SmartwatchClient::new(
            name.clone(),
            credential,
            self.config.clone(),
            connector,
            sink,
        );
        let state = client.watch_state();
        let (trigger, shutdown) = shutdown_channel();
        let task = tokio::spawn(client.run(shutdown));

        info!(client = %name, %user, server = %self.config.server_addr, "Started client");

        self.clients.push(ClientHandle {
            name,
            user,
            state,
            trigger,
            task,
        });
        &self.clients[self.clients.len() - 1]
    }
}
