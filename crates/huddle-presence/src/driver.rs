//! Async driver running a [`PresenceMachine`] against a [`PresenceStore`].
//!
//! Events arrive over an mpsc channel; the loop sleeps until either the next
//! event or the machine's next deadline.  Store calls are spawned and never
//! awaited by the loop: a failed write is logged and left for the next
//! qualifying event (or the store's disconnect rule) to correct.

use std::sync::Arc;

use huddle_shared::{PresenceStatus, UserId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::PresenceConfig;
use crate::error::PresenceError;
use crate::event::PresenceEvent;
use crate::machine::{PresenceCommand, PresenceMachine};
use crate::store::PresenceStore;

const EVENT_QUEUE_DEPTH: usize = 64;

/// Handle to a running presence driver.
pub struct PresenceHandle {
    event_tx: mpsc::Sender<PresenceEvent>,
    task: JoinHandle<()>,
}

impl PresenceHandle {
    pub async fn send(&self, event: PresenceEvent) -> Result<(), PresenceError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| PresenceError::DriverStopped)
    }

    /// Stop accepting events and wait for the loop to drain.
    pub async fn shutdown(self) {
        drop(self.event_tx);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Presence driver task failed");
        }
    }
}

/// Spawn the presence loop for `uid`.
pub fn spawn_presence<S>(store: Arc<S>, uid: UserId, config: PresenceConfig) -> PresenceHandle
where
    S: PresenceStore + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let machine = PresenceMachine::new(config);

    let task = tokio::spawn(event_loop(store, uid, machine, event_rx));

    PresenceHandle { event_tx, task }
}

async fn event_loop<S>(
    store: Arc<S>,
    uid: UserId,
    mut machine: PresenceMachine,
    mut event_rx: mpsc::Receiver<PresenceEvent>,
) where
    S: PresenceStore + 'static,
{
    info!(user = %uid, "Presence driver started");

    loop {
        let deadline = machine.next_deadline();

        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                debug!(user = %uid, ?event, "Presence event");
                let commands = machine.handle(event, Instant::now());
                execute(&store, &uid, commands);
            }
            _ = wait_for(deadline) => {
                let commands = machine.poll(Instant::now());
                execute(&store, &uid, commands);
            }
        }
    }

    info!(user = %uid, "Presence driver stopped");
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn execute<S>(store: &Arc<S>, uid: &UserId, commands: Vec<PresenceCommand>)
where
    S: PresenceStore + 'static,
{
    for command in commands {
        let store = Arc::clone(store);
        let uid = uid.clone();

        tokio::spawn(async move {
            let result = match command {
                PresenceCommand::Write(status) => store.set_status(&uid, status).await,
                PresenceCommand::RegisterDisconnectRule => {
                    store.on_disconnect_set(&uid, PresenceStatus::Offline).await
                }
                PresenceCommand::CancelDisconnectRule => store.cancel_on_disconnect(&uid).await,
                PresenceCommand::ResumeIfAway => resume_if_away(store.as_ref(), &uid).await,
            };

            if let Err(e) = result {
                warn!(user = %uid, ?command, error = %e, "Presence update failed");
            }
        });
    }
}

async fn resume_if_away<S>(store: &S, uid: &UserId) -> Result<(), PresenceError>
where
    S: PresenceStore + ?Sized,
{
    match store.get(uid).await? {
        Some(record) if record.status == PresenceStatus::Away => {
            store.set_status(uid, PresenceStatus::Online).await
        }
        _ => Ok(()),
    }
}
