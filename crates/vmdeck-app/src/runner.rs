//! Real-time drive for a [`Session`].
//!
//! The session lives on one tokio task. Elapsed wall time since the task
//! started is mapped onto the session's virtual timeline on every tick and
//! before every operator command, so timers fire close to when they are due
//! without the session ever seeing a lock.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use vmdeck_session::{GuestProfile, LogLevel, Session, SessionError, SessionSnapshot};

const COMMAND_QUEUE_DEPTH: usize = 32;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("session runner has shut down")]
    Closed,

    #[error("session runner task failed: {0}")]
    Join(#[from] JoinError),
}

/// Operator requests accepted by the runner
#[derive(Debug, Clone)]
pub enum Command {
    Select(GuestProfile),
    Start,
    Pause,
    Reset,
    Stop,
    ClearLogs,
    Log {
        source: String,
        level: LogLevel,
        message: String,
    },
    /// Catch up with wall time and report the current snapshot
    Snapshot,
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
}

/// Client side of a running session
pub struct RunnerHandle {
    commands: mpsc::Sender<Request>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<Session>,
}

/// Move `session` onto its own task and start driving it every `tick`
pub fn spawn(session: Session, tick: Duration) -> RunnerHandle {
    let (commands, requests) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (publisher, snapshots) = watch::channel(session.snapshot());
    let task = tokio::spawn(drive(session, tick, requests, publisher));

    RunnerHandle {
        commands,
        snapshots,
        task,
    }
}

async fn drive(
    mut session: Session,
    tick: Duration,
    mut requests: mpsc::Receiver<Request>,
    publisher: watch::Sender<SessionSnapshot>,
) -> Session {
    let origin = Instant::now();
    let base = session.now();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(tick_ms = tick.as_millis() as u64, "session runner started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.advance_to(base + origin.elapsed());
            }
            request = requests.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };
                session.advance_to(base + origin.elapsed());
                let result = apply(&mut session, command).map(|()| session.snapshot());
                if reply.send(result).is_err() {
                    tracing::debug!("caller dropped before the reply was sent");
                }
            }
        }

        publisher.send_if_modified(|current| {
            if current.revision == session.revision() {
                return false;
            }
            *current = session.snapshot();
            true
        });
    }

    tracing::debug!(revision = session.revision(), "session runner stopped");
    session
}

fn apply(session: &mut Session, command: Command) -> Result<(), SessionError> {
    match command {
        Command::Select(guest) => session.select_guest(guest),
        Command::Start => session.start(),
        Command::Pause => session.pause(),
        Command::Reset => session.reset(),
        Command::Stop => session.stop(),
        Command::ClearLogs => {
            session.clear_logs();
            Ok(())
        }
        Command::Log { source, level, message } => {
            session.log(&source, level, message);
            Ok(())
        }
        Command::Snapshot => Ok(()),
    }
}

impl RunnerHandle {
    /// Send one command and wait for the snapshot taken right after it
    pub async fn execute(&self, command: Command) -> Result<SessionSnapshot, RunnerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Request { command, reply })
            .await
            .map_err(|_| RunnerError::Closed)?;
        let result = response.await.map_err(|_| RunnerError::Closed)?;
        Ok(result?)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, RunnerError> {
        self.execute(Command::Snapshot).await
    }

    /// Receiver that is notified whenever a newer snapshot is published
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot, without waiting for the runner
    pub fn latest(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stop driving and hand the session back
    pub async fn shutdown(self) -> Result<Session, RunnerError> {
        let RunnerHandle { commands, task, .. } = self;
        drop(commands);
        Ok(task.await?)
    }
}
