//! Event dispatcher
//!
//! A single thread owns a min-heap of timed tasks: triggers (play one event)
//! and releases (free one voice after the grace period). Producers send
//! commands over a channel and never block; the thread sleeps until either
//! the next deadline or the next command, whichever comes first.
//!
//! Every deadline is absolute (`start + offset`), computed once when the
//! events are scheduled, so a slow trigger never pushes later ones back.

use super::output::VoiceHandle;
use super::playback_engine::Player;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use strand_core::TriggerEvent;
use tracing::{debug, trace, warn};

/// Identifies the events of one `schedule` call
pub type RequestId = u64;

type TaskId = u64;

#[derive(Debug)]
enum TaskAction {
    Trigger {
        request: RequestId,
        event: TriggerEvent,
    },
    Release(VoiceHandle),
}

#[derive(Debug)]
struct ScheduledTask {
    deadline: Instant,
    /// Insertion order, breaks ties between equal deadlines
    id: TaskId,
    action: TaskAction,
}

impl ScheduledTask {
    fn is_trigger(&self) -> bool {
        matches!(self.action, TaskAction::Trigger { .. })
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    // Reversed so BinaryHeap pops the earliest deadline first
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Commands that can be sent to the dispatcher
#[derive(Debug)]
pub enum DispatcherCommand {
    /// Queue events relative to `start`
    Schedule {
        request: RequestId,
        events: Vec<TriggerEvent>,
        start: Instant,
    },
    /// Release a voice that was played directly, after a delay
    ReleaseAfter(VoiceHandle, Duration),
    /// Drop the pending triggers of one request
    Cancel(RequestId),
    /// Drop every pending trigger and release every voice now
    StopAll,
    Shutdown,
}

/// Handle for sending commands to the dispatcher thread
#[derive(Clone)]
pub struct DispatcherHandle {
    command_tx: Sender<DispatcherCommand>,
    next_request_id: Arc<AtomicU64>,
    pending: Arc<AtomicUsize>,
    is_running: Arc<AtomicBool>,
}

impl DispatcherHandle {
    /// Queue `events` with offsets measured from `start`
    pub fn schedule(&self, events: Vec<TriggerEvent>, start: Instant) -> RequestId {
        let request = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        // Counted here rather than on the thread so callers never observe
        // a scheduled request as idle
        self.pending.fetch_add(events.len(), Ordering::SeqCst);
        let count = events.len();

        if self
            .command_tx
            .send(DispatcherCommand::Schedule {
                request,
                events,
                start,
            })
            .is_err()
        {
            self.pending.fetch_sub(count, Ordering::SeqCst);
            warn!("Dispatcher is not running, request {} dropped", request);
        }
        request
    }

    pub fn release_after(&self, handle: VoiceHandle, delay: Duration) {
        let _ = self
            .command_tx
            .send(DispatcherCommand::ReleaseAfter(handle, delay));
    }

    pub fn cancel(&self, request: RequestId) {
        let _ = self.command_tx.send(DispatcherCommand::Cancel(request));
    }

    pub fn stop_all(&self) {
        let _ = self.command_tx.send(DispatcherCommand::StopAll);
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(DispatcherCommand::Shutdown);
    }

    /// Trigger events queued but not yet fired
    pub fn pending_events(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }
}

/// Owns the delay queue; lives on its own thread
pub struct EventDispatcher {
    queue: BinaryHeap<ScheduledTask>,
    player: Arc<Player>,
    grace_period: Duration,
    command_rx: Receiver<DispatcherCommand>,
    next_task_id: TaskId,
    pending: Arc<AtomicUsize>,
    is_running: Arc<AtomicBool>,
}

impl EventDispatcher {
    /// Start the dispatcher thread. Voices are released `grace_period`
    /// after they start.
    pub fn spawn(
        player: Arc<Player>,
        grace_period: Duration,
    ) -> std::io::Result<(DispatcherHandle, JoinHandle<()>)> {
        let (command_tx, command_rx) = unbounded();
        let pending = Arc::new(AtomicUsize::new(0));
        let is_running = Arc::new(AtomicBool::new(true));

        let dispatcher = EventDispatcher {
            queue: BinaryHeap::new(),
            player,
            grace_period,
            command_rx,
            next_task_id: 0,
            pending: pending.clone(),
            is_running: is_running.clone(),
        };

        let thread = thread::Builder::new()
            .name("strand-dispatcher".into())
            .spawn(move || dispatcher.run_loop())?;

        let handle = DispatcherHandle {
            command_tx,
            next_request_id: Arc::new(AtomicU64::new(1)),
            pending,
            is_running,
        };
        Ok((handle, thread))
    }

    /// Main dispatcher loop
    fn run_loop(mut self) {
        loop {
            let command = match self.queue.peek().map(|task| task.deadline) {
                Some(deadline) => match self.command_rx.recv_deadline(deadline) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.command_rx.recv() {
                    Ok(cmd) => Some(cmd),
                    Err(_) => break,
                },
            };

            if let Some(cmd) = command {
                if !self.handle_command(cmd) {
                    break;
                }
            }

            self.dispatch_due();
        }

        self.clear();
        self.is_running.store(false, Ordering::Relaxed);
        debug!("Dispatcher stopped");
    }

    /// Handle a command, returns false if should shutdown
    fn handle_command(&mut self, cmd: DispatcherCommand) -> bool {
        match cmd {
            DispatcherCommand::Schedule {
                request,
                events,
                start,
            } => {
                debug!("Request {}: {} events queued", request, events.len());
                for event in events {
                    let Some(deadline) = event.offset().and_then(|o| start.checked_add(o)) else {
                        warn!(
                            "Request {}: dropped '{}', offset {}s is out of range",
                            request, event.note, event.offset_seconds
                        );
                        self.pending.fetch_sub(1, Ordering::SeqCst);
                        continue;
                    };
                    self.push(deadline, TaskAction::Trigger { request, event });
                }
            }
            DispatcherCommand::ReleaseAfter(handle, delay) => {
                self.push(Instant::now() + delay, TaskAction::Release(handle));
            }
            DispatcherCommand::Cancel(request) => {
                let before = self.queue.len();
                self.queue.retain(|task| {
                    !matches!(task.action, TaskAction::Trigger { request: r, .. } if r == request)
                });
                let removed = before - self.queue.len();
                self.pending.fetch_sub(removed, Ordering::SeqCst);
                debug!("Request {}: {} pending events cancelled", request, removed);
            }
            DispatcherCommand::StopAll => {
                self.clear();
            }
            DispatcherCommand::Shutdown => {
                return false;
            }
        }
        true
    }

    fn push(&mut self, deadline: Instant, action: TaskAction) {
        let id = self.next_task_id;
        self.next_task_id += 1;
        self.queue.push(ScheduledTask {
            deadline,
            id,
            action,
        });
    }

    /// Fire every task whose deadline has passed, earliest first
    fn dispatch_due(&mut self) {
        let now = Instant::now();
        while self.queue.peek().is_some_and(|task| task.deadline <= now) {
            let Some(task) = self.queue.pop() else {
                break;
            };
            match task.action {
                TaskAction::Trigger { request, event } => {
                    self.trigger(request, &event);
                    self.pending.fetch_sub(1, Ordering::SeqCst);
                }
                TaskAction::Release(handle) => {
                    trace!("Releasing {}", handle);
                    self.player.release(handle);
                }
            }
        }
    }

    /// Play one event. A failure only loses this event.
    fn trigger(&mut self, request: RequestId, event: &TriggerEvent) {
        match self.player.play(event.instrument, Some(&event.note)) {
            Ok(handle) => {
                trace!(
                    "Request {}: {} '{}' at +{:.3}s -> {}",
                    request,
                    event.instrument,
                    event.note,
                    event.offset_seconds,
                    handle
                );
                self.push(Instant::now() + self.grace_period, TaskAction::Release(handle));
            }
            Err(e) => {
                warn!(
                    "Request {}: dropped '{}' at +{:.3}s: {}",
                    request, event.note, event.offset_seconds, e
                );
            }
        }
    }

    /// Drop every queued task and release every voice
    fn clear(&mut self) {
        let triggers = self.queue.iter().filter(|task| task.is_trigger()).count();
        self.queue.clear();
        self.pending.fetch_sub(triggers, Ordering::SeqCst);

        let released = self.player.release_all();
        if triggers > 0 || released > 0 {
            debug!(
                "Cleared {} pending events and released {} voices",
                triggers, released
            );
        }
    }
}
