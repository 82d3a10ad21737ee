use tokio::sync::{mpsc, watch};

/// Progress sink for a resolution run
pub trait ProgressReporter: Send + Sync {
    /// Start a new step with optional total steps
    fn start_step(&self, name: &str, total_steps: Option<u32>);

    /// Set a numeric step count for the current step (e.g. "3/12").
    /// `total` may be None when unknown.
    fn set_step_count(&self, current: u32, total: Option<u32>);

    /// Set a short status message
    fn set_message(&self, message: &str);

    /// Mark operation as complete
    fn done(&self, success: bool, message: Option<&str>);

    /// Check if operation has been cancelled
    fn is_cancelled(&self) -> bool;
}

pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_step(&self, _name: &str, _total_steps: Option<u32>) {}
    fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
    fn set_message(&self, _message: &str) {}
    fn done(&self, _success: bool, _message: Option<&str>) {}
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Progress updates as delivered to the UI side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    StepStarted {
        name: String,
        total_steps: Option<u32>,
    },
    StepCount {
        current: u32,
        total: Option<u32>,
    },
    Message(String),
    Done {
        success: bool,
        message: Option<String>,
    },
}

/// Forwards every update as a [`ProgressEvent`] over an mpsc channel.
///
/// Sends never block; if the receiver is gone the events are dropped.
pub struct ChannelProgressReporter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
    cancel: Option<CancelToken>,
}

impl ChannelProgressReporter {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx, cancel: None }
    }

    /// Reporter plus the receiving end for the UI
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn send(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Progress receiver dropped, discarding event");
        }
    }
}

impl ProgressReporter for ChannelProgressReporter {
    fn start_step(&self, name: &str, total_steps: Option<u32>) {
        self.send(ProgressEvent::StepStarted {
            name: name.to_string(),
            total_steps,
        });
    }

    fn set_step_count(&self, current: u32, total: Option<u32>) {
        self.send(ProgressEvent::StepCount { current, total });
    }

    fn set_message(&self, message: &str) {
        self.send(ProgressEvent::Message(message.to_string()));
    }

    fn done(&self, success: bool, message: Option<&str>) {
        self.send(ProgressEvent::Done {
            success,
            message: message.map(str::to_string),
        });
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Cancellation token wrapper
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// A linked handle/token pair
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken::new(rx))
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Owner side of a [`CancelToken`]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn token(&self) -> CancelToken {
        CancelToken::new(self.tx.subscribe())
    }
}
