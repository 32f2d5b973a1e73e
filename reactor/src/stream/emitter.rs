use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{ErrorKind, ReactorError, ReactorResult};
use crate::stream::signal::Signal;
use crate::stream::subscription::Subscription;
use crate::{bail, reactor_error};

/// Terminal signal recorded by an [`Emitter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// The source completed normally.
    Completed,
    /// The source failed.
    Failed(ReactorError),
}

/// Producer-side handle used by a [`crate::stream::Publisher`] to push signals downstream.
///
/// [`Emitter::emit_next`] waits for demand before delivering, so a producer using it can never
/// run ahead of its consumer. At most one terminal signal is recorded: the first call to
/// [`Emitter::emit_error`] or [`Emitter::emit_complete`] wins and later calls are no-ops.
#[derive(Debug)]
pub struct Emitter<T> {
    tx: mpsc::Sender<Signal<T>>,
    subscription: Subscription,
    termination: Option<Termination>,
    /// Whether terminal signals are sent downstream or only recorded for the owner to inspect.
    forward_termination: bool,
}

impl<T> Emitter<T> {
    /// Creates an emitter that forwards every signal to `tx`.
    pub(crate) fn new(tx: mpsc::Sender<Signal<T>>, subscription: Subscription) -> Self {
        Self {
            tx,
            subscription,
            termination: None,
            forward_termination: true,
        }
    }

    /// Creates an emitter for one attempt of a resubscribing source.
    ///
    /// Items go straight downstream using the same demand, while the terminal signal is only
    /// recorded so that the owner can decide whether to propagate it.
    pub(crate) fn attempt(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            subscription: self.subscription.clone(),
            termination: None,
            forward_termination: false,
        }
    }

    /// Delivers the next item once the consumer has demand for it.
    ///
    /// Fails with [`ErrorKind::StreamCancelled`] when the consumer cancelled or went away and
    /// with [`ErrorKind::InvalidState`] when a terminal signal was already emitted.
    pub async fn emit_next(&mut self, item: T) -> ReactorResult<()> {
        if self.termination.is_some() {
            bail!(
                ErrorKind::InvalidState,
                "Cannot emit an item after a terminal signal"
            );
        }

        self.subscription.acquire().await?;

        self.tx
            .send(Signal::Next(item))
            .await
            .map_err(|_| reactor_error!(ErrorKind::StreamCancelled, "Consumer dropped the stream"))
    }

    /// Signals a terminal failure.
    ///
    /// Returns `true` if this call recorded the terminal signal.
    pub async fn emit_error(&mut self, error: ReactorError) -> bool {
        self.terminate(Termination::Failed(error)).await
    }

    /// Signals normal completion.
    ///
    /// Returns `true` if this call recorded the terminal signal.
    pub async fn emit_complete(&mut self) -> bool {
        self.terminate(Termination::Completed).await
    }

    /// Returns `true` once a terminal signal has been emitted.
    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    /// Returns `true` once the consumer cancelled the subscription.
    pub fn is_cancelled(&self) -> bool {
        self.subscription.is_cancelled()
    }

    /// Returns the subscription this emitter draws demand from.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Takes the recorded terminal signal, if any.
    pub(crate) fn take_termination(&mut self) -> Option<Termination> {
        self.termination.take()
    }

    /// Completes the stream if the publisher returned without emitting a terminal signal.
    pub(crate) async fn finish(mut self) {
        if self.termination.is_none() && !self.is_cancelled() {
            self.emit_complete().await;
        }
    }

    async fn terminate(&mut self, termination: Termination) -> bool {
        if self.termination.is_some() {
            return false;
        }

        if self.forward_termination {
            let signal = match &termination {
                Termination::Completed => Signal::Complete,
                Termination::Failed(err) => Signal::Error(err.clone()),
            };

            // The consumer may already be gone, in which case there is nobody left to notify.
            if self.tx.send(signal).await.is_err() {
                debug!("terminal signal dropped, consumer already gone");
            }
        }

        self.termination = Some(termination);

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn terminal_signal_is_sent_once() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut emitter: Emitter<u32> = Emitter::new(tx, Subscription::new());

        assert!(emitter.emit_complete().await);
        assert!(!emitter.emit_complete().await);
        assert!(
            !emitter
                .emit_error(reactor_error!(ErrorKind::SimulatedFault, "late fault"))
                .await
        );
        drop(emitter);

        assert!(matches!(rx.recv().await, Some(Signal::Complete)));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn emit_after_terminal_is_invalid() {
        let (tx, _rx) = mpsc::channel(8);
        let subscription = Subscription::new();
        subscription.request(1).unwrap();
        let mut emitter = Emitter::new(tx, subscription);
        emitter.emit_complete().await;

        let err = emitter.emit_next(1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn attempt_records_termination_without_forwarding() {
        let (tx, mut rx) = mpsc::channel(8);
        let subscription = Subscription::new();
        subscription.request(1).unwrap();
        let emitter = Emitter::new(tx, subscription);

        let mut attempt = emitter.attempt();
        attempt.emit_next(7).await.unwrap();
        attempt
            .emit_error(reactor_error!(ErrorKind::SimulatedFault, "fault"))
            .await;
        drop(attempt);
        drop(emitter);

        assert!(matches!(rx.recv().await, Some(Signal::Next(7))));
        assert!(rx.recv().await.is_none());
    }
}
