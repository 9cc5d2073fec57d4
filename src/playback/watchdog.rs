//! Load-timeout watchdog.
//!
//! At most one deadline exists per session. Arming replaces the previous
//! deadline, which drops (cancels) the old timer before it can fire.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Sleep};

#[derive(Debug, Default)]
pub(crate) struct Watchdog {
    deadline: Option<Pin<Box<Sleep>>>,
}

impl Watchdog {
    pub fn arm(&mut self, timeout: Duration) {
        self.deadline = Some(Box::pin(time::sleep(timeout)));
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves once the armed deadline passes, then disarms. Pends forever
    /// while disarmed. Cancel-safe: dropping the future keeps the deadline.
    pub async fn expired(&mut self) {
        match self.deadline.as_mut() {
            Some(sleep) => {
                sleep.await;
                self.deadline = None;
            }
            None => pending::<()>().await,
        }
    }
}
