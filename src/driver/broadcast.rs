//! Snapshot fan-out to subscribers
//!
//! Frames are serialized once and shared as `Arc<str>`, so every subscriber
//! gets the same bytes without another copy.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use log::debug;

use crate::simulation::SimSnapshot;

/// A serialized snapshot, ready to forward
pub type Frame = Arc<str>;

#[derive(Default)]
pub struct Broadcaster {
    subscribers: Mutex<Vec<Sender<Frame>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<Frame> {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Send a frame to every subscriber, dropping the ones that went away
    ///
    /// Returns how many subscribers received it.
    pub fn publish(&self, frame: Frame) -> usize {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|tx| tx.send(Arc::clone(&frame)).is_ok());
        if subscribers.len() < before {
            debug!("Dropped {} disconnected subscriber(s)", before - subscribers.len());
        }
        subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Frame>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Serialize a snapshot into a JSON frame
pub fn encode_snapshot(snapshot: &SimSnapshot) -> Result<Frame> {
    let json = serde_json::to_string(snapshot).context("Failed to encode snapshot")?;
    Ok(Arc::from(json))
}
