//! One-way channel from gesture engines to the state owner.
//!
//! Engines run wherever input arrives; only the owner mutates `EditorState`. Delivery is FIFO
//! per sender, so the last `Commit` drained for a layer is its most recent gesture end.

use std::sync::mpsc;

use crate::canvas::layer::LayerId;
use crate::gesture::engine::{EventSink, GestureEvent};

#[derive(Clone, Debug, PartialEq)]
pub struct LayerCommand {
    pub layer: LayerId,
    pub event: GestureEvent,
}

#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: mpsc::Sender<LayerCommand>,
}

#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::Receiver<LayerCommand>,
}

pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel();
    (CommandSender { tx }, CommandReceiver { rx })
}

impl CommandSender {
    /// Returns `false` once the owner has gone away.
    pub fn send(&self, layer: LayerId, event: GestureEvent) -> bool {
        self.tx.send(LayerCommand { layer, event }).is_ok()
    }
}

impl EventSink for CommandSender {
    fn emit(&mut self, layer: &LayerId, event: GestureEvent) {
        if !self.send(layer.clone(), event) {
            tracing::debug!(%layer, "gesture event dropped, owner disconnected");
        }
    }
}

impl CommandReceiver {
    /// Everything queued so far, without blocking.
    pub fn drain(&self) -> Vec<LayerCommand> {
        self.rx.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<LayerCommand> {
        self.rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gesture/queue.rs"]
mod tests;
