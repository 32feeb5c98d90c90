use std::sync::mpsc;

use tracing::warn;

use crate::event::GistEvent;

pub trait Dispatcher {
    fn dispatch(&self, event: GistEvent);
}

impl Dispatcher for mpsc::Sender<GistEvent> {
    fn dispatch(&self, event: GistEvent) {
        if let Err(e) = self.send(event) {
            warn!(event = ?e.0, "No receiver left for event");
        }
    }
}
