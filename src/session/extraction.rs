use crate::platform::CancelToken;

/// Handle for one background-subject extraction.
///
/// A result is applied only when its ticket is still the newest one and was not cancelled;
/// changing the background or resetting the session bumps the generation.
#[derive(Clone, Debug)]
pub struct ExtractionTicket {
    pub generation: u64,
    pub image_uri: String,
    pub cancel: CancelToken,
}

#[derive(Debug, Default)]
pub(crate) struct ExtractionTracker {
    generation: u64,
    current: Option<CancelToken>,
}

impl ExtractionTracker {
    pub(crate) fn issue(&mut self, image_uri: String) -> ExtractionTicket {
        self.invalidate();
        let cancel = CancelToken::new();
        self.current = Some(cancel.clone());
        ExtractionTicket {
            generation: self.generation,
            image_uri,
            cancel,
        }
    }

    /// Cancel whatever is in flight.
    pub(crate) fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    pub(crate) fn is_current(&self, ticket: &ExtractionTicket) -> bool {
        ticket.generation == self.generation && !ticket.cancel.is_cancelled()
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn finish(&mut self, ticket: &ExtractionTicket) {
        if ticket.generation == self.generation {
            self.current = None;
        }
    }
}
