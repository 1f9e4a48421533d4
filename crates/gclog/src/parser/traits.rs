pub use super::model::Event;

/// Receives classified events in input order.
pub trait EventSink {
    fn accept(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn accept(&mut self, event: Event) {
        self.push(event);
    }
}

/// Sink backed by a closure, see [`from_fn`].
pub struct FnSink<F>(F);

impl<F: FnMut(Event)> EventSink for FnSink<F> {
    fn accept(&mut self, event: Event) {
        (self.0)(event);
    }
}

/// Wraps a closure as an [`EventSink`].
pub fn from_fn<F: FnMut(Event)>(f: F) -> FnSink<F> {
    FnSink(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::model::EventKind;

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<Event> = Vec::new();
        sink.accept(Event::bare(EventKind::Header, 1, "a"));
        sink.accept(Event::bare(EventKind::Unrecognized, 2, "b"));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[1].line_number, 2);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = from_fn(|event: Event| seen.push(event.line_number));
            sink.accept(Event::bare(EventKind::Header, 7, "x"));
        }
        assert_eq!(seen, vec![7]);
    }
}
