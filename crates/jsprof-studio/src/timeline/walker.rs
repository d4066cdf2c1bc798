//! Drive a visitor over a time-ordered event stream.
//!
//! Duration events nest: an event is open from its start until a later event
//! starts at or after its end. Instant events (and events of zero duration)
//! are reported together with the innermost open duration event.

use super::event::{Timestamp, TraceEvent};

/// Callbacks invoked by [`for_each_event`] in strict stream order
pub trait EventVisitor {
    fn on_start(&mut self, event: &TraceEvent);
    fn on_end(&mut self, event: &TraceEvent);
    fn on_instant(&mut self, event: &TraceEvent, parent: Option<&TraceEvent>);
}

/// Walk `events`, which must already be ordered by start time
///
/// Events that end before `start_time` are skipped. Duration events still
/// open when the stream runs out are ended innermost first.
pub fn for_each_event<V: EventVisitor + ?Sized>(
    events: &[TraceEvent],
    start_time: Timestamp,
    visitor: &mut V,
) {
    let mut open: Vec<&TraceEvent> = Vec::new();

    for event in events {
        if event.end_time.unwrap_or(event.start_time) < start_time {
            continue;
        }

        while let Some(&last) = open.last() {
            if !last.end_time.is_some_and(|end| end <= event.start_time) {
                break;
            }
            open.pop();
            visitor.on_end(last);
        }

        if event.duration().is_some_and(|d| d > 0.0) {
            visitor.on_start(event);
            open.push(event);
        } else {
            visitor.on_instant(event, open.last().copied());
        }
    }

    while let Some(last) = open.pop() {
        visitor.on_end(last);
    }
}

/// Merge invocation events and samples into one stable, time-ordered stream
///
/// At equal start times invocation events precede samples, so a sample taken
/// at the very start of an invocation is parented by it.
pub fn merge_events(invocations: Vec<TraceEvent>, samples: Vec<TraceEvent>) -> Vec<TraceEvent> {
    let mut events = invocations;
    events.extend(samples);
    events.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl EventVisitor for Recorder {
        fn on_start(&mut self, event: &TraceEvent) {
            self.calls.push(format!("start {}", event.name));
        }

        fn on_end(&mut self, event: &TraceEvent) {
            self.calls.push(format!("end {}", event.name));
        }

        fn on_instant(&mut self, event: &TraceEvent, parent: Option<&TraceEvent>) {
            let parent = parent.map_or("-", |p| p.name.as_str());
            self.calls.push(format!("instant {} in {}", event.name, parent));
        }
    }

    #[test]
    fn test_nesting_and_parents() {
        let events = vec![
            TraceEvent::complete("outer", 0.0, 10.0),
            TraceEvent::instant("a", 1.0),
            TraceEvent::complete("inner", 2.0, 4.0),
            TraceEvent::instant("b", 3.0),
            TraceEvent::instant("c", 5.0),
            TraceEvent::instant("d", 12.0),
        ];

        let mut recorder = Recorder::default();
        for_each_event(&events, 0.0, &mut recorder);

        assert_eq!(
            recorder.calls,
            vec![
                "start outer",
                "instant a in outer",
                "start inner",
                "instant b in inner",
                "end inner",
                "instant c in outer",
                "end outer",
                "instant d in -",
            ]
        );
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let events = vec![TraceEvent::complete("blip", 1.0, 1.0)];
        let mut recorder = Recorder::default();
        for_each_event(&events, 0.0, &mut recorder);
        assert_eq!(recorder.calls, vec!["instant blip in -"]);
    }

    #[test]
    fn test_open_events_end_at_stream_end() {
        let events = vec![
            TraceEvent::complete("outer", 0.0, 10.0),
            TraceEvent::complete("inner", 1.0, 9.0),
        ];
        let mut recorder = Recorder::default();
        for_each_event(&events, 0.0, &mut recorder);
        assert_eq!(
            recorder.calls,
            vec!["start outer", "start inner", "end inner", "end outer"]
        );
    }

    #[test]
    fn test_events_before_start_time_are_skipped() {
        let events = vec![
            TraceEvent::complete("early", 0.0, 2.0),
            TraceEvent::instant("late", 6.0),
        ];
        let mut recorder = Recorder::default();
        for_each_event(&events, 5.0, &mut recorder);
        assert_eq!(recorder.calls, vec!["instant late in -"]);
    }

    #[test]
    fn test_merge_is_stable() {
        let merged = merge_events(
            vec![TraceEvent::complete("FunctionCall", 1.0, 3.0)],
            vec![
                TraceEvent::instant("JSSample", 0.0),
                TraceEvent::instant("JSSample", 1.0),
            ],
        );
        let order: Vec<(&str, f64)> = merged
            .iter()
            .map(|e| (e.name.as_str(), e.start_time))
            .collect();
        assert_eq!(
            order,
            vec![("JSSample", 0.0), ("FunctionCall", 1.0), ("JSSample", 1.0)]
        );
    }
}
