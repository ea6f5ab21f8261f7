//! Partitioning of events by type and per-type gold/prediction tallies

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;
use willeval_core::Event;

/// Event type -> events of that type, in document order
pub type EventGroups<'a> = BTreeMap<&'a str, Vec<&'a Event>>;

/// Gold and prediction record counts for one event type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub gold: usize,
    pub prediction: usize,
}

/// Group events by their declared type, dropping events that have none
pub fn group_by_type(events: &[Event]) -> EventGroups<'_> {
    let mut groups: EventGroups<'_> = BTreeMap::new();

    for event in events {
        match event.event_type.as_deref() {
            Some(event_type) => groups.entry(event_type).or_default().push(event),
            None => warn!(event_id = %event.id, "event has no type, skipping"),
        }
    }

    groups
}

/// Count table over the union of types seen on either side
pub fn count_by_type<'a>(
    gold: &EventGroups<'a>,
    prediction: &EventGroups<'a>,
) -> BTreeMap<&'a str, TypeCount> {
    let mut counts: BTreeMap<&'a str, TypeCount> = BTreeMap::new();

    for (&event_type, events) in gold {
        counts.entry(event_type).or_default().gold = events.len();
    }
    for (&event_type, events) in prediction {
        counts.entry(event_type).or_default().prediction = events.len();
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_by_type() {
        let events = vec![
            Event::new("v1", "Bequest"),
            Event::new("v2", "SignWill"),
            Event::new("v3", "Bequest"),
        ];

        let groups = group_by_type(&events);

        assert_eq!(groups.len(), 2);
        let bequests: Vec<&str> = groups["Bequest"].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(bequests, ["v1", "v3"]);
        assert_eq!(groups["SignWill"].len(), 1);
    }

    #[test]
    fn test_untyped_events_dropped() {
        let events = vec![
            Event {
                id: "v1".to_string(),
                ..Event::default()
            },
            Event::new("v2", "Revocation"),
        ];

        let groups = group_by_type(&events);
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key("Revocation"));
    }

    #[test]
    fn test_count_by_type_union() {
        let gold_events = vec![
            Event::new("g1", "Bequest"),
            Event::new("g2", "Bequest"),
            Event::new("g3", "SignWill"),
        ];
        let prediction_events = vec![Event::new("p1", "Bequest"), Event::new("p2", "Appoint")];

        let gold = group_by_type(&gold_events);
        let prediction = group_by_type(&prediction_events);
        let counts = count_by_type(&gold, &prediction);

        assert_eq!(counts.len(), 3);
        assert_eq!(counts["Bequest"], TypeCount { gold: 2, prediction: 1 });
        assert_eq!(counts["SignWill"], TypeCount { gold: 1, prediction: 0 });
        assert_eq!(counts["Appoint"], TypeCount { gold: 0, prediction: 1 });
    }
}
