//! Topic resolution

use contracts::{Event, TopicId};

/// Derive the broker topic for an event: `domain_subdomain_code`.
///
/// Expects a validated event; empty classification fields are not rejected here.
pub fn resolve_topic(event: &Event) -> TopicId {
    TopicId::from_parts(&event.domain, &event.subdomain, &event.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_topic() {
        let event = Event::new("evt-1", "Banking", "Domestic", "Created");
        assert_eq!(resolve_topic(&event), "Banking_Domestic_Created");
    }

    #[test]
    fn test_deterministic_and_independent_of_other_fields() {
        let a = Event::new("a", "Cards", "Intl", "Settled").with_payload("one");
        let mut b = Event::new("b", "Cards", "Intl", "Settled").with_payload("two");
        b.user_id = 42;

        assert_eq!(resolve_topic(&a), resolve_topic(&b));
        assert_eq!(resolve_topic(&a), resolve_topic(&a));
    }

    #[test]
    fn test_case_sensitive() {
        let a = Event::new("a", "banking", "domestic", "created");
        let b = Event::new("b", "Banking", "Domestic", "Created");
        assert_ne!(resolve_topic(&a), resolve_topic(&b));
    }
}
