//! Structural event validation

use contracts::Event;

/// Check that an event can be correlated and routed.
///
/// True iff `id`, `domain`, `subdomain` and `code` are all non-empty. No other
/// field is looked at; the rest of the event is opaque payload.
pub fn validate(event: &Event) -> bool {
    !event.id.is_empty()
        && !event.domain.is_empty()
        && !event.subdomain.is_empty()
        && !event.code.is_empty()
}
