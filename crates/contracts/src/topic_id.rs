//! TopicId - Cheap-to-clone broker topic identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Separator placed between the classification fields of a topic.
pub const TOPIC_SEPARATOR: char = '_';

/// Broker topic identifier with cheap cloning.
///
/// A topic is derived per event and then cloned into the group key, the
/// publish task and the reconciliation lookup, so cloning only increments a
/// reference count.
///
/// # Examples
/// ```
/// use contracts::TopicId;
///
/// let topic = TopicId::from_parts("Banking", "Domestic", "Created");
/// assert_eq!(topic, "Banking_Domestic_Created");
/// ```
#[derive(Clone, Default)]
pub struct TopicId(Arc<str>);

impl TopicId {
    /// Create a new TopicId from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Join classification fields with [`TOPIC_SEPARATOR`].
    ///
    /// Separators inside the fields are not escaped: `("a_b", "c", "d")` and
    /// `("a", "b_c", "d")` produce the same topic.
    pub fn from_parts(domain: &str, subdomain: &str, code: &str) -> Self {
        let mut topic = String::with_capacity(domain.len() + subdomain.len() + code.len() + 2);
        topic.push_str(domain);
        topic.push(TOPIC_SEPARATOR);
        topic.push_str(subdomain);
        topic.push(TOPIC_SEPARATOR);
        topic.push_str(code);
        Self::from(topic)
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for TopicId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for TopicId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TopicId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TopicId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for TopicId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicId({:?})", self.0)
    }
}

impl PartialEq for TopicId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for TopicId {}

impl PartialEq<str> for TopicId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for TopicId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for TopicId {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Hash - same as str hash so HashMap<TopicId, _> can be queried with &str
impl Hash for TopicId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_parts() {
        let topic = TopicId::from_parts("Banking", "Domestic", "Created");
        assert_eq!(topic.as_str(), "Banking_Domestic_Created");
    }

    #[test]
    fn test_separator_collision_is_not_escaped() {
        let a = TopicId::from_parts("a_b", "c", "d");
        let b = TopicId::from_parts("a", "b_c", "d");
        assert_eq!(a, b);
    }

    #[test]
    fn test_clone_is_cheap() {
        let t1: TopicId = "orders".into();
        let t2 = t1.clone();
        assert_eq!(t1.as_str().as_ptr(), t2.as_str().as_ptr());
    }

    #[test]
    fn test_hashmap_lookup_by_str() {
        let mut map: HashMap<TopicId, usize> = HashMap::new();
        map.insert(TopicId::from_parts("A", "B", "C"), 1);
        assert_eq!(map.get("A_B_C"), Some(&1));
    }
}
