//! Topics and subscription matching.
//!
//! A topic is a plain string key that events are published against:
//!
//! - a literal stream identifier (`"42"`)
//! - a user-scoped key (`"user:GABC..."`)
//!
//! A connection's [`SubscriptionSet`] holds topics of either kind, or the
//! reserved [`WILDCARD`] token which matches everything.

use std::collections::HashSet;

/// Reserved subscription token that matches every topic.
pub const WILDCARD: &str = "*";

/// Prefix distinguishing user-scoped topics from stream topics.
pub const USER_TOPIC_PREFIX: &str = "user:";

/// Builds the user-scoped topic for a public key.
pub fn user_topic(user_key: &str) -> String {
    format!("{}{}", USER_TOPIC_PREFIX, user_key)
}

/// Immutable set of topics a connection listens to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    topics: HashSet<String>,
}

impl SubscriptionSet {
    /// Subscription matching every topic.
    pub fn wildcard() -> Self {
        Self::from_topics([WILDCARD])
    }

    /// Builds a set from raw topic strings. Duplicates collapse.
    pub fn from_topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.topics.contains(WILDCARD)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// See [`matches`].
    pub fn matches(&self, topic: &str) -> bool {
        matches(self, topic)
    }

    /// See [`matches_any`].
    pub fn matches_any<S: AsRef<str>>(&self, topics: &[S]) -> bool {
        matches_any(self, topics)
    }
}

/// Decides whether an event published against `topic` reaches a subscriber.
///
/// True when the set holds the wildcard, or holds `topic` literally. An empty
/// target only ever matches the wildcard.
pub fn matches(subscriptions: &SubscriptionSet, topic: &str) -> bool {
    if subscriptions.is_wildcard() {
        return true;
    }
    !topic.is_empty() && subscriptions.contains(topic)
}

/// True when at least one of `topics` matches.
pub fn matches_any<S: AsRef<str>>(subscriptions: &SubscriptionSet, topics: &[S]) -> bool {
    topics.iter().any(|t| matches(subscriptions, t.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn literal_topic_matches() {
        let subs = SubscriptionSet::from_topics(["42", "43"]);
        assert!(subs.matches("42"));
        assert!(subs.matches("43"));
        assert!(!subs.matches("44"));
    }

    #[test]
    fn wildcard_matches_everything() {
        let subs = SubscriptionSet::wildcard();
        assert!(subs.matches("999"));
        assert!(subs.matches("user:GABC"));
        assert!(subs.matches(""));
    }

    #[test]
    fn empty_target_never_matches_a_literal() {
        let subs = SubscriptionSet::from_topics([""]);
        assert!(!subs.matches(""));
    }

    #[test]
    fn user_topic_requires_prefix() {
        let subs = SubscriptionSet::from_topics([user_topic("GABC")]);
        assert!(!subs.matches("GABC"));
        assert!(subs.matches("user:GABC"));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let subs = SubscriptionSet::default();
        assert!(subs.is_empty());
        assert!(!subs.matches("42"));
        assert!(!subs.matches(""));
    }

    #[test]
    fn matches_any_checks_each_target() {
        let subs = SubscriptionSet::from_topics(["user:GDEF"]);
        assert!(subs.matches_any(&["42", "user:GDEF"]));
        assert!(!subs.matches_any(&["42", "user:GABC"]));
        assert!(!subs.matches_any::<&str>(&[]));
    }

    #[test]
    fn duplicates_collapse() {
        let subs = SubscriptionSet::from_topics(["1", "1", "2"]);
        assert_eq!(subs.len(), 2);
    }

    proptest! {
        #[test]
        fn wildcard_set_matches_any_target(
            target in ".*",
            extra in proptest::collection::vec("[a-z0-9:]{1,12}", 0..8),
        ) {
            let mut topics = extra;
            topics.push(WILDCARD.to_string());
            let subs = SubscriptionSet::from_topics(topics);
            prop_assert!(subs.matches(&target));
        }

        #[test]
        fn disjoint_literal_sets_never_cross_match(
            left in proptest::collection::hash_set("[a-m]{1,8}", 1..8),
            right in proptest::collection::hash_set("[n-z]{1,8}", 1..8),
        ) {
            let right_subs = SubscriptionSet::from_topics(right.iter().cloned());
            for target in &left {
                prop_assert!(!right_subs.matches(target));
            }
        }

        #[test]
        fn every_member_matches_itself(topics in proptest::collection::vec("[a-z0-9]{1,10}", 1..10)) {
            let subs = SubscriptionSet::from_topics(topics.iter().cloned());
            for topic in &topics {
                prop_assert!(subs.matches(topic));
            }
        }
    }
}
