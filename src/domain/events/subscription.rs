//! Subscribe request parsing and translation into a [`SubscriptionSet`].
//!
//! Query format (`GET /events/subscribe?...`):
//!
//! - `streams` - literal stream ids, repeatable (`streams=1&streams=2`)
//! - `users` - user public keys, repeatable, each becomes `user:<key>`
//! - `all` - `true` or `false`, defaults to `false`
//!
//! The `key[]` spelling is accepted for the list parameters. Unknown
//! parameters are ignored.

use thiserror::Error;

use super::topic::{user_topic, SubscriptionSet, WILDCARD};

/// Malformed subscribe request. Surfaced to the connecting client as a 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("Parameter 'all' must be 'true' or 'false', got '{0}'")]
    InvalidAllFlag(String),

    #[error("Parameter 'all' given more than once")]
    RepeatedAllFlag,

    #[error("Parameter '{0}' contains an empty value")]
    EmptyValue(&'static str),

    #[error("Parameter 'streams' cannot be '*'; use all=true to receive every event")]
    WildcardStream,

    #[error("Too many subscriptions: {count} requested, limit is {limit}")]
    TooManySubscriptions { count: usize, limit: usize },
}

/// Decoded subscribe request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribeQuery {
    pub streams: Vec<String>,
    pub users: Vec<String>,
    pub all: bool,
}

impl SubscribeQuery {
    /// Decodes a raw (still percent-encoded) query string.
    ///
    /// `None` and `""` both yield the defaults.
    pub fn parse(raw: Option<&str>) -> Result<Self, SubscriptionError> {
        let mut query = Self::default();
        let mut all_seen = false;

        let Some(raw) = raw else {
            return Ok(query);
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "streams" | "streams[]" => {
                    if value.is_empty() {
                        return Err(SubscriptionError::EmptyValue("streams"));
                    }
                    if value == WILDCARD {
                        return Err(SubscriptionError::WildcardStream);
                    }
                    query.streams.push(value.into_owned());
                }
                "users" | "users[]" => {
                    if value.is_empty() {
                        return Err(SubscriptionError::EmptyValue("users"));
                    }
                    query.users.push(value.into_owned());
                }
                "all" => {
                    if all_seen {
                        return Err(SubscriptionError::RepeatedAllFlag);
                    }
                    all_seen = true;
                    query.all = parse_flag(&value)?;
                }
                _ => {}
            }
        }

        Ok(query)
    }

    /// Builds the canonical subscription set.
    ///
    /// `all` wins over explicit lists: the result is exactly the wildcard and
    /// the lists are discarded. Otherwise stream ids are kept literally and
    /// user keys are prefixed. `limit` caps the resulting set size.
    pub fn to_subscriptions(&self, limit: usize) -> Result<SubscriptionSet, SubscriptionError> {
        if self.all {
            return Ok(SubscriptionSet::wildcard());
        }

        let set = SubscriptionSet::from_topics(
            self.streams
                .iter()
                .cloned()
                .chain(self.users.iter().map(|u| user_topic(u))),
        );

        if set.len() > limit {
            return Err(SubscriptionError::TooManySubscriptions {
                count: set.len(),
                limit,
            });
        }

        Ok(set)
    }
}

fn parse_flag(value: &str) -> Result<bool, SubscriptionError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(SubscriptionError::InvalidAllFlag(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_yields_defaults() {
        assert_eq!(SubscribeQuery::parse(None).unwrap(), SubscribeQuery::default());
        assert_eq!(SubscribeQuery::parse(Some("")).unwrap(), SubscribeQuery::default());
    }

    #[test]
    fn repeated_keys_collect_into_lists() {
        let q = SubscribeQuery::parse(Some("streams=1&streams=2&users=GABC")).unwrap();
        assert_eq!(q.streams, vec!["1", "2"]);
        assert_eq!(q.users, vec!["GABC"]);
        assert!(!q.all);
    }

    #[test]
    fn bracket_keys_are_accepted() {
        let q = SubscribeQuery::parse(Some("streams%5B%5D=7&users[]=GDEF")).unwrap();
        assert_eq!(q.streams, vec!["7"]);
        assert_eq!(q.users, vec!["GDEF"]);
    }

    #[test]
    fn all_flag_parses_booleans() {
        assert!(SubscribeQuery::parse(Some("all=true")).unwrap().all);
        assert!(!SubscribeQuery::parse(Some("all=false")).unwrap().all);
    }

    #[test]
    fn non_boolean_all_is_rejected() {
        let err = SubscribeQuery::parse(Some("all=yes")).unwrap_err();
        assert_eq!(err, SubscriptionError::InvalidAllFlag("yes".to_string()));
    }

    #[test]
    fn repeated_all_is_rejected() {
        let err = SubscribeQuery::parse(Some("all=true&all=false")).unwrap_err();
        assert_eq!(err, SubscriptionError::RepeatedAllFlag);
    }

    #[test]
    fn empty_values_are_rejected() {
        assert_eq!(
            SubscribeQuery::parse(Some("streams=")).unwrap_err(),
            SubscriptionError::EmptyValue("streams")
        );
        assert_eq!(
            SubscribeQuery::parse(Some("users=&streams=1")).unwrap_err(),
            SubscriptionError::EmptyValue("users")
        );
    }

    #[test]
    fn wildcard_stream_id_is_rejected() {
        for raw in ["streams=*", "streams%5B%5D=*", "streams=1&streams=%2A"] {
            assert_eq!(
                SubscribeQuery::parse(Some(raw)).unwrap_err(),
                SubscriptionError::WildcardStream,
                "{}",
                raw
            );
        }
    }

    #[test]
    fn wildcard_user_key_stays_a_literal_user_topic() {
        let q = SubscribeQuery::parse(Some("users=*")).unwrap();
        let subs = q.to_subscriptions(10).unwrap();
        assert!(!subs.is_wildcard());
        assert!(!subs.matches("42"));
        assert!(subs.matches("user:*"));
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let q = SubscribeQuery::parse(Some("token=abc&streams=5")).unwrap();
        assert_eq!(q.streams, vec!["5"]);
    }

    #[test]
    fn percent_encoded_values_are_decoded() {
        let q = SubscribeQuery::parse(Some("streams=a%20b")).unwrap();
        assert_eq!(q.streams, vec!["a b"]);
    }

    #[test]
    fn all_flag_replaces_explicit_entries() {
        let q = SubscribeQuery {
            streams: vec!["1".into()],
            users: vec!["GABC".into()],
            all: true,
        };
        let subs = q.to_subscriptions(10).unwrap();
        assert_eq!(subs.len(), 1);
        assert!(subs.contains(WILDCARD));
        assert!(!subs.contains("1"));
    }

    #[test]
    fn users_are_prefixed_and_streams_literal() {
        let q = SubscribeQuery {
            streams: vec!["42".into()],
            users: vec!["GABC".into()],
            all: false,
        };
        let subs = q.to_subscriptions(10).unwrap();
        assert!(subs.contains("42"));
        assert!(subs.contains("user:GABC"));
        assert!(!subs.contains("GABC"));
    }

    #[test]
    fn limit_is_enforced_after_deduplication() {
        let q = SubscribeQuery {
            streams: vec!["1".into(), "1".into(), "2".into()],
            users: vec![],
            all: false,
        };
        assert!(q.to_subscriptions(2).is_ok());
        assert_eq!(
            q.to_subscriptions(1).unwrap_err(),
            SubscriptionError::TooManySubscriptions { count: 2, limit: 1 }
        );
    }

    #[test]
    fn wildcard_ignores_limit() {
        let q = SubscribeQuery {
            all: true,
            ..Default::default()
        };
        assert!(q.to_subscriptions(0).unwrap().is_wildcard());
    }
}
