//! Message filters for connection watches.

use crate::bencode::Value;

/// Decides whether an incoming message concerns a watch.
///
/// Closures `Fn(&Value) -> bool` are matchers, as is [`Criteria`].
pub trait Matcher: Send + Sync {
    fn matches(&self, msg: &Value) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn matches(&self, msg: &Value) -> bool {
        self(msg)
    }
}

/// What a message must carry under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expect {
    /// Any value.
    Present,
    Equals(Value),
    OneOf(Vec<Value>),
}

/// Conjunction of per-key expectations on a message dictionary.
///
/// A message missing a constrained key never matches. Empty criteria match
/// every message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    fields: Vec<(String, Expect)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(self, key: &str) -> Self {
        self.with(key, Expect::Present)
    }

    pub fn equals(self, key: &str, value: impl Into<Value>) -> Self {
        self.with(key, Expect::Equals(value.into()))
    }

    pub fn one_of<V: Into<Value>>(self, key: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.with(key, Expect::OneOf(values.into_iter().map(Into::into).collect()))
    }

    pub fn with(mut self, key: &str, expect: Expect) -> Self {
        self.fields.push((key.to_string(), expect));
        self
    }
}

impl Matcher for Criteria {
    fn matches(&self, msg: &Value) -> bool {
        self.fields.iter().all(|(key, expect)| match msg.get(key) {
            None => false,
            Some(found) => match expect {
                Expect::Present => true,
                Expect::Equals(want) => found == want,
                Expect::OneOf(allowed) => allowed.contains(found),
            },
        })
    }
}
