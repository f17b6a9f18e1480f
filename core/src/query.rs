//! Query-string construction.
//!
//! Options are emitted in the order they were pushed. Absent values and
//! empty strings are dropped so callers can forward optional settings
//! without branching.

use url::form_urlencoded;

/// Incremental builder for a URL-encoded query string.
#[derive(Debug, Default)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name=value`; skipped when `value` renders empty.
    pub fn push(mut self, name: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((name.to_string(), value));
        }
        self
    }

    /// Add `name=value` only when `value` is present and non-empty.
    pub fn push_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(name, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encoded string without the leading `?`.
    pub fn finish(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

/// Encode `options` into a query string, keeping only defined, non-empty values.
pub fn query_string(options: &[(&str, Option<String>)]) -> String {
    options
        .iter()
        .fold(Query::new(), |q, (name, value)| q.push_opt(name, value.as_deref()))
        .finish()
}
