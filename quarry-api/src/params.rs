//! Query parameter helpers.
//!
//! Parameter structs use `Option` for every field so that "not set" and
//! "set to the zero value" stay distinct; unset parameters are left out of
//! the query string entirely.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

/// Mark a value as explicitly set.
///
/// ```
/// use quarry_api::to_option;
///
/// let size: Option<u32> = to_option(0);
/// assert_eq!(size, Some(0));
/// ```
pub fn to_option<V>(value: V) -> Option<V> {
    Some(value)
}

/// Render a duration in the unit grammar the server accepts.
///
/// Anything below one millisecond is written in nanoseconds (`"500000nanos"`),
/// everything else is floored to whole milliseconds (`"1ms"` for 1.5ms).
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_millis(1) {
        format!("{}nanos", duration.as_nanos())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Parameters accepted by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonParams {
    /// Pretty-print the response.
    pub pretty: bool,
    /// Human-readable units in the response.
    pub human: bool,
    /// Include stack traces in error bodies.
    pub error_trace: bool,
    /// Filter the response to these paths.
    pub filter_path: Vec<String>,
}

/// Builder for a query parameter map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, String>,
}

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter.
    pub fn set(mut self, key: &str, value: impl Display) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Set a parameter if it has a value.
    pub fn set_opt<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Set a string parameter, skipping empty values.
    pub fn set_str(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.set(key, value),
            _ => self,
        }
    }

    /// Set a list parameter as comma-joined values, skipping empty lists.
    pub fn set_list<S: AsRef<str>>(self, key: &str, values: &[S]) -> Self {
        if values.is_empty() {
            return self;
        }
        let joined = values.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
        self.set(key, joined)
    }

    /// Set a duration parameter using [`format_duration`].
    pub fn set_duration(self, key: &str, value: Option<Duration>) -> Self {
        self.set_opt(key, value.map(format_duration))
    }

    /// Set a flag parameter to `true` when enabled; leave it out otherwise.
    pub fn set_flag(self, key: &str, enabled: bool) -> Self {
        if enabled { self.set(key, true) } else { self }
    }

    /// Apply the parameters shared by every endpoint.
    pub fn common(self, common: &CommonParams) -> Self {
        self.set_flag("pretty", common.pretty)
            .set_flag("human", common.human)
            .set_flag("error_trace", common.error_trace)
            .set_list("filter_path", &common.filter_path)
    }

    /// Check if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Finish into a plain map.
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.params
    }
}
