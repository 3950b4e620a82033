//! Generic key→handler table with uniform error codes.
//!
//! Handler tables let independent registrants contribute behaviour per
//! cell kind without seeing each other. The error protocol keeps the
//! tables composable: a handler answering [`HookError::NoData`] says
//! "not mine, ask elsewhere" and the caller treats the key as absent,
//! while [`HookError::Fail`] marks a misbehaving hook — reported
//! distinctly so bugs don't masquerade as absence.

use std::fmt;
use std::hash::Hash;

use crate::perf::FastMap;
use crate::track_error::TrackError;

/// What a handler may answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// Composable absence: the handler has nothing for this input.
    NoData,
    /// The handler could not produce a value and gave no composable
    /// reason. A bug signal.
    Fail(String),
}

/// What a table query may report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No handler for the key, or the handler answered `NoData`.
    NoData,
    /// The bound handler misbehaved.
    HookFail(String),
}

type Handler<A, R> = Box<dyn Fn(&A) -> Result<R, HookError>>;

/// Key→handler table with duplicate-registration checking.
pub struct HandlerLut<K, A, R> {
    label: &'static str,
    key_of: Box<dyn Fn(&A) -> K>,
    handlers: FastMap<K, Handler<A, R>>,
}

impl<K, A, R> HandlerLut<K, A, R>
where
    K: Eq + Hash + fmt::Display,
{
    /// Table with the given display label and key extractor.
    pub fn new(label: &'static str, key_of: impl Fn(&A) -> K + 'static) -> Self {
        HandlerLut {
            label,
            key_of: Box::new(key_of),
            handlers: FastMap::default(),
        }
    }

    /// Display label, used in diagnostics.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Bind `handler` to `key`. At most one handler per key.
    pub fn register(
        &mut self,
        key: K,
        handler: impl Fn(&A) -> Result<R, HookError> + 'static,
    ) -> Result<(), TrackError> {
        if self.handlers.contains_key(&key) {
            return Err(TrackError::DuplicateHandler {
                lut: self.label,
                key: key.to_string(),
            });
        }
        self.handlers.insert(key, Box::new(handler));
        Ok(())
    }

    /// Run the handler bound to `data`'s key.
    ///
    /// Handler panics propagate to the caller.
    pub fn query(&self, data: &A) -> Result<R, QueryError> {
        let key = (self.key_of)(data);
        let Some(handler) = self.handlers.get(&key) else {
            return Err(QueryError::NoData);
        };
        match handler(data) {
            Ok(result) => Ok(result),
            Err(HookError::NoData) => Err(QueryError::NoData),
            Err(HookError::Fail(reason)) => {
                log::warn!("{}: handler for `{key}` failed: {reason}", self.label);
                Err(QueryError::HookFail(reason))
            }
        }
    }

    /// True when a handler is bound for `key`.
    pub fn is_registered(&self, key: &K) -> bool {
        self.handlers.contains_key(key)
    }

    /// Number of bound handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no handlers are bound.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<K, A, R> fmt::Debug for HandlerLut<K, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerLut")
            .field("label", &self.label)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HandlerLut<String, (String, i32), i32> {
        HandlerLut::new("test-lut", |data: &(String, i32)| data.0.clone())
    }

    #[test]
    fn unregistered_key_is_nodata() {
        let lut = table();
        assert_eq!(lut.query(&("a".into(), 1)), Err(QueryError::NoData));
    }

    #[test]
    fn registered_handler_runs() {
        let mut lut = table();
        lut.register("a".into(), |d: &(String, i32)| Ok(d.1 * 2))
            .unwrap();
        assert_eq!(lut.query(&("a".into(), 21)), Ok(42));
        assert!(lut.is_registered(&"a".to_string()));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut lut = table();
        lut.register("a".into(), |_| Ok(0)).unwrap();
        let err = lut.register("a".into(), |_| Ok(1)).unwrap_err();
        assert!(matches!(err, TrackError::DuplicateHandler { .. }));
    }

    #[test]
    fn nodata_propagates_hookfail_reports() {
        let mut lut = table();
        lut.register("absent".into(), |_| Err(HookError::NoData))
            .unwrap();
        lut.register("broken".into(), |_| {
            Err(HookError::Fail("no value".into()))
        })
        .unwrap();
        assert_eq!(lut.query(&("absent".into(), 0)), Err(QueryError::NoData));
        assert!(matches!(
            lut.query(&("broken".into(), 0)),
            Err(QueryError::HookFail(_))
        ));
    }

    #[test]
    #[should_panic(expected = "hook blew up")]
    fn handler_panics_propagate() {
        let mut lut = table();
        lut.register("boom".into(), |_| panic!("hook blew up"))
            .unwrap();
        let _ = lut.query(&("boom".into(), 0));
    }
}
