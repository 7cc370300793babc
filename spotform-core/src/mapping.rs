//! Reusable field mapping strategies
//!
//! Most attributes map one configuration value onto one payload member. The
//! strategies here cover that case with plain function pointers for the
//! payload side, keeping facet code declarative.

use std::marker::PhantomData;

use log::debug;

use crate::config::{Attributes, ConfigValue, Configuration};
use crate::error::FieldError;
use crate::field::{FieldMapping, FieldName};
use crate::value::Value;

/// What an update sends when a changed attribute was removed from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsencePolicy {
    /// Leave the payload member unset; the remote value is kept
    #[default]
    Keep,
    /// Write `None` so the payload asks the API to reset the remote value
    Clear,
}

/// One configuration value mapped onto one payload member
pub struct Scalar<P, T> {
    read: fn(&P) -> Option<T>,
    write: fn(&mut P, Option<T>),
    empty: Value,
    absence: AbsencePolicy,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T: ConfigValue> Scalar<P, T> {
    pub fn new(read: fn(&P) -> Option<T>, write: fn(&mut P, Option<T>)) -> Self {
        Self {
            read,
            write,
            empty: T::zero(),
            absence: AbsencePolicy::Keep,
            _marker: PhantomData,
        }
    }

    /// Value written to state when the payload has nothing for this field
    pub fn with_empty(mut self, empty: impl Into<Value>) -> Self {
        self.empty = empty.into();
        self
    }

    pub fn clear_on_absence(mut self) -> Self {
        self.absence = AbsencePolicy::Clear;
        self
    }

    /// `None` for absent, null, unset and empty values; a value of the wrong
    /// type is kept as is so that it still registers as a change
    fn meaningful(&self, value: Option<&Value>) -> Option<Result<T, Value>> {
        let value = value.filter(|v| !v.is_null())?;
        match T::from_value(value) {
            Some(v) if v.is_unset() || v.clone().into_value() == self.empty => None,
            Some(v) => Some(Ok(v)),
            None => Some(Err(value.clone())),
        }
    }

    /// Whether the configuration leaves this field out entirely
    ///
    /// Unlike [`Self::meaningful`], an explicit zero or `false` is present.
    fn is_absent(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(v) => T::from_value(v).is_some_and(|t| t.is_unset()),
        }
    }
}

impl<P, T> FieldMapping<P> for Scalar<P, T>
where
    P: Send + Sync,
    T: ConfigValue,
{
    fn encode(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError> {
        if let Some(value) = config.get_as::<T>(field.as_str())?
            && !value.is_unset()
        {
            (self.write)(payload, Some(value));
        }
        Ok(())
    }

    fn decode(
        &self,
        field: &FieldName,
        payload: &P,
        config: &mut Configuration,
    ) -> Result<(), FieldError> {
        let value = (self.read)(payload)
            .map(T::into_value)
            .unwrap_or_else(|| self.empty.clone());
        config.set(field.as_str(), value);
        Ok(())
    }

    /// Absent, unset and the empty representation all compare equal
    ///
    /// Under [`AbsencePolicy::Keep`] removing the attribute is not a change:
    /// nothing would be sent and the remote value stays.
    fn has_changed(&self, field: &FieldName, config: &Configuration, _payload: &P) -> bool {
        let planned = config.lookup(field.as_str());
        if self.absence == AbsencePolicy::Keep && Self::is_absent(planned) {
            return false;
        }
        self.meaningful(planned) != self.meaningful(config.lookup_prior(field.as_str()))
    }

    fn encode_update(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError> {
        match config.get_as::<T>(field.as_str())? {
            Some(value) if !value.is_unset() => (self.write)(payload, Some(value)),
            _ if self.absence == AbsencePolicy::Clear => {
                debug!("clearing remote value of '{}'", field);
                (self.write)(payload, None);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Integer attribute where a sentinel (conventionally `-1`) means "not set"
///
/// - encode: the sentinel is never written to the payload
/// - decode: a payload without the member writes the sentinel back
/// - diff: absent and sentinel compare equal, so a sentinel default with no
///   configured change is not an update
pub struct SentinelInt<P> {
    sentinel: i64,
    read: fn(&P) -> Option<i64>,
    write: fn(&mut P, Option<i64>),
}

impl<P> SentinelInt<P> {
    pub fn new(sentinel: i64, read: fn(&P) -> Option<i64>, write: fn(&mut P, Option<i64>)) -> Self {
        Self {
            sentinel,
            read,
            write,
        }
    }

    pub fn sentinel(&self) -> i64 {
        self.sentinel
    }

    fn normalize(&self, value: Option<i64>) -> i64 {
        value.unwrap_or(self.sentinel)
    }
}

impl<P: Send + Sync> FieldMapping<P> for SentinelInt<P> {
    fn encode(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError> {
        if let Some(value) = config.get_int(field.as_str())?
            && value != self.sentinel
        {
            (self.write)(payload, Some(value));
        }
        Ok(())
    }

    fn decode(
        &self,
        field: &FieldName,
        payload: &P,
        config: &mut Configuration,
    ) -> Result<(), FieldError> {
        let value = self.normalize((self.read)(payload));
        config.set(field.as_str(), Value::Int(value));
        Ok(())
    }

    /// A malformed value counts as changed so that the update pass reports it
    fn has_changed(&self, field: &FieldName, config: &Configuration, _payload: &P) -> bool {
        let Ok(current) = config.get_int(field.as_str()) else {
            return true;
        };
        let prior = config
            .lookup_prior(field.as_str())
            .and_then(i64::from_value);
        self.normalize(current) != self.normalize(prior)
    }

    fn encode_update(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError> {
        let value = self.normalize(config.get_int(field.as_str())?);
        if value == self.sentinel {
            (self.write)(payload, None);
        } else {
            (self.write)(payload, Some(value));
        }
        Ok(())
    }
}

/// Wraps another strategy and rejects configurations that also set `other`
///
/// Both attributes stay independently registered; whichever is expanded
/// while the other is set fails with [`FieldError::Invalid`].
pub struct ConflictsWith<M> {
    other: &'static str,
    inner: M,
}

impl<M> ConflictsWith<M> {
    pub fn new(other: &'static str, inner: M) -> Self {
        Self { other, inner }
    }

    fn check(&self, field: &FieldName, config: &Configuration) -> Result<(), FieldError> {
        if is_set(config, field.as_str()) && is_set(config, self.other) {
            return Err(FieldError::invalid(format!(
                "'{}' conflicts with '{}'; set only one of them",
                field, self.other
            )));
        }
        Ok(())
    }
}

fn is_set(config: &Configuration, path: &str) -> bool {
    match config.lookup(path) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::List(items)) => !items.is_empty(),
        Some(Value::Map(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

impl<P, M: FieldMapping<P>> FieldMapping<P> for ConflictsWith<M> {
    fn encode(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError> {
        self.check(field, config)?;
        self.inner.encode(field, config, payload)
    }

    fn decode(
        &self,
        field: &FieldName,
        payload: &P,
        config: &mut Configuration,
    ) -> Result<(), FieldError> {
        self.inner.decode(field, payload, config)
    }

    fn has_changed(&self, field: &FieldName, config: &Configuration, payload: &P) -> bool {
        self.inner.has_changed(field, config, payload)
    }

    fn encode_update(
        &self,
        field: &FieldName,
        config: &Configuration,
        payload: &mut P,
    ) -> Result<(), FieldError> {
        self.check(field, config)?;
        self.inner.encode_update(field, config, payload)
    }
}

/// Provider-side attribute with no payload counterpart
///
/// Decode rewrites the current value so it survives into state unchanged.
pub struct LocalOnly;

impl<P> FieldMapping<P> for LocalOnly {
    fn encode(
        &self,
        _field: &FieldName,
        _config: &Configuration,
        _payload: &mut P,
    ) -> Result<(), FieldError> {
        Ok(())
    }

    fn decode(
        &self,
        field: &FieldName,
        _payload: &P,
        config: &mut Configuration,
    ) -> Result<(), FieldError> {
        let value = config.lookup(field.as_str()).cloned().unwrap_or_default();
        config.set(field.as_str(), value);
        Ok(())
    }
}
