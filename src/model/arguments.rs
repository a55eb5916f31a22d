use crate::error::{HydrationError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One positional constructor argument
#[derive(Debug, Clone, PartialEq)]
enum Argument {
    /// Nothing bound at this position
    Absent,
    /// A value moved out of the record
    Value(Value),
    /// A writable slot whose final content is written back to the record
    Slot(Value),
}

///
/// Arguments
///
/// Positional constructor arguments assembled by a binder. Positions past the
/// last bound parameter read as absent.
///

#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    entity: &'static str,
    names: Vec<&'static str>,
    slots: Vec<Argument>,
}

impl Arguments {
    /// Arguments for a constructor with nothing bound
    pub fn empty(entity: &'static str) -> Self {
        Self {
            entity,
            names: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(entity: &'static str, names: Vec<&'static str>) -> Self {
        let slots = vec![Argument::Absent; names.len()];
        Self {
            entity,
            names,
            slots,
        }
    }

    pub(crate) fn bind(&mut self, index: usize, value: Value, by_ref: bool) {
        self.slots[index] = if by_ref {
            Argument::Slot(value)
        } else {
            Argument::Value(value)
        };
    }

    pub(crate) fn take_slot(&mut self, index: usize) -> Option<Value> {
        match self.slots.get_mut(index) {
            Some(Argument::Slot(value)) => Some(std::mem::take(value)),
            _ => None,
        }
    }

    /// Number of positions the binder synthesized
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether a value (possibly `null`) is bound at `index`
    pub fn is_bound(&self, index: usize) -> bool {
        matches!(
            self.slots.get(index),
            Some(Argument::Value(_) | Argument::Slot(_))
        )
    }

    /// Move the raw value out of a by-value position
    ///
    /// Pass-by-reference positions are read through [`Arguments::slot_mut`].
    pub fn take(&mut self, index: usize) -> Option<Value> {
        match self.slots.get_mut(index) {
            Some(slot @ Argument::Value(_)) => match std::mem::replace(slot, Argument::Absent) {
                Argument::Value(value) => Some(value),
                _ => None,
            },
            Some(Argument::Slot(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Decode a required argument
    pub fn value<T: DeserializeOwned>(&mut self, index: usize) -> Result<T> {
        match self.take(index) {
            Some(value) => self.decode(index, value),
            None => Err(HydrationError::MissingArgument {
                entity: self.entity.to_string(),
                parameter: self.name(index).to_string(),
                index,
            }),
        }
    }

    /// Decode an argument that may be absent or `null`
    pub fn optional<T: DeserializeOwned>(&mut self, index: usize) -> Result<Option<T>> {
        match self.take(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.decode(index, value).map(Some),
        }
    }

    /// Writable slot of a pass-by-reference position
    pub fn slot_mut(&mut self, index: usize) -> Result<&mut Value> {
        match self.slots.get_mut(index) {
            Some(Argument::Slot(value)) => Ok(value),
            _ => Err(HydrationError::NotByReference {
                entity: self.entity.to_string(),
                index,
            }),
        }
    }

    fn decode<T: DeserializeOwned>(&self, index: usize, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| {
            HydrationError::invalid_value(self.entity, self.name(index), e.to_string())
        })
    }

    fn name(&self, index: usize) -> &'static str {
        self.names.get(index).copied().unwrap_or("?")
    }
}
