//! # Binder
//!
//! A compiled, reusable record-to-entity mapping. A binder is fully determined
//! by its [`TargetMetadata`] and entity model; it holds no record state and may
//! be shared across records whose key shape matches the signature it was
//! compiled from.

use crate::constants::Conformity;
use crate::error::{HydrationError, Result};
use crate::hydration::coerce::DateCoercer;
use crate::hydration::metadata::{KeyTarget, TargetMetadata};
use crate::model::{Arguments, Entity, EntityModel, Record, Setter};
use crate::providable::Providable;
use crate::provider::{Context, ProviderRef};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// How a binder reads values out of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// Look every signature key up by name
    Named,
    /// Zip the record's values, in order, with the signature's targets
    Positional,
}

impl Lookup {
    pub fn for_conformity(conformity: Conformity) -> Self {
        match conformity {
            Conformity::Complete => Self::Positional,
            Conformity::None | Conformity::Partial => Self::Named,
        }
    }
}

/// Compiled mapping from one key signature onto entity type `E`
pub struct Binder<E> {
    model: Arc<EntityModel<E>>,
    metadata: Arc<TargetMetadata>,
    lookup: Lookup,
    dates: Arc<DateCoercer>,
    parameter_names: Vec<&'static str>,
    by_ref_positions: Vec<usize>,
}

impl<E: Entity> Binder<E> {
    pub fn compile(
        model: Arc<EntityModel<E>>,
        metadata: Arc<TargetMetadata>,
        lookup: Lookup,
        dates: Arc<DateCoercer>,
    ) -> Self {
        // by-ref positions always receive a slot, bound or not
        let by_ref_positions: Vec<usize> = model
            .parameters
            .iter()
            .enumerate()
            .filter(|(_, parameter)| parameter.by_ref)
            .map(|(position, _)| position)
            .collect();
        let count = by_ref_positions
            .last()
            .map_or(0, |position| position + 1)
            .max(metadata.parameter_count());
        let parameter_names = model
            .parameters
            .iter()
            .take(count)
            .map(|parameter| parameter.name)
            .collect();

        Self {
            model,
            metadata,
            lookup,
            dates,
            parameter_names,
            by_ref_positions,
        }
    }

    pub fn metadata(&self) -> &TargetMetadata {
        &self.metadata
    }

    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    /// Construct one entity from `record` and bind it to `provider`
    ///
    /// Consumed values are moved out of the record, leaving `null` behind;
    /// pass-by-reference entries hold whatever the constructor wrote to its slot.
    pub fn bind(&self, record: &mut Record, provider: &ProviderRef, context: &Context) -> Result<E> {
        let keys = self.metadata.keys();
        let mut arguments = Arguments::with_capacity(self.model.name, self.parameter_names.clone());
        let mut pending: Vec<(usize, Value)> = Vec::with_capacity(keys.len());

        if self.lookup == Lookup::Positional && record.len() == keys.len() {
            for (index, value) in record.values_mut().enumerate() {
                self.collect(index, Some(std::mem::take(value)), &mut arguments, &mut pending)?;
            }
        } else {
            if self.lookup == Lookup::Positional {
                warn!(
                    entity = self.model.name,
                    expected = keys.len(),
                    actual = record.len(),
                    "Record length differs from compiled signature, using named lookup"
                );
            }
            for (index, key) in keys.iter().enumerate() {
                let value = record.get_mut(key).map(std::mem::take);
                self.collect(index, value, &mut arguments, &mut pending)?;
            }
        }

        for &position in &self.by_ref_positions {
            if !arguments.is_bound(position) {
                arguments.bind(position, Value::Null, true);
            }
        }

        let mut entity = (self.model.constructor)(&mut arguments)?;
        self.write_back(record, &mut arguments);

        for (index, value) in pending {
            self.assign(&mut entity, index, value)?;
        }

        entity.set_provider(Arc::clone(provider), context.clone())?;

        trace!(
            entity = self.model.name,
            provider = provider.name(),
            keys = keys.len(),
            "Hydrated entity"
        );
        Ok(entity)
    }

    fn collect(
        &self,
        index: usize,
        value: Option<Value>,
        arguments: &mut Arguments,
        pending: &mut Vec<(usize, Value)>,
    ) -> Result<()> {
        let KeyTarget::Parameter(position) = self.metadata.targets()[index] else {
            if let Some(value) = value {
                pending.push((index, value));
            }
            return Ok(());
        };

        let parameter = &self.model.parameters[position];
        match value {
            Some(Value::Null) if !parameter.nullable => {
                Err(HydrationError::not_nullable(self.model.name, parameter.name))
            }
            None if parameter.is_required() => {
                Err(HydrationError::not_nullable(self.model.name, parameter.name))
            }
            Some(value) => {
                arguments.bind(position, value, parameter.by_ref);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn write_back(&self, record: &mut Record, arguments: &mut Arguments) {
        for (key, target) in self.metadata.keys().iter().zip(self.metadata.targets()) {
            let KeyTarget::Parameter(position) = *target else {
                continue;
            };
            if !self.model.parameters[position].by_ref {
                continue;
            }
            if let (Some(entry), Some(value)) = (record.get_mut(key), arguments.take_slot(position)) {
                *entry = value;
            }
        }
    }

    fn assign(&self, entity: &mut E, index: usize, value: Value) -> Result<()> {
        let key = &self.metadata.keys()[index];
        match self.metadata.targets()[index] {
            KeyTarget::Method(method) => self.apply(entity, key, self.model.methods[method].setter, value),
            KeyTarget::Property(property) => {
                self.apply(entity, key, self.model.properties[property].setter, value)
            }
            KeyTarget::Meta => {
                if let Some(meta) = self.model.meta {
                    meta(entity).set(key.clone(), value);
                }
                Ok(())
            }
            // consumed during construction
            KeyTarget::Parameter(_) => Ok(()),
        }
    }

    fn apply(&self, entity: &mut E, key: &str, setter: Setter<E>, value: Value) -> Result<()> {
        let result = match setter {
            Setter::Value(set) => set(entity, value),
            Setter::Date(set) => {
                let date = self.dates.coerce(&value).map_err(|_| HydrationError::InvalidDate {
                    entity: self.model.name.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                set(entity, date)
            }
        };
        result.map_err(|e| HydrationError::invalid_value(self.model.name, key, e.0))
    }
}

impl<E> fmt::Debug for Binder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("entity", &self.model.name)
            .field("lookup", &self.lookup)
            .field("keys", &self.metadata.keys())
            .finish_non_exhaustive()
    }
}
