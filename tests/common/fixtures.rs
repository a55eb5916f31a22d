//! Entity types and providers shared by the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use entity_hydrator::{
    decode, Arguments, Container, Entity, EntityModel, MetaProperties, ParameterModel, Provider,
    ProviderBinding, ProviderRef, ProviderType, Record, ReservedKey, Setter, ValueError,
};
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Build a record from a JSON object literal
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record fixture must be a JSON object, got {other}"),
    }
}

/// `Person { name, age }`; `name` is a constructor parameter, `age` a property
#[derive(Debug)]
pub struct Person {
    pub name: String,
    pub age: Option<u32>,
    binding: ProviderBinding,
}

impl Entity for Person {
    fn describe() -> EntityModel<Self> {
        EntityModel::new("Person", |args: &mut Arguments| {
            Ok(Person {
                name: args.value(0)?,
                age: None,
                binding: ProviderBinding::default(),
            })
        })
        .parameter(ParameterModel::required("name"))
        .property(
            "age",
            Setter::Value(|person: &mut Person, value| {
                person.age = decode(value)?;
                Ok(())
            }),
        )
    }

    fn binding(&self) -> &ProviderBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ProviderBinding {
        &mut self.binding
    }
}

/// Extensible person declaring only `name`
#[derive(Debug)]
pub struct Contact {
    pub name: Option<String>,
    pub meta: MetaProperties,
    binding: ProviderBinding,
}

impl Entity for Contact {
    fn describe() -> EntityModel<Self> {
        EntityModel::new("Contact", |_: &mut Arguments| {
            Ok(Contact {
                name: None,
                meta: MetaProperties::new(),
                binding: ProviderBinding::default(),
            })
        })
        .property(
            "name",
            Setter::Value(|contact: &mut Contact, value| {
                contact.name = decode(value)?;
                Ok(())
            }),
        )
        .extensible(|contact: &mut Contact| &mut contact.meta)
    }

    fn binding(&self) -> &ProviderBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ProviderBinding {
        &mut self.binding
    }
}

/// Requires an `id`; `nickname` is nullable and `status` defaults to "active"
#[derive(Debug)]
pub struct Account {
    pub id: i64,
    pub nickname: Option<String>,
    pub status: String,
    pub name: Option<String>,
    binding: ProviderBinding,
}

impl Entity for Account {
    fn describe() -> EntityModel<Self> {
        EntityModel::new("Account", |args: &mut Arguments| {
            Ok(Account {
                id: args.value(0)?,
                nickname: args.optional(1)?,
                status: args.optional(2)?.unwrap_or_else(|| "active".to_string()),
                name: None,
                binding: ProviderBinding::default(),
            })
        })
        .parameter(ParameterModel::required("id"))
        .parameter(ParameterModel::nullable("nickname"))
        .parameter(ParameterModel::with_default("status"))
        .property(
            "name",
            Setter::Value(|account: &mut Account, value| {
                account.name = decode(value)?;
                Ok(())
            }),
        )
        .custom_key(ReservedKey::Id, "id")
    }

    fn binding(&self) -> &ProviderBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ProviderBinding {
        &mut self.binding
    }
}

/// `title` is mediated by a magic mutator; `published_at` is a date property
#[derive(Debug)]
pub struct Article {
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    binding: ProviderBinding,
}

fn set_title(article: &mut Article, value: Value) -> Result<(), ValueError> {
    let title: String = decode(value)?;
    article.title = title.trim().to_uppercase();
    Ok(())
}

impl Entity for Article {
    fn describe() -> EntityModel<Self> {
        EntityModel::new("Article", |_: &mut Arguments| {
            Ok(Article {
                title: String::new(),
                published_at: None,
                binding: ProviderBinding::default(),
            })
        })
        .property(
            "title",
            Setter::Value(|article: &mut Article, value| {
                article.title = decode(value)?;
                Ok(())
            }),
        )
        .method("title", "set_title", Setter::Value(set_title))
        .property(
            "published_at",
            Setter::Date(|article: &mut Article, date| {
                article.published_at = date;
                Ok(())
            }),
        )
    }

    fn binding(&self) -> &ProviderBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ProviderBinding {
        &mut self.binding
    }
}

/// `label` is both a nullable parameter and a magic mutator
#[derive(Debug)]
pub struct Badge {
    pub label: String,
    binding: ProviderBinding,
}

impl Entity for Badge {
    fn describe() -> EntityModel<Self> {
        EntityModel::new("Badge", |args: &mut Arguments| {
            Ok(Badge {
                label: args
                    .optional::<String>(0)?
                    .map_or_else(String::new, |label| format!("param:{label}")),
                binding: ProviderBinding::default(),
            })
        })
        .parameter(ParameterModel::nullable("label"))
        .method(
            "label",
            "set_label",
            Setter::Value(|badge: &mut Badge, value| {
                let label: String = decode(value)?;
                badge.label = format!("method:{label}");
                Ok(())
            }),
        )
    }

    fn binding(&self) -> &ProviderBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ProviderBinding {
        &mut self.binding
    }
}

static NEXT_TICKET: AtomicI64 = AtomicI64::new(1000);

/// `number` is passed by reference; a null number is replaced by a generated one
#[derive(Debug)]
pub struct Ticket {
    pub number: i64,
    pub subject: String,
    binding: ProviderBinding,
}

impl Entity for Ticket {
    fn describe() -> EntityModel<Self> {
        EntityModel::new("Ticket", |args: &mut Arguments| {
            let slot = args.slot_mut(0)?;
            if slot.is_null() {
                *slot = Value::from(NEXT_TICKET.fetch_add(1, Ordering::SeqCst));
            }
            let number = slot.as_i64().unwrap_or_default();
            Ok(Ticket {
                number,
                subject: args.value(1)?,
                binding: ProviderBinding::default(),
            })
        })
        .parameter(ParameterModel::nullable("number").by_ref())
        .parameter(ParameterModel::required("subject"))
    }

    fn binding(&self) -> &ProviderBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut ProviderBinding {
        &mut self.binding
    }
}

/// Service bound in provider containers
#[derive(Debug, PartialEq, Eq)]
pub struct Endpoint(pub &'static str);

/// Primary test provider
pub struct Catalog {
    container: Container,
}

impl Provider for Catalog {
    fn name(&self) -> &str {
        "catalog"
    }

    fn container(&self) -> &Container {
        &self.container
    }
}

/// Second provider for rebinding tests
pub struct Archive {
    container: Container,
}

impl Provider for Archive {
    fn name(&self) -> &str {
        "archive"
    }

    fn container(&self) -> &Container {
        &self.container
    }
}

/// A `Catalog` whose container resolves `Endpoint("catalog")` in its own scope
pub fn catalog() -> ProviderRef {
    let container = Container::new();
    container.bind(Endpoint("shared"));
    container.bind_contextual(ProviderType::of::<Catalog>(), Endpoint("catalog"));
    Arc::new(Catalog { container })
}

/// An `Archive` sharing `container` with whatever else holds it
pub fn archive_with(container: Container) -> ProviderRef {
    Arc::new(Archive { container })
}

pub fn archive() -> ProviderRef {
    archive_with(Container::new())
}
