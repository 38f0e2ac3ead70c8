//! Per-resource adapters over `MiteApi`.
//!
//! # Design
//! Resources share one REST layout (`{resource}.json`,
//! `{resource}/{id}.json`), so the request logic lives in provided trait
//! methods and each adapter only names its URL segment and JSON wrapper key.
//!
//! - [`Adapter`]: access to the base client and its credentials.
//! - [`ReadAdapter`]: `all` and `by_id`.
//! - [`ArchivableAdapter`]: archived listings and lookups by name.
//! - [`WriteAdapter`]: `create`, `update`, `delete`.
//!
//! An adapter implements exactly the traits its endpoints support; `Users`
//! has no `WriteAdapter`, so writing users does not compile.
//!
//! Records are passed through as `serde_json::Value`. The service wraps each
//! record in its singular name (`{"project": {...}}`); [`unwrap_resource`]
//! strips that wrapper and leaves error bodies alone.

mod customers;
mod daily;
mod projects;
mod services;
mod time_entries;
mod tracker;
mod users;

pub use customers::Customers;
pub use daily::Daily;
pub use projects::Projects;
pub use services::Services;
pub use time_entries::{GroupBy, TimeEntries, TimeEntryFilter, TimeRange};
pub use tracker::Tracker;
pub use users::Users;

use serde_json::{Map, Value};

use crate::client::MiteApi;
use crate::error::MiteError;

/// Numeric id of a mite record.
pub type ResourceId = u64;

/// Strip the `key` wrapper from a response.
///
/// `{key: record}` yields `record`; arrays are unwrapped element by element;
/// anything else, including `{"error": ...}`, comes back unchanged.
pub fn unwrap_resource(key: &str, value: Value) -> Value {
    match value {
        Value::Object(mut object) if object.contains_key(key) => {
            object.remove(key).unwrap_or(Value::Null)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| unwrap_resource(key, item))
                .collect(),
        ),
        other => other,
    }
}

/// Wrap attributes as the service expects in request bodies.
fn wrap_resource(key: &str, attributes: Value) -> Value {
    let mut object = Map::new();
    object.insert(key.to_string(), attributes);
    Value::Object(object)
}

/// Anything bound to a mite account.
pub trait Adapter {
    fn api(&self) -> &MiteApi;

    fn realm(&self) -> &str {
        self.api().realm()
    }

    fn apikey(&self) -> &str {
        self.api().apikey()
    }
}

/// Read access to a resource collection.
pub trait ReadAdapter: Adapter {
    /// URL segment, e.g. `projects`.
    const RESOURCE: &'static str;

    /// Key wrapping a single record in responses, e.g. `project`.
    const KEY: &'static str;

    /// Every (active) record.
    fn all(&self) -> Result<Value, MiteError> {
        let response = self.api().get(&format!("{}.json", Self::RESOURCE), &[])?;
        Ok(unwrap_resource(Self::KEY, response))
    }

    fn by_id(&self, id: ResourceId) -> Result<Value, MiteError> {
        let response = self
            .api()
            .get(&format!("{}/{id}.json", Self::RESOURCE), &[])?;
        Ok(unwrap_resource(Self::KEY, response))
    }
}

/// Resources that can be archived and looked up by name.
pub trait ArchivableAdapter: ReadAdapter {
    fn archived(&self) -> Result<Value, MiteError> {
        let response = self
            .api()
            .get(&format!("{}/archived.json", Self::RESOURCE), &[])?;
        Ok(unwrap_resource(Self::KEY, response))
    }

    /// Records whose name matches `name`, among archived records when
    /// `archived` is set.
    fn by_name(&self, name: &str, archived: bool) -> Result<Value, MiteError>
    where
        Self: Sized,
    {
        lookup(self, "name", name, archived)
    }
}

/// GET the active or archived listing filtered by one query field.
pub(crate) fn lookup<A: ArchivableAdapter>(
    adapter: &A,
    field: &str,
    value: &str,
    archived: bool,
) -> Result<Value, MiteError> {
    let path = if archived {
        format!("{}/archived.json", A::RESOURCE)
    } else {
        format!("{}.json", A::RESOURCE)
    };
    let response = adapter.api().get(&path, &[(field, value)])?;
    Ok(unwrap_resource(A::KEY, response))
}

/// Create, update and delete records.
pub trait WriteAdapter: ReadAdapter {
    /// POST a new record. `attributes` is wrapped in the resource key.
    fn create(&self, attributes: Value) -> Result<Value, MiteError> {
        let body = wrap_resource(Self::KEY, attributes);
        let response = self
            .api()
            .post(&format!("{}.json", Self::RESOURCE), &body)?;
        Ok(unwrap_resource(Self::KEY, response))
    }

    fn update(&self, id: ResourceId, attributes: Value) -> Result<Value, MiteError> {
        let body = wrap_resource(Self::KEY, attributes);
        let response = self
            .api()
            .put(&format!("{}/{id}.json", Self::RESOURCE), Some(&body))?;
        Ok(unwrap_resource(Self::KEY, response))
    }

    fn delete(&self, id: ResourceId) -> Result<Value, MiteError> {
        let response = self
            .api()
            .delete(&format!("{}/{id}.json", Self::RESOURCE))?;
        Ok(unwrap_resource(Self::KEY, response))
    }
}
