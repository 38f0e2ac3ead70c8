use serde_json::Value;

use crate::client::MiteApi;
use crate::error::MiteError;

use super::{unwrap_resource, Adapter, ResourceId};

/// The stopwatch of the user owning the API key.
///
/// Only one time entry can be tracked at a time; starting another stops the
/// current one on the server.
#[derive(Debug, Clone)]
pub struct Tracker {
    api: MiteApi,
}

impl Tracker {
    pub fn new(api: MiteApi) -> Self {
        Self { api }
    }

    /// The running tracker, `{}` when nothing is tracked.
    pub fn current(&self) -> Result<Value, MiteError> {
        Ok(unwrap_resource("tracker", self.api.get("tracker.json", &[])?))
    }

    /// Start tracking time on an existing time entry.
    pub fn start(&self, id: ResourceId) -> Result<Value, MiteError> {
        let response = self.api.put(&format!("tracker/{id}.json"), None)?;
        Ok(unwrap_resource("tracker", response))
    }

    pub fn stop(&self, id: ResourceId) -> Result<Value, MiteError> {
        let response = self.api.delete(&format!("tracker/{id}.json"))?;
        Ok(unwrap_resource("tracker", response))
    }
}

impl Adapter for Tracker {
    fn api(&self) -> &MiteApi {
        &self.api
    }
}
