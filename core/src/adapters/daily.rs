use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::client::MiteApi;
use crate::error::MiteError;

use super::{unwrap_resource, Adapter};

/// Time entries of the API key's user for a single day.
#[derive(Debug, Clone)]
pub struct Daily {
    api: MiteApi,
}

impl Daily {
    pub fn new(api: MiteApi) -> Self {
        Self { api }
    }

    pub fn today(&self) -> Result<Value, MiteError> {
        Ok(unwrap_resource("time_entry", self.api.get("daily.json", &[])?))
    }

    pub fn at(&self, date: NaiveDate) -> Result<Value, MiteError> {
        let path = format!("daily/{}/{}/{}.json", date.year(), date.month(), date.day());
        Ok(unwrap_resource("time_entry", self.api.get(&path, &[])?))
    }
}

impl Adapter for Daily {
    fn api(&self) -> &MiteApi {
        &self.api
    }
}
