use serde_json::Value;

use crate::client::MiteApi;
use crate::error::MiteError;

use super::{lookup, Adapter, ArchivableAdapter, ReadAdapter};

/// Users of the account. The API does not allow managing users, so this
/// adapter is read-only.
#[derive(Debug, Clone)]
pub struct Users {
    api: MiteApi,
}

impl Users {
    pub fn new(api: MiteApi) -> Self {
        Self { api }
    }

    pub fn by_email(&self, email: &str, archived: bool) -> Result<Value, MiteError> {
        lookup(self, "email", email, archived)
    }
}

impl Adapter for Users {
    fn api(&self) -> &MiteApi {
        &self.api
    }
}

impl ReadAdapter for Users {
    const RESOURCE: &'static str = "users";
    const KEY: &'static str = "user";
}

impl ArchivableAdapter for Users {}
