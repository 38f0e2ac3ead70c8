use crate::client::MiteApi;

use super::{Adapter, ArchivableAdapter, ReadAdapter, WriteAdapter};

/// Customers, read-write and archivable.
#[derive(Debug, Clone)]
pub struct Customers {
    api: MiteApi,
}

impl Customers {
    pub fn new(api: MiteApi) -> Self {
        Self { api }
    }
}

impl Adapter for Customers {
    fn api(&self) -> &MiteApi {
        &self.api
    }
}

impl ReadAdapter for Customers {
    const RESOURCE: &'static str = "customers";
    const KEY: &'static str = "customer";
}

impl ArchivableAdapter for Customers {}

impl WriteAdapter for Customers {}
