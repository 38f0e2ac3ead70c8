use crate::client::MiteApi;

use super::{Adapter, ArchivableAdapter, ReadAdapter, WriteAdapter};

/// Services (kinds of work, e.g. "Consulting"), read-write and archivable.
#[derive(Debug, Clone)]
pub struct Services {
    api: MiteApi,
}

impl Services {
    pub fn new(api: MiteApi) -> Self {
        Self { api }
    }
}

impl Adapter for Services {
    fn api(&self) -> &MiteApi {
        &self.api
    }
}

impl ReadAdapter for Services {
    const RESOURCE: &'static str = "services";
    const KEY: &'static str = "service";
}

impl ArchivableAdapter for Services {}

impl WriteAdapter for Services {}
