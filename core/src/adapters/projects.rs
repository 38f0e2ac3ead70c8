use crate::client::MiteApi;

use super::{Adapter, ArchivableAdapter, ReadAdapter, WriteAdapter};

/// Projects, read-write and archivable.
#[derive(Debug, Clone)]
pub struct Projects {
    api: MiteApi,
}

impl Projects {
    pub fn new(api: MiteApi) -> Self {
        Self { api }
    }
}

impl Adapter for Projects {
    fn api(&self) -> &MiteApi {
        &self.api
    }
}

impl ReadAdapter for Projects {
    const RESOURCE: &'static str = "projects";
    const KEY: &'static str = "project";
}

impl ArchivableAdapter for Projects {}

impl WriteAdapter for Projects {}
