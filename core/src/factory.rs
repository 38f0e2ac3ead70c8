//! One handle per mite account, handing out resource adapters.

use std::sync::{Arc, OnceLock};

use crate::adapters::{Customers, Daily, Projects, Services, TimeEntries, Tracker, Users};
use crate::client::MiteApi;
use crate::config::Config;
use crate::http::{Transport, UreqTransport};

/// Entry point to the API of one account.
///
/// Adapters are built on first access and cached, so repeated calls return
/// the same instance. Construction never touches the network.
#[derive(Debug)]
pub struct Mite {
    api: MiteApi,
    projects: OnceLock<Projects>,
    customers: OnceLock<Customers>,
    services: OnceLock<Services>,
    users: OnceLock<Users>,
    time_entries: OnceLock<TimeEntries>,
    tracker: OnceLock<Tracker>,
    daily: OnceLock<Daily>,
}

impl Mite {
    pub fn new(realm: impl Into<String>, apikey: impl Into<String>) -> Self {
        Self::from_api(MiteApi::new(realm, apikey))
    }

    pub fn with_transport(
        realm: impl Into<String>,
        apikey: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::from_api(MiteApi::with_transport(realm, apikey, transport))
    }

    pub fn from_config(config: &Config) -> Self {
        let transport = Arc::new(UreqTransport::with_timeout(config.timeout()));
        Self::with_transport(config.realm.clone(), config.apikey.clone(), transport)
    }

    pub fn from_api(api: MiteApi) -> Self {
        Self {
            api,
            projects: OnceLock::new(),
            customers: OnceLock::new(),
            services: OnceLock::new(),
            users: OnceLock::new(),
            time_entries: OnceLock::new(),
            tracker: OnceLock::new(),
            daily: OnceLock::new(),
        }
    }

    /// The base client, for `myself`, `account` and raw requests.
    pub fn api(&self) -> &MiteApi {
        &self.api
    }

    pub fn realm(&self) -> &str {
        self.api.realm()
    }

    pub fn apikey(&self) -> &str {
        self.api.apikey()
    }

    pub fn projects(&self) -> &Projects {
        self.projects.get_or_init(|| Projects::new(self.api.clone()))
    }

    pub fn customers(&self) -> &Customers {
        self.customers.get_or_init(|| Customers::new(self.api.clone()))
    }

    pub fn services(&self) -> &Services {
        self.services.get_or_init(|| Services::new(self.api.clone()))
    }

    pub fn users(&self) -> &Users {
        self.users.get_or_init(|| Users::new(self.api.clone()))
    }

    pub fn time_entries(&self) -> &TimeEntries {
        self.time_entries.get_or_init(|| TimeEntries::new(self.api.clone()))
    }

    pub fn tracker(&self) -> &Tracker {
        self.tracker.get_or_init(|| Tracker::new(self.api.clone()))
    }

    pub fn daily(&self) -> &Daily {
        self.daily.get_or_init(|| Daily::new(self.api.clone()))
    }
}
