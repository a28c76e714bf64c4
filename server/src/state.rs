use intake_ledger_core::Credential;
use intake_ledger_store::{RecordStore, TabularSource};

/// Shared handler state: one store for every request, plus the credential
/// used when a request does not bring its own.
pub struct AppState<S> {
    pub store: RecordStore<S>,
    pub default_credential: Option<Credential>,
}

impl<S: TabularSource> AppState<S> {
    pub fn new(store: RecordStore<S>, default_credential: Option<Credential>) -> Self {
        Self {
            store,
            default_credential,
        }
    }
}
