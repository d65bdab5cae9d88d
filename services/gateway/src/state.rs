use quake_store::SharedStore;
use quake_types::filter::RecordPolicy;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub policy: RecordPolicy, // Applied to both inserts and reads
}

impl AppState {
    pub fn new(store: SharedStore, policy: RecordPolicy) -> Self {
        Self { store, policy }
    }
}
