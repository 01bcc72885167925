//! Registry resolving MSP identifiers to their deserializers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::MspError;
use crate::local::LocalMsp;

/// Holds every configured MSP. One of them is the local (default) MSP,
/// selected by the empty identifier.
pub struct MspManager {
    local_id: String,
    msps: HashMap<String, Arc<LocalMsp>>,
}

impl MspManager {
    /// Build a manager with `local` as the default MSP.
    pub fn new(local: LocalMsp) -> Self {
        let local_id = local.msp_id().to_string();
        let mut msps = HashMap::new();
        msps.insert(local_id.clone(), Arc::new(local));
        Self { local_id, msps }
    }

    /// Register an additional MSP.
    pub fn register(&mut self, msp: LocalMsp) {
        self.msps.insert(msp.msp_id().to_string(), Arc::new(msp));
    }

    /// Resolve an MSP identifier to its identity deserializer. The empty
    /// identifier selects the local MSP.
    pub fn deserializer(&self, msp_id: &str) -> Result<Arc<LocalMsp>, MspError> {
        let id = if msp_id.is_empty() {
            &self.local_id
        } else {
            msp_id
        };
        self.msps
            .get(id)
            .cloned()
            .ok_or_else(|| MspError::UnknownMsp(id.to_string()))
    }
}
