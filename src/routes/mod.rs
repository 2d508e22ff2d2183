pub mod health;
pub mod page;
pub mod regions;
pub mod weather;

use crate::services::cwa::CwaClient;
use crate::services::prediction::PredictionAdapter;

/// Shared application state for all handlers.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) cwa_client: CwaClient,
    pub(crate) prediction: PredictionAdapter,
}
