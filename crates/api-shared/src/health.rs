use crate::types::HealthRes;

/// Simple health service shared by every Folio front end
///
/// This service provides a standardised way to check the health status of the Folio system.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Folio is alive".into(),
        }
    }
}
