use crate::HealthRes;

/// Health check shared by the server binaries.
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "cathlab is alive".into(),
        }
    }
}
