//! Controller Directory: enumeration of the platform's PWM controllers.

use pwm_core::{normalize_filter, ControllerRecord, DriverResult, PwmProvider};
use tracing::debug;

/// All controllers whose friendly name equals `filter`, in platform order.
///
/// `None` and the empty string both mean "no filter". An empty result is not
/// an error.
pub async fn find_controllers(
    provider: &dyn PwmProvider,
    filter: Option<&str>,
) -> DriverResult<Vec<ControllerRecord>> {
    let filter = normalize_filter(filter);
    let mut records = provider.find_all(filter).await?;
    records.retain(|r| r.matches(filter));

    debug!(
        backend = provider.backend(),
        filter = filter.unwrap_or("<none>"),
        count = records.len(),
        "enumerated pwm controllers"
    );
    Ok(records)
}
