//! End-of-run statistics.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{FailureKind, LoadStats};

/// Logs merge counters and non-zero failure counts.
pub fn print_load_statistics(stats: &LoadStats) {
    info!(
        "Merged {} pages: {} images appended, {} images activated",
        stats.pages_merged(),
        stats.images_appended(),
        stats.images_activated()
    );

    let total_failures = stats.total_failures();
    if total_failures > 0 {
        info!("Failure Counts ({} total):", total_failures);
        for kind in FailureKind::iter() {
            let count = stats.failure_count(kind);
            if count > 0 {
                info!("   {}: {}", kind.as_str(), count);
            }
        }
    }
}
