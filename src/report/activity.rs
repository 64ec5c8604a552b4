//! Current DR activity of a placement

use crate::models::{DrpcStatus, PlacementInfo};

/// Human readable description of what a placement control is doing
///
/// Relocation phases name the preferred cluster, failover phases the
/// failover cluster. Every other phase, or a missing target, is "Unknown".
pub fn current_activity(
    status: Option<DrpcStatus>,
    failover_cluster: Option<&str>,
    preferred_cluster: Option<&str>,
) -> String {
    let (verb, target) = match status {
        Some(DrpcStatus::Relocating) => ("Relocating", preferred_cluster),
        Some(DrpcStatus::Relocated) => ("Relocated", preferred_cluster),
        Some(DrpcStatus::FailingOver) => ("FailingOver", failover_cluster),
        Some(DrpcStatus::FailedOver) => ("FailedOver", failover_cluster),
        _ => return "Unknown".to_string(),
    };

    match target.filter(|t| !t.is_empty()) {
        Some(cluster) => format!("{} to {}", verb, cluster),
        None => "Unknown".to_string(),
    }
}

/// `current_activity` of one placement
pub fn placement_activity(info: &PlacementInfo) -> String {
    current_activity(
        info.status,
        info.failover_cluster.as_deref(),
        info.preferred_cluster.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relocation_names_preferred_cluster() {
        assert_eq!(
            current_activity(Some(DrpcStatus::Relocated), Some("west"), Some("east")),
            "Relocated to east"
        );
        assert_eq!(
            current_activity(Some(DrpcStatus::Relocating), None, Some("east")),
            "Relocating to east"
        );
    }

    #[test]
    fn test_failover_names_failover_cluster() {
        assert_eq!(
            current_activity(Some(DrpcStatus::FailingOver), Some("west"), Some("east")),
            "FailingOver to west"
        );
        assert_eq!(
            current_activity(Some(DrpcStatus::FailedOver), Some("west"), None),
            "FailedOver to west"
        );
    }

    #[test]
    fn test_other_phases_are_unknown() {
        assert_eq!(
            current_activity(Some(DrpcStatus::Deployed), Some("west"), Some("east")),
            "Unknown"
        );
        assert_eq!(current_activity(None, Some("west"), Some("east")), "Unknown");
        assert_eq!(
            current_activity(Some(DrpcStatus::FailedOver), None, Some("east")),
            "Unknown"
        );
    }
}
