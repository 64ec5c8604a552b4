//! Well-known labels, annotations and kinds used when joining hub objects

/// Label OCM puts on PlacementDecisions (and ApplicationSet generators
/// select on) naming the owning Placement
pub const PLACEMENT_LABEL: &str = "cluster.open-cluster-management.io/placement";

/// Annotation marking a subscription as a hub-side copy of another one
pub const HOSTING_SUBSCRIPTION_ANNOTATION: &str =
    "apps.open-cluster-management.io/hosting-subscription";

/// Placement kind used when a placement reference omits its kind
pub const DEFAULT_PLACEMENT_KIND: &str = "Placement";

/// Separator for application identity keys. Kubernetes names cannot
/// contain it.
pub const APP_ID_SEPARATOR: &str = ":";
