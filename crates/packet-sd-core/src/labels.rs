//! Prometheus label names attached to every discovered target.

/// Label holding the `host:port` Prometheus scrapes.
pub const ADDRESS_LABEL: &str = "__address__";

/// Provider segment used in label names and target group sources.
pub const PROVIDER: &str = "packet";

pub const HOSTNAME: &str = "__meta_packet_hostname";
pub const STATE: &str = "__meta_packet_state";
pub const BILLING_CYCLE: &str = "__meta_packet_billing_cycle";
pub const PLAN: &str = "__meta_packet_plan";
pub const FACILITY: &str = "__meta_packet_facility";
pub const PRIVATE_IPV4: &str = "__meta_packet_private_ipv4";
pub const PUBLIC_IPV4: &str = "__meta_packet_public_ipv4";
pub const PUBLIC_IPV6: &str = "__meta_packet_public_ipv6";
pub const TAGS: &str = "__meta_packet_tags";
pub const PROJECT_ID: &str = "__meta_packet_project_id";

/// Every meta label a target carries, in a stable order.
pub const META_LABELS: [&str; 10] = [
    HOSTNAME,
    STATE,
    BILLING_CYCLE,
    PLAN,
    FACILITY,
    PRIVATE_IPV4,
    PUBLIC_IPV4,
    PUBLIC_IPV6,
    TAGS,
    PROJECT_ID,
];
