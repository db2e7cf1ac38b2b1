//! Device → target group mapping.

use packet_sd_client::Device;
use packet_sd_core::labels;
use packet_sd_core::{LabelSet, TargetGroup, source_for};

/// Maps devices to target groups scraped on a fixed port.
///
/// Pure: the same device always yields the same group. Every group carries
/// the full set of meta labels, with `""` for anything the device lacks, so
/// relabeling rules see a stable label set.
#[derive(Debug, Clone)]
pub struct TargetMapper {
    port: u16,
    separator: String,
}

impl TargetMapper {
    pub fn new(port: u16, separator: impl Into<String>) -> Self {
        Self {
            port,
            separator: separator.into(),
        }
    }

    pub fn map(&self, device: &Device) -> TargetGroup {
        let network = device.network_info();
        let address = join_host_port(&network.private_ipv4, self.port);

        let labels = LabelSet::from([
            (labels::HOSTNAME.to_string(), device.hostname.clone()),
            (labels::STATE.to_string(), device.state.clone()),
            (labels::BILLING_CYCLE.to_string(), device.billing_cycle.clone()),
            (labels::PLAN.to_string(), device.plan_slug().to_string()),
            (labels::FACILITY.to_string(), device.facility_code().to_string()),
            (labels::PRIVATE_IPV4.to_string(), network.private_ipv4),
            (labels::PUBLIC_IPV4.to_string(), network.public_ipv4),
            (labels::PUBLIC_IPV6.to_string(), network.public_ipv6),
            (labels::TAGS.to_string(), join_tags(&device.tags, &self.separator)),
            (labels::PROJECT_ID.to_string(), device.project_id().to_string()),
        ]);

        TargetGroup::new(source_for(&device.id), address, labels)
    }
}

/// Join tags as `sep + t1 + sep + t2 + ... + sep`, or `""` when there are none.
///
/// The outer separators let a relabel regex like `.*,prod,.*` match any
/// position without special-casing the first or last tag.
pub fn join_tags(tags: &[String], separator: &str) -> String {
    if tags.is_empty() {
        return String::new();
    }
    format!("{separator}{}{separator}", tags.join(separator))
}

/// `host:port`, bracketing hosts that contain a colon (IPv6).
fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
