//! Wire types returned by the Packet API.
//!
//! Every field tolerates being absent or `null`; the discovery side maps
//! missing values to empty label values instead of rejecting the device.

use serde::{Deserialize, Deserializer, Serialize};

/// A project visible to the auth token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
}

/// A compute instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub hostname: String,
    #[serde(deserialize_with = "nullable")]
    pub state: String,
    #[serde(deserialize_with = "nullable")]
    pub billing_cycle: String,
    pub plan: Option<Plan>,
    pub facility: Option<Facility>,
    #[serde(deserialize_with = "nullable")]
    pub tags: Vec<String>,
    pub project: Option<ProjectRef>,
    #[serde(rename = "ip_addresses", deserialize_with = "nullable")]
    pub network: Vec<IpAddressAssignment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    #[serde(deserialize_with = "nullable")]
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facility {
    #[serde(deserialize_with = "nullable")]
    pub code: String,
}

/// The owning project. Listings usually carry only the `href`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRef {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpAddressAssignment {
    #[serde(deserialize_with = "nullable")]
    pub address: String,
    #[serde(deserialize_with = "nullable")]
    pub public: bool,
    #[serde(deserialize_with = "nullable")]
    pub address_family: u8,
    #[serde(deserialize_with = "nullable")]
    pub management: bool,
}

/// The management addresses of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInfo {
    pub private_ipv4: String,
    pub public_ipv4: String,
    pub public_ipv6: String,
}

impl Device {
    /// Collect the device's management addresses.
    ///
    /// Only assignments flagged `management` count. The last matching
    /// assignment of each kind wins.
    pub fn network_info(&self) -> NetworkInfo {
        let mut info = NetworkInfo::default();
        for ip in self.network.iter().filter(|ip| ip.management) {
            match (ip.address_family, ip.public) {
                (4, true) => info.public_ipv4 = ip.address.clone(),
                (4, false) => info.private_ipv4 = ip.address.clone(),
                _ => info.public_ipv6 = ip.address.clone(),
            }
        }
        info
    }

    pub fn plan_slug(&self) -> &str {
        self.plan.as_ref().map_or("", |p| p.slug.as_str())
    }

    pub fn facility_code(&self) -> &str {
        self.facility.as_ref().map_or("", |f| f.code.as_str())
    }

    /// The owning project id, falling back to the last `href` segment.
    pub fn project_id(&self) -> &str {
        match &self.project {
            Some(p) if !p.id.is_empty() => &p.id,
            Some(p) => p.href.rsplit('/').next().unwrap_or(""),
            None => "",
        }
    }
}

/// Pagination metadata shared by list responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub next: Option<Link>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(deserialize_with = "nullable")]
    pub href: String,
}

/// One page of a list endpoint.
pub(crate) trait Page: serde::de::DeserializeOwned + Send {
    type Item: Send;

    /// Split into the page's items and the href of the next page, if any.
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ProjectsPage {
    #[serde(deserialize_with = "nullable")]
    projects: Vec<Project>,
    meta: Meta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DevicesPage {
    #[serde(deserialize_with = "nullable")]
    devices: Vec<Device>,
    meta: Meta,
}

impl Page for ProjectsPage {
    type Item = Project;

    fn into_parts(self) -> (Vec<Project>, Option<String>) {
        (self.projects, next_href(self.meta))
    }
}

impl Page for DevicesPage {
    type Item = Device;

    fn into_parts(self) -> (Vec<Device>, Option<String>) {
        (self.devices, next_href(self.meta))
    }
}

fn next_href(meta: Meta) -> Option<String> {
    meta.next.map(|l| l.href).filter(|h| !h.is_empty())
}

/// Deserialize `null` as the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_JSON: &str = r#"{
        "id": "d1",
        "hostname": "web-1",
        "state": "active",
        "billing_cycle": "hourly",
        "plan": { "slug": "baremetal_0" },
        "facility": { "code": "ewr1" },
        "tags": ["web", "prod"],
        "project": { "href": "/projects/p1" },
        "ip_addresses": [
            { "address": "147.75.1.2", "public": true, "address_family": 4, "management": true },
            { "address": "10.0.0.1", "public": false, "address_family": 4, "management": true },
            { "address": "2604:1380::1", "public": true, "address_family": 6, "management": true },
            { "address": "147.75.9.9", "public": true, "address_family": 4, "management": false }
        ]
    }"#;

    #[test]
    fn decode_full_device() {
        let device: Device = serde_json::from_str(DEVICE_JSON).unwrap();
        assert_eq!(device.id, "d1");
        assert_eq!(device.plan_slug(), "baremetal_0");
        assert_eq!(device.facility_code(), "ewr1");
        assert_eq!(device.tags, vec!["web", "prod"]);
        assert_eq!(device.project_id(), "p1");
    }

    #[test]
    fn network_info_uses_management_addresses_only() {
        let device: Device = serde_json::from_str(DEVICE_JSON).unwrap();
        let info = device.network_info();
        assert_eq!(info.private_ipv4, "10.0.0.1");
        assert_eq!(info.public_ipv4, "147.75.1.2");
        assert_eq!(info.public_ipv6, "2604:1380::1");
    }

    #[test]
    fn decode_sparse_device_with_nulls() {
        let json = r#"{ "id": "d2", "hostname": null, "tags": null, "ip_addresses": null, "plan": null }"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.id, "d2");
        assert_eq!(device.hostname, "");
        assert!(device.tags.is_empty());
        assert_eq!(device.plan_slug(), "");
        assert_eq!(device.facility_code(), "");
        assert_eq!(device.project_id(), "");
        assert_eq!(device.network_info(), NetworkInfo::default());
    }

    #[test]
    fn project_id_prefers_explicit_id() {
        let device = Device {
            project: Some(ProjectRef {
                id: "explicit".to_string(),
                href: "/projects/from-href".to_string(),
            }),
            ..Device::default()
        };
        assert_eq!(device.project_id(), "explicit");
    }

    #[test]
    fn devices_page_exposes_next_link() {
        let json = r#"{ "devices": [{ "id": "d1" }], "meta": { "next": { "href": "/projects/p1/devices?page=2" } } }"#;
        let page: DevicesPage = serde_json::from_str(json).unwrap();
        let (devices, next) = page.into_parts();
        assert_eq!(devices.len(), 1);
        assert_eq!(next.as_deref(), Some("/projects/p1/devices?page=2"));
    }

    #[test]
    fn last_page_has_no_next_link() {
        let json = r#"{ "projects": [], "meta": { "next": null } }"#;
        let page: ProjectsPage = serde_json::from_str(json).unwrap();
        let (projects, next) = page.into_parts();
        assert!(projects.is_empty());
        assert!(next.is_none());
    }
}
