//! Device and network diagnostics shown by `sys` and the header

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::Result;

/// Leading autonomous system number in an ISP name, e.g. `AS13335 `
static AS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AS\d+\s*").expect("valid AS prefix pattern"));

/// Opaque display strings describing the host and its connection
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub ip: String,
    pub city: String,
    pub country: String,
    pub isp: String,
    pub timezone: String,
    pub os: String,
    pub connection_type: String,
    pub downlink: String,
    pub battery_level: String,
    pub is_charging: String,
    pub cores: String,
    /// Terminal size as `COLSxROWS`
    pub screen: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            ip: "SCANNING...".to_string(),
            city: "...".to_string(),
            country: "...".to_string(),
            isp: "...".to_string(),
            timezone: "...".to_string(),
            os: "DETECTING...".to_string(),
            connection_type: "UNKNOWN".to_string(),
            downlink: "UNKNOWN".to_string(),
            battery_level: "UNKNOWN".to_string(),
            is_charging: "UNKNOWN".to_string(),
            cores: "...".to_string(),
            screen: "UNKNOWN".to_string(),
        }
    }
}

/// Read-only view of device info with change notification
pub trait DeviceInfoProvider: Send + Sync {
    /// Current values
    fn snapshot(&self) -> DeviceInfo;

    /// Receiver notified whenever any value changes
    fn subscribe(&self) -> watch::Receiver<DeviceInfo>;
}

/// In-process provider; collectors push updates into it
pub struct SharedDeviceInfo {
    tx: watch::Sender<DeviceInfo>,
}

impl SharedDeviceInfo {
    pub fn new(initial: DeviceInfo) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Apply an update and notify subscribers
    pub fn update(&self, apply: impl FnOnce(&mut DeviceInfo)) {
        self.tx.send_modify(apply);
    }
}

impl Default for SharedDeviceInfo {
    fn default() -> Self {
        Self::new(DeviceInfo::default())
    }
}

impl DeviceInfoProvider for SharedDeviceInfo {
    fn snapshot(&self) -> DeviceInfo {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<DeviceInfo> {
        self.tx.subscribe()
    }
}

/// Response of an ipinfo-style lookup service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpLookup {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub org: Option<String>,
    pub timezone: Option<String>,
}

impl IpLookup {
    /// Copy the lookup into device info, filling gaps with placeholders
    pub fn apply(self, info: &mut DeviceInfo) {
        info.ip = self.ip.unwrap_or_else(|| "HIDDEN".to_string());
        info.city = self.city.unwrap_or_else(|| "UNKNOWN".to_string());
        info.country = self.country.unwrap_or_else(|| "UNKNOWN".to_string());
        info.isp = self
            .org
            .map(|org| strip_as_number(&org))
            .unwrap_or_else(|| "UNKNOWN".to_string());
        if let Some(timezone) = self.timezone {
            info.timezone = timezone;
        }
    }
}

/// Remove the leading AS number from an organisation name
pub fn strip_as_number(org: &str) -> String {
    AS_PREFIX.replace(org, "").into_owned()
}

/// Display label for the host operating system
pub fn os_label(os: &str) -> &'static str {
    match os {
        "windows" => "WINDOWS NT",
        "macos" => "MACOS X",
        "linux" => "LINUX KERNEL",
        "android" => "ANDROID OS",
        "ios" => "IOS",
        _ => "Unknown OS",
    }
}

/// Battery level and charging flag, when the host exposes one
pub fn read_battery() -> Option<(String, String)> {
    let entries = fs::read_dir("/sys/class/power_supply").ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_battery = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("BAT"));
        if !is_battery {
            continue;
        }

        let capacity = fs::read_to_string(path.join("capacity")).ok()?;
        let status = fs::read_to_string(path.join("status")).unwrap_or_default();
        let charging = if status.trim().eq_ignore_ascii_case("charging") {
            "YES"
        } else {
            "NO"
        };
        return Some((format!("{}%", capacity.trim()), charging.to_string()));
    }
    None
}

/// Connection type and link speed of the first interface that is up,
/// read from a sysfs-style `class/net` directory
pub fn read_network(net_root: &Path) -> Option<(String, String)> {
    let mut interfaces: Vec<_> = fs::read_dir(net_root)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.file_name().is_some_and(|name| name != OsStr::new("lo")))
        .collect();
    interfaces.sort();

    for path in interfaces {
        let operstate = fs::read_to_string(path.join("operstate")).unwrap_or_default();
        if operstate.trim() != "up" {
            continue;
        }

        let kind = if path.join("wireless").exists() {
            "WIFI"
        } else {
            "ETHERNET"
        };
        // Wireless drivers usually report no speed, or -1
        let downlink = fs::read_to_string(path.join("speed"))
            .ok()
            .and_then(|speed| speed.trim().parse::<i64>().ok())
            .filter(|mbps| *mbps > 0)
            .map(|mbps| format!("{} Mbps", mbps))
            .unwrap_or_else(|| "UNKNOWN".to_string());
        return Some((kind.to_string(), downlink));
    }
    None
}

async fn lookup_ip(client: &Client, url: &str) -> Result<IpLookup> {
    let lookup = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<IpLookup>()
        .await?;
    Ok(lookup)
}

/// Fill `info` with local facts immediately and the IP lookup once it answers
pub fn spawn_collector(
    info: Arc<SharedDeviceInfo>,
    client: Client,
    lookup_url: String,
) -> JoinHandle<()> {
    info.update(|device| {
        device.os = os_label(std::env::consts::OS).to_string();
        device.cores = std::thread::available_parallelism()
            .map(|n| n.get().to_string())
            .unwrap_or_else(|_| "?".to_string());
        if let Some((level, charging)) = read_battery() {
            device.battery_level = level;
            device.is_charging = charging;
        }
        if let Some((kind, downlink)) = read_network(Path::new("/sys/class/net")) {
            device.connection_type = kind;
            device.downlink = downlink;
        }
        if let Ok((cols, rows)) = crossterm::terminal::size() {
            device.screen = format!("{}x{}", cols, rows);
        }
    });

    tokio::spawn(async move {
        match lookup_ip(&client, &lookup_url).await {
            Ok(lookup) => {
                debug!("ip lookup answered for {:?}", lookup.ip);
                info.update(|device| lookup.apply(device));
            }
            Err(e) => {
                warn!("ip lookup failed: {}", e);
                info.update(|device| {
                    device.ip = "OFFLINE/VPN".to_string();
                    device.isp = "UNKNOWN".to_string();
                });
            }
        }
    })
}
