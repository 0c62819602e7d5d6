//! User-agent heuristics. Substring checks only; this is not a UA parser.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub device_type: DeviceType,
    pub browser: &'static str,
    pub os: &'static str,
}

const MOBILE_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

pub fn classify_user_agent(user_agent: &str) -> ClientInfo {
    let ua = user_agent.to_lowercase();
    ClientInfo {
        device_type: device_type(&ua),
        browser: browser(&ua),
        os: os(&ua),
    }
}

fn device_type(ua: &str) -> DeviceType {
    // Android tablets omit the "Mobile" token that Android phones carry.
    let is_tablet = ua.contains("ipad")
        || ua.contains("tablet")
        || (ua.contains("android") && !ua.contains("mobile"));
    if is_tablet {
        return DeviceType::Tablet;
    }
    if MOBILE_MARKERS.iter().any(|m| ua.contains(m)) {
        return DeviceType::Mobile;
    }
    DeviceType::Desktop
}

fn browser(ua: &str) -> &'static str {
    // Edge and Chrome-on-iOS embed other engines' tokens; check the specific ones first.
    if ua.contains("edg/") || ua.contains("edge/") || ua.contains("edga/") || ua.contains("edgios/") {
        "Edge"
    } else if ua.contains("firefox") || ua.contains("fxios") {
        "Firefox"
    } else if ua.contains("chrome") || ua.contains("crios") {
        "Chrome"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        "unknown"
    }
}

fn os(ua: &str) -> &'static str {
    if ua.contains("windows") {
        "Windows"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("mac") {
        "macOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
    const CHROME_ANDROID_PHONE: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36";
    const CHROME_ANDROID_TABLET: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
    const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15";

    #[test]
    fn test_desktop_chrome_on_windows() {
        let info = classify_user_agent(CHROME_WINDOWS);
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Windows");
    }

    #[test]
    fn test_iphone_is_mobile_ios() {
        let info = classify_user_agent(SAFARI_IPHONE);
        assert_eq!(info.device_type, DeviceType::Mobile);
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "iOS");
    }

    #[test]
    fn test_ipad_is_tablet() {
        assert_eq!(classify_user_agent(SAFARI_IPAD).device_type, DeviceType::Tablet);
    }

    #[test]
    fn test_android_phone_vs_tablet() {
        let phone = classify_user_agent(CHROME_ANDROID_PHONE);
        assert_eq!(phone.device_type, DeviceType::Mobile);
        assert_eq!(phone.os, "Android");

        let tablet = classify_user_agent(CHROME_ANDROID_TABLET);
        assert_eq!(tablet.device_type, DeviceType::Tablet);
        assert_eq!(tablet.os, "Android");
    }

    #[test]
    fn test_edge_not_reported_as_chrome() {
        assert_eq!(classify_user_agent(EDGE_WINDOWS).browser, "Edge");
    }

    #[test]
    fn test_firefox_linux_and_safari_mac() {
        let ff = classify_user_agent(FIREFOX_LINUX);
        assert_eq!((ff.browser, ff.os), ("Firefox", "Linux"));
        let safari = classify_user_agent(SAFARI_MAC);
        assert_eq!((safari.browser, safari.os), ("Safari", "macOS"));
    }

    #[test]
    fn test_empty_agent_is_unknown_desktop() {
        let info = classify_user_agent("");
        assert_eq!(info.device_type, DeviceType::Desktop);
        assert_eq!(info.browser, "unknown");
        assert_eq!(info.os, "unknown");
    }
}
