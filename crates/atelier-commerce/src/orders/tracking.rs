//! Shipping carriers and tracking links.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Carriers the atelier ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
    #[serde(rename = "Canada Post")]
    CanadaPost,
    #[serde(rename = "UPS")]
    Ups,
    #[serde(rename = "DHL")]
    Dhl,
    #[serde(rename = "FedEx")]
    FedEx,
    Purolator,
    #[serde(rename = "USPS")]
    Usps,
    /// Anything else; the tracking URL is entered by hand.
    Other,
}

impl Carrier {
    pub const ALL: [Carrier; 7] = [
        Carrier::CanadaPost,
        Carrier::Ups,
        Carrier::Dhl,
        Carrier::FedEx,
        Carrier::Purolator,
        Carrier::Usps,
        Carrier::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Carrier::CanadaPost => "Canada Post",
            Carrier::Ups => "UPS",
            Carrier::Dhl => "DHL",
            Carrier::FedEx => "FedEx",
            Carrier::Purolator => "Purolator",
            Carrier::Usps => "USPS",
            Carrier::Other => "Other",
        }
    }

    /// Parse a carrier name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|carrier| carrier.name().eq_ignore_ascii_case(name))
    }

    /// Tracking page template; `{tracking}` is replaced with the number.
    pub fn url_template(&self) -> Option<&'static str> {
        match self {
            Carrier::CanadaPost => Some(
                "https://www.canadapost-postescanada.ca/track-reperage/en#/search?searchFor={tracking}",
            ),
            Carrier::Ups => Some("https://www.ups.com/track?tracknum={tracking}"),
            Carrier::Dhl => Some("https://www.dhl.com/en/express/tracking.html?AWB={tracking}"),
            Carrier::FedEx => Some("https://www.fedex.com/fedextrack/?trknbr={tracking}"),
            Carrier::Purolator => {
                Some("https://www.purolator.com/en/ship-track/tracking-search.page?q={tracking}")
            }
            Carrier::Usps => {
                Some("https://tools.usps.com/go/TrackConfirmAction?tLabels={tracking}")
            }
            Carrier::Other => None,
        }
    }

    /// Tracking page for a number, if the carrier has a known template.
    pub fn tracking_url(&self, number: &str) -> Option<String> {
        let number = number.trim();
        if number.is_empty() {
            return None;
        }
        self.url_template()
            .map(|template| template.replace("{tracking}", &encode_uri_component(number)))
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shipment details attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tracking {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub carrier: Option<Carrier>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Tracking {
    /// Build tracking info from admin input.
    ///
    /// Blank fields become `None`. A hand-entered URL wins; otherwise the
    /// carrier template is used.
    pub fn new(number: &str, carrier: Option<Carrier>, manual_url: Option<&str>) -> Self {
        let number = Some(number.trim()).filter(|n| !n.is_empty());
        let url = manual_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| carrier?.tracking_url(number?));

        Self {
            number: number.map(str::to_string),
            carrier,
            url,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.carrier.is_none() && self.url.is_none()
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_carrier_urls() {
        assert_eq!(
            Carrier::Ups.tracking_url(" 1Z999AA10123456784 "),
            Some("https://www.ups.com/track?tracknum=1Z999AA10123456784".to_string())
        );
        assert_eq!(
            Carrier::CanadaPost.tracking_url("7023 2100"),
            Some(
                "https://www.canadapost-postescanada.ca/track-reperage/en#/search?searchFor=7023%202100"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_other_or_blank_has_no_url() {
        assert_eq!(Carrier::Other.tracking_url("ABC"), None);
        assert_eq!(Carrier::Dhl.tracking_url("   "), None);
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a b/c?d&é"), "a%20b%2Fc%3Fd%26%C3%A9");
        assert_eq!(encode_uri_component("A-z_0.9!~*'()"), "A-z_0.9!~*'()");
    }

    #[test]
    fn test_carrier_names_roundtrip() {
        for carrier in Carrier::ALL {
            assert_eq!(Carrier::from_name(carrier.name()), Some(carrier));
        }
        assert_eq!(Carrier::from_name("fedex"), Some(Carrier::FedEx));
        assert_eq!(
            serde_json::to_string(&Carrier::CanadaPost).unwrap(),
            "\"Canada Post\""
        );
    }

    #[test]
    fn test_manual_url_wins() {
        let tracking = Tracking::new(
            "123",
            Some(Carrier::Other),
            Some("https://track.example/123"),
        );
        assert_eq!(tracking.url.as_deref(), Some("https://track.example/123"));

        let tracking = Tracking::new("123", Some(Carrier::Usps), None);
        assert_eq!(
            tracking.url.as_deref(),
            Some("https://tools.usps.com/go/TrackConfirmAction?tLabels=123")
        );

        assert!(Tracking::new(" ", None, Some("")).is_empty());
    }
}
