// ── URL profiles ──
//
// A URL profile is a named set of link templates. `{ip}` inside a
// template stands for the address of whichever location uses the profile.

use serde::{Deserialize, Serialize};

/// Placeholder substituted with a device address.
pub const IP_PLACEHOLDER: &str = "{ip}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTemplate {
    pub name: String,
    pub template: String,
}

impl UrlTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    /// Replace every `{ip}` in the template with `ip`.
    pub fn render(&self, ip: &str) -> String {
        self.template.replace(IP_PLACEHOLDER, ip)
    }
}

/// A template rendered against one device address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlProfile {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<UrlTemplate>,
}

impl UrlProfile {
    pub fn new(name: impl Into<String>, urls: Vec<UrlTemplate>) -> Self {
        Self {
            name: name.into(),
            urls,
        }
    }

    pub fn render(&self, ip: &str) -> Vec<RenderedLink> {
        self.urls
            .iter()
            .map(|t| RenderedLink {
                name: t.name.clone(),
                url: t.render(ip),
            })
            .collect()
    }
}
