use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named external link published by a brand (website, twitter, linkedin...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandLink {
    pub name: String,
    pub url: String,
}

/// The subset of a Brandfetch brand document this client understands.
///
/// Brand documents are loosely shaped, so extraction walks the JSON value and
/// skips anything that does not match instead of failing the whole lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandProfile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub accent_color: Option<String>,
    pub logo_url: Option<String>,
    pub icon_url: Option<String>,
    pub links: Vec<BrandLink>,
    pub industries: Vec<String>,
}

impl BrandProfile {
    pub fn from_value(brand: &Value) -> Self {
        let mut profile = BrandProfile {
            name: str_field(brand, "name"),
            description: str_field(brand, "description"),
            ..Default::default()
        };

        profile.accent_color = array(brand, "colors")
            .find(|c| c.get("type").and_then(Value::as_str) == Some("accent"))
            .and_then(|c| str_field(c, "hex"));

        for logo in array(brand, "logos") {
            let Some(src) = first_format_src(logo) else {
                continue;
            };
            match logo.get("type").and_then(Value::as_str) {
                Some("logo") => profile.logo_url = Some(src),
                Some("icon") => profile.icon_url = Some(src),
                _ => {}
            }
        }

        profile.links = array(brand, "links")
            .filter_map(|l| {
                Some(BrandLink {
                    name: str_field(l, "name")?,
                    url: str_field(l, "url")?,
                })
            })
            .collect();

        profile.industries = brand
            .get("company")
            .map(|company| {
                array(company, "industries")
                    .filter_map(|i| str_field(i, "name"))
                    .collect()
            })
            .unwrap_or_default();

        profile
    }
}

/// The first logo asset of any type, for callers that only want an image.
pub fn first_logo_src(brand: &Value) -> Option<String> {
    array(brand, "logos").find_map(first_format_src)
}

fn first_format_src(logo: &Value) -> Option<String> {
    logo.get("formats")?
        .as_array()?
        .first()
        .and_then(|f| str_field(f, "src"))
}

fn array<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|a| a.iter())
        .into_iter()
        .flatten()
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
