use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Fully shaped product as consumed by the renderers. Every default has
/// already been applied by the time one of these exists.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub images: Vec<String>,
    pub rating: f64,
    pub reviews: u32,
    pub description: String,
    pub features: Vec<String>,
    pub specifications: Specifications,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bestseller: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
}

impl Product {
    pub fn is_bestseller(&self) -> bool {
        self.is_bestseller.unwrap_or(false)
    }

    pub fn is_new(&self) -> bool {
        self.is_new.unwrap_or(false)
    }

    /// URL slug derived from the product name, the same way the CMS
    /// generates one when a document is authored.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// The fixed specification labels, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecLabel {
    FrameMaterial,
    Weight,
    Drivetrain,
    Brakes,
    Wheels,
    Tires,
    Handlebars,
    Saddle,
}

impl SpecLabel {
    pub const ALL: &'static [SpecLabel] = &[
        SpecLabel::FrameMaterial,
        SpecLabel::Weight,
        SpecLabel::Drivetrain,
        SpecLabel::Brakes,
        SpecLabel::Wheels,
        SpecLabel::Tires,
        SpecLabel::Handlebars,
        SpecLabel::Saddle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SpecLabel::FrameMaterial => "Frame Material",
            SpecLabel::Weight => "Weight",
            SpecLabel::Drivetrain => "Drivetrain",
            SpecLabel::Brakes => "Brakes",
            SpecLabel::Wheels => "Wheels",
            SpecLabel::Tires => "Tires",
            SpecLabel::Handlebars => "Handlebars",
            SpecLabel::Saddle => "Saddle",
        }
    }
}

impl fmt::Display for SpecLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sparse, ordered label → value map. Entries keep the order of
/// [`SpecLabel::ALL`] no matter what order they are inserted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Specifications {
    entries: Vec<(SpecLabel, String)>,
}

impl Specifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: SpecLabel, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(l, _)| *l == label) {
            slot.1 = value;
            return;
        }
        let rank = |l: SpecLabel| SpecLabel::ALL.iter().position(|x| *x == l);
        let at = self
            .entries
            .iter()
            .position(|(l, _)| rank(*l) > rank(label))
            .unwrap_or(self.entries.len());
        self.entries.insert(at, (label, value));
    }

    pub fn with(mut self, label: SpecLabel, value: &str) -> Self {
        self.insert(label, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpecLabel, &str)> {
        self.entries.iter().map(|(l, v)| (*l, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Specifications {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label.label(), value)?;
        }
        map.end()
    }
}

/// What a resolution is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductKey {
    Id(String),
    Slug(String),
}

impl ProductKey {
    pub fn as_str(&self) -> &str {
        match self {
            ProductKey::Id(s) | ProductKey::Slug(s) => s,
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKey::Id(id) => write!(f, "id {}", id),
            ProductKey::Slug(slug) => write!(f, "slug {}", slug),
        }
    }
}

pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
