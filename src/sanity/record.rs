use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Product document as returned by the content store. Almost every field
/// is optional; nothing here is trusted until it has been normalized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteProduct {
    #[serde(rename = "_id", deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub slug: Option<Slug>,
    #[serde(deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub original_price: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<ImageSource>,
    #[serde(deserialize_with = "lenient_vec")]
    pub images: Option<Vec<ImageSource>>,
    #[serde(deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub reviews: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_vec")]
    pub features: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub specifications: Option<RemoteSpecifications>,
    #[serde(deserialize_with = "lenient_vec")]
    pub sizes: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_vec")]
    pub colors: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient")]
    pub is_bestseller: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub is_new: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Slug {
    #[serde(deserialize_with = "lenient")]
    pub current: Option<String>,
}

/// Nested specification object; field names differ from the display labels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSpecifications {
    #[serde(deserialize_with = "lenient")]
    pub frame_material: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub weight: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub drivetrain: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub brakes: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub wheels: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub tires: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub handlebars: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub saddle: Option<String>,
}

/// An image as the store hands it out: either an image object pointing at
/// an asset, or (in hand-edited documents) a bare URL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    Url(String),
    Object(ImageObject),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageObject {
    #[serde(deserialize_with = "lenient")]
    pub asset: Option<AssetRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetRef {
    #[serde(rename = "_ref", deserialize_with = "lenient")]
    pub reference: Option<String>,
    /// Present when the query dereferences the asset (`asset->`).
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
}

// A wrongly typed field reads as absent instead of failing the document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// Like `lenient`, but for arrays: elements that do not decode are dropped.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}
