use crate::model::{Product, SpecLabel, Specifications};
use crate::sanity::image::ImageUrlBuilder;
use crate::sanity::record::{RemoteProduct, RemoteSpecifications};

pub const IMAGE_WIDTH: u32 = 800;
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/800";
pub const DEFAULT_SIZES: &[&str] = &["S", "M", "L", "XL"];
pub const DEFAULT_COLORS: &[&str] = &["Black", "White"];

/// Turn a loosely-typed store document into a display-ready [`Product`].
///
/// Pure: the output depends only on `record` and the builder's dataset.
/// `requested_id` stands in for a missing `_id` so a product always has
/// an identifier.
pub fn normalize(record: &RemoteProduct, images: &ImageUrlBuilder, requested_id: &str) -> Product {
    let id = non_empty(record.id.as_deref())
        .unwrap_or(requested_id)
        .to_string();

    let name = non_empty(record.name.as_deref())
        .or_else(|| non_empty(record.slug.as_ref().and_then(|s| s.current.as_deref())))
        .unwrap_or(id.as_str())
        .to_string();

    Product {
        name,
        category: record.category.clone().unwrap_or_default(),
        price: record.price.unwrap_or(0.0).max(0.0),
        original_price: record.original_price,
        images: build_images(record, images),
        rating: record.rating.unwrap_or(0.0).clamp(0.0, 5.0),
        reviews: record.reviews.map(count).unwrap_or(0),
        description: record.description.clone().unwrap_or_default(),
        features: record.features.clone().unwrap_or_default(),
        specifications: record
            .specifications
            .as_ref()
            .map(build_specifications)
            .unwrap_or_default(),
        sizes: or_default(record.sizes.as_deref(), DEFAULT_SIZES),
        colors: or_default(record.colors.as_deref(), DEFAULT_COLORS),
        is_bestseller: record.is_bestseller,
        is_new: record.is_new,
        id,
    }
}

fn build_images(record: &RemoteProduct, builder: &ImageUrlBuilder) -> Vec<String> {
    let mut urls = Vec::new();
    let sources = record
        .image
        .iter()
        .chain(record.images.iter().flatten());
    for source in sources {
        match builder.url_for(source, IMAGE_WIDTH) {
            Some(url) => urls.push(url),
            None => tracing::warn!("Skipping unrecognized image reference: {:?}", source),
        }
    }
    if urls.is_empty() {
        urls.push(PLACEHOLDER_IMAGE.to_string());
    }
    urls
}

fn build_specifications(remote: &RemoteSpecifications) -> Specifications {
    let mut specs = Specifications::new();
    for &label in SpecLabel::ALL {
        let value = match label {
            SpecLabel::FrameMaterial => &remote.frame_material,
            SpecLabel::Weight => &remote.weight,
            SpecLabel::Drivetrain => &remote.drivetrain,
            SpecLabel::Brakes => &remote.brakes,
            SpecLabel::Wheels => &remote.wheels,
            SpecLabel::Tires => &remote.tires,
            SpecLabel::Handlebars => &remote.handlebars,
            SpecLabel::Saddle => &remote.saddle,
        };
        // Whitespace is a value; only an empty string counts as missing.
        if let Some(value) = value.as_deref().filter(|s| !s.is_empty()) {
            specs.insert(label, value);
        }
    }
    specs
}

fn or_default(values: Option<&[String]>, default: &[&str]) -> Vec<String> {
    match values {
        Some(v) if !v.is_empty() => v.to_vec(),
        _ => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn count(raw: f64) -> u32 {
    if raw.is_finite() && raw > 0.0 {
        raw.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}
