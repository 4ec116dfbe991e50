use super::record::ImageSource;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Builds width-constrained CDN URLs for image references of one dataset.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// Absolute URL for `source` at `width` pixels, or `None` when the
    /// reference cannot be understood.
    pub fn url_for(&self, source: &ImageSource, width: u32) -> Option<String> {
        match source {
            ImageSource::Url(raw) => with_width(raw, width),
            ImageSource::Object(obj) => {
                let asset = obj.asset.as_ref()?;
                if let Some(ref url) = asset.url {
                    return with_width(url, width);
                }
                let reference = asset.reference.as_deref()?;
                self.from_reference(reference, width)
            }
        }
    }

    fn from_reference(&self, reference: &str, width: u32) -> Option<String> {
        // image-<hash>-<W>x<H>-<ext>
        let caps = asset_ref_pattern().captures(reference)?;
        let base = format!(
            "{}/{}/{}/{}-{}.{}",
            CDN_BASE, self.project_id, self.dataset, &caps[1], &caps[2], &caps[3]
        );
        with_width(&base, width)
    }
}

fn asset_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^image-([A-Za-z0-9]+)-(\d+x\d+)-([a-z0-9]+)$").expect("valid asset pattern")
    })
}

fn with_width(raw: &str, width: u32) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "w")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("w", &width.to_string());
    Some(url.into())
}
