//! GROQ query texts. The detail queries project the same field set; the
//! listing projection is the subset needed for catalog cards.

pub const PRODUCT_BY_ID: &str = r#"*[_type == "product" && _id == $id][0] {
  _id,
  name,
  slug,
  category,
  price,
  originalPrice,
  image,
  images,
  rating,
  reviews,
  description,
  features,
  specifications,
  sizes,
  colors,
  isBestseller,
  isNew
}"#;

pub const PRODUCT_BY_SLUG: &str = r#"*[_type == "product" && slug.current == $slug][0] {
  _id,
  name,
  slug,
  category,
  price,
  originalPrice,
  image,
  images,
  rating,
  reviews,
  description,
  features,
  specifications,
  sizes,
  colors,
  isBestseller,
  isNew
}"#;

pub const PRODUCTS: &str = r#"*[_type == "product"] | order(_createdAt desc) {
  _id,
  name,
  slug,
  category,
  price,
  originalPrice,
  image,
  rating,
  reviews,
  features,
  isBestseller,
  isNew
}"#;
