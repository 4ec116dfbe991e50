//! Built-in catalog served when the content store cannot supply a product.

use crate::model::{slugify, Product, ProductKey, SpecLabel, Specifications};

#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    products: Vec<Product>,
}

impl FallbackCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        Self::new(builtin_products())
    }

    pub fn find(&self, key: &ProductKey) -> Option<&Product> {
        match key {
            ProductKey::Id(id) => self.products.iter().find(|p| p.id == *id),
            ProductKey::Slug(slug) => {
                let wanted = slugify(slug);
                self.products.iter().find(|p| p.slug() == wanted)
            }
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

const SPLASH: &str = "https://images.unsplash.com";
const SPLASH_PLUS: &str = "https://plus.unsplash.com";
const SPLASH_QUERY: &str = "?w=600&auto=format&fit=crop&q=60";

fn photo(host: &str, id: &str) -> String {
    format!("{}/{}{}", host, id, SPLASH_QUERY)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn builtin_products() -> Vec<Product> {
    vec![
        Product {
            id: "1".into(),
            name: "Velocity Pro Carbon".into(),
            category: "Road Racing".into(),
            price: 4999.0,
            original_price: Some(5499.0),
            images: vec![
                photo(SPLASH, "photo-1456990493443-0d0ee2a630cc"),
                photo(SPLASH, "photo-1668763144355-cf09becd5b32"),
            ],
            rating: 4.9,
            reviews: 127,
            description: "The Velocity Pro Carbon represents the pinnacle of road racing technology."
                .into(),
            features: strings(&[
                "High-modulus carbon fiber frame",
                "Shimano Ultegra Di2 electronic shifting",
                "Carbon aero wheelset",
            ]),
            specifications: Specifications::new()
                .with(SpecLabel::FrameMaterial, "High-Modulus Carbon Fiber")
                .with(SpecLabel::Weight, "6.8 kg (14.9 lbs)")
                .with(SpecLabel::Drivetrain, "Shimano Ultegra Di2 22-Speed")
                .with(SpecLabel::Brakes, "Hydraulic Disc Brakes"),
            sizes: strings(&["XS", "S", "M", "L", "XL"]),
            colors: strings(&["Matte Black", "Racing Red", "Pearl White"]),
            is_bestseller: Some(true),
            is_new: None,
        },
        Product {
            id: "2".into(),
            name: "Aero Elite TT".into(),
            category: "Time Trial".into(),
            price: 6299.0,
            original_price: None,
            images: vec![
                photo(SPLASH_PLUS, "premium_photo-1682125270920-39b89bb20867"),
                photo(SPLASH_PLUS, "premium_photo-1753738125825-af6565b70309"),
            ],
            rating: 4.8,
            reviews: 89,
            description: "Designed for time trial specialists and triathletes.".into(),
            features: strings(&[
                "Aerodynamic frame design",
                "Integrated cockpit system",
                "Disc brake compatibility",
            ]),
            specifications: Specifications::new()
                .with(SpecLabel::FrameMaterial, "Aero Carbon Fiber")
                .with(SpecLabel::Weight, "7.2 kg (15.9 lbs)")
                .with(SpecLabel::Drivetrain, "Shimano Dura-Ace Di2")
                .with(SpecLabel::Brakes, "Hydraulic Disc Brakes"),
            sizes: strings(&["S", "M", "L", "XL"]),
            colors: strings(&["Stealth Black", "Electric Blue"]),
            is_bestseller: None,
            is_new: Some(true),
        },
        Product {
            id: "3".into(),
            name: "Endurance Comfort".into(),
            category: "Mountain".into(),
            price: 3299.0,
            original_price: None,
            images: vec![
                photo(SPLASH, "photo-1534150034764-046bf225d3fa"),
                photo(SPLASH, "photo-1515412512744-6e4adc8b5e55"),
            ],
            rating: 4.7,
            reviews: 203,
            description: "Built for comfort on long mountain rides.".into(),
            features: strings(&[
                "Comfort geometry",
                "Vibration damping",
                "32mm tire clearance",
            ]),
            specifications: Specifications::new()
                .with(SpecLabel::FrameMaterial, "Aluminum Alloy")
                .with(SpecLabel::Weight, "8.5 kg")
                .with(SpecLabel::Drivetrain, "Shimano 105")
                .with(SpecLabel::Brakes, "Hydraulic Disc Brakes"),
            sizes: strings(&["S", "M", "L", "XL"]),
            colors: strings(&["Forest Green", "Midnight Blue"]),
            is_bestseller: None,
            is_new: None,
        },
        Product {
            id: "4".into(),
            name: "Sprint Master".into(),
            category: "Gravel".into(),
            price: 5799.0,
            original_price: None,
            images: vec![
                photo(SPLASH, "photo-1578949678951-d4d4d390f582"),
                photo(SPLASH_PLUS, "premium_photo-1670002395973-fc53c2b92a88"),
            ],
            rating: 4.9,
            reviews: 156,
            description: "Versatile gravel bike for all terrains.".into(),
            features: strings(&[
                "Lightweight carbon",
                "Aggressive geometry",
                "Electronic shifting",
            ]),
            specifications: Specifications::new()
                .with(SpecLabel::FrameMaterial, "Carbon Fiber")
                .with(SpecLabel::Weight, "7.8 kg")
                .with(SpecLabel::Drivetrain, "SRAM Force eTap")
                .with(SpecLabel::Brakes, "Hydraulic Disc Brakes"),
            sizes: strings(&["XS", "S", "M", "L", "XL"]),
            colors: strings(&["Sand", "Olive Green"]),
            is_bestseller: None,
            is_new: None,
        },
    ]
}
