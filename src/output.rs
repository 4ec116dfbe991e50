use crate::cli::Section;
use crate::model::{Product, ProductKey};

pub fn format_product_list(products: &[Product]) -> String {
    let mut out = String::new();
    out.push_str(&format!("## Products ({})\n\n", products.len()));

    for (i, product) in products.iter().enumerate() {
        out.push_str(&format!("### {}. {}{}\n", i + 1, product.name, badges(product)));
        if !product.category.is_empty() {
            out.push_str(&format!("- **Category:** {}\n", product.category));
        }
        out.push_str(&format!(
            "- **Price:** {}\n",
            format_price(product.price, product.original_price)
        ));
        out.push_str(&format!(
            "- **Rating:** {} ({} reviews)\n",
            format_rating(product.rating),
            format_number(u64::from(product.reviews))
        ));
        out.push_str(&format!("- **ID:** {}\n", product.id));

        if i < products.len() - 1 {
            out.push_str("\n---\n\n");
        }
    }

    out
}

pub fn format_product_detail(product: &Product, section: Option<Section>) -> String {
    let mut out = String::new();

    let sections: &[Section] = match section {
        Some(ref s) => std::slice::from_ref(s),
        None => Section::ALL,
    };

    if section.is_none() {
        out.push_str(&format!("# {}{}\n\n", product.name, badges(product)));
    }

    for sec in sections {
        match sec {
            Section::Overview => format_overview(product, &mut out),
            Section::Description => format_description(product, &mut out),
            Section::Features => format_features(product, &mut out),
            Section::Options => format_options(product, &mut out),
            Section::Specifications => format_specifications(product, &mut out),
            Section::Images => format_images(product, &mut out),
        }
    }

    out
}

/// The terminal "not found" screen, with the way back to the listing.
pub fn format_not_found(key: &ProductKey) -> String {
    format!(
        "# Product Not Found\n\nNo product matches {}.\n\nBack to products: `cycle-catalog list`\n",
        key
    )
}

fn badges(product: &Product) -> String {
    let mut out = String::new();
    if product.is_bestseller() {
        out.push_str(" [Bestseller]");
    }
    if product.is_new() {
        out.push_str(" [New]");
    }
    out
}

fn format_overview(product: &Product, out: &mut String) {
    out.push_str("## Overview\n");
    if !product.category.is_empty() {
        out.push_str(&format!("- **Category:** {}\n", product.category));
    }
    out.push_str(&format!(
        "- **Price:** {}\n",
        format_price(product.price, product.original_price)
    ));
    out.push_str(&format!(
        "- **Rating:** {} {:.1}/5 ({} reviews)\n",
        format_rating(product.rating),
        product.rating,
        format_number(u64::from(product.reviews))
    ));
    out.push_str(&format!("- **ID:** {}\n", product.id));
    out.push('\n');
}

fn format_description(product: &Product, out: &mut String) {
    if product.description.is_empty() {
        return;
    }
    out.push_str("## Description\n");
    out.push_str(&product.description);
    out.push_str("\n\n");
}

fn format_features(product: &Product, out: &mut String) {
    if product.features.is_empty() {
        return;
    }
    out.push_str("## Key Features\n");
    for feature in &product.features {
        out.push_str(&format!("- {}\n", feature));
    }
    out.push('\n');
}

fn format_options(product: &Product, out: &mut String) {
    out.push_str("## Options\n");
    out.push_str(&format!("- **Sizes:** {}\n", product.sizes.join(", ")));
    out.push_str(&format!("- **Colors:** {}\n", product.colors.join(", ")));
    out.push('\n');
}

fn format_specifications(product: &Product, out: &mut String) {
    if product.specifications.is_empty() {
        return;
    }
    out.push_str("## Specifications\n");
    out.push_str("| Component | Detail |\n");
    out.push_str("|---|---|\n");
    for (label, value) in product.specifications.iter() {
        out.push_str(&format!("| {} | {} |\n", label, value));
    }
    out.push('\n');
}

fn format_images(product: &Product, out: &mut String) {
    out.push_str("## Images\n");
    for (i, url) in product.images.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, url));
    }
    out.push('\n');
}

/// Strike-through is shown whenever an original price is given, even if it
/// is not higher than the current price; the discount only when it is.
fn format_price(price: f64, original: Option<f64>) -> String {
    let current = format_amount(price);
    match original {
        Some(orig) if orig > price => {
            let discount = ((orig - price) / orig * 100.0).round() as u32;
            format!("{} ~~{}~~ ({}% off)", current, format_amount(orig), discount)
        }
        Some(orig) => format!("{} ~~{}~~", current, format_amount(orig)),
        None => current,
    }
}

fn format_amount(amount: f64) -> String {
    // Round to whole cents first so 9.999 carries into the dollars.
    let total_cents = (amount * 100.0).round() as u64;
    let cents = total_cents % 100;
    let grouped = format_number(total_cents / 100);
    if cents == 0 {
        format!("${}", grouped)
    } else {
        format!("${}.{:02}", grouped, cents)
    }
}

fn format_rating(rating: f64) -> String {
    let full = rating.floor().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}
