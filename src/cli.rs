use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "cycle-catalog",
    version,
    about = "Browse the bicycle storefront catalog from the command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Content store project id (e.g., lnk8ymnf)
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Content store dataset (default: production)
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// Query API version, YYYY-MM-DD (default: 2024-01-01)
    #[arg(long, global = true)]
    pub api_version: Option<String>,

    /// Query the live API instead of the CDN
    #[arg(long, global = true)]
    pub no_cdn: bool,

    /// Give up on the content store after this many milliseconds (default: 5000)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Markdown)]
    pub format: Format,

    /// Verbose logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one product
    Product {
        /// Product id, slug (with --slug), or storefront URL ending in /products/<id>
        identifier: String,

        /// Treat the identifier as a URL slug
        #[arg(long)]
        slug: bool,

        /// Only show a specific section
        #[arg(long, value_enum)]
        section: Option<Section>,
    },

    /// List every product in the catalog
    List,

    /// Read product ids from stdin, one per line; each line replaces the previous one
    Browse {
        /// Treat each line as a URL slug
        #[arg(long)]
        slug: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Markdown,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Overview,
    Description,
    Features,
    Options,
    Specifications,
    Images,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Overview,
        Section::Description,
        Section::Features,
        Section::Options,
        Section::Specifications,
        Section::Images,
    ];
}
