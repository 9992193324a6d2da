use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "USDA FoodData Central nutrition lookup", long_about = None)]
pub struct Cli {
    /// Caller identity charged in the rate limiter
    #[arg(long, global = true, default_value = "local")]
    pub caller: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Suggest foods matching a free-text query
    Search {
        query: String,
        /// Max suggestions (1-50); defaults to DEFAULT_PAGE_SIZE
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Fetch one ingredient, optionally rescaled to a serving
    #[command(group(ArgGroup::new("lookup").required(true).args(["query", "fdc_id"])))]
    Ingredient {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        fdc_id: Option<u64>,
        #[arg(long, requires = "unit")]
        amount: Option<f64>,
        #[arg(long, requires = "amount")]
        unit: Option<String>,
    },
    /// Total the nutrients of a recipe file (JSON list of ingredient inputs)
    Recipe { file: PathBuf },
    /// Convert an amount between units (works offline)
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        from: String,
        to: String,
    },
    /// Print a nutrition facts label for a recipe file
    Label {
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, conflicts_with = "hide_business")]
        business: Option<String>,
        #[arg(long)]
        hide_business: bool,
        /// Repeat for each allergen
        #[arg(long = "allergen")]
        allergens: Vec<String>,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
