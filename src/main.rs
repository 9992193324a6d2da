use anyhow::{Context, Result};
use nutrition_proxy::api_connection::connection::FdcClient;
use nutrition_proxy::cli::{parse_args, Command};
use nutrition_proxy::config::Settings;
use nutrition_proxy::label::{build_label, LabelInput};
use nutrition_proxy::recipe_parser::{load_recipe_request, IngredientInput};
use nutrition_proxy::service::NutritionService;
use nutrition_proxy::units::{convert, normalize};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(level.to_lowercase())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

#[derive(Serialize)]
struct ConversionOutput {
    amount: f64,
    from: String,
    to: String,
    result: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = parse_args();

    if let Command::Convert { amount, from, to } = &cli.command {
        let result = convert(*amount, from, to)
            .with_context(|| format!("Failed to convert {amount} {from} to {to}"))?;
        return print_json(&ConversionOutput {
            amount: *amount,
            from: normalize(from),
            to: normalize(to),
            result,
        });
    }

    let settings = Settings::from_env().context("Failed to load configuration")?;
    let client = FdcClient::new(settings.fdc_client_config())
        .context("Failed to build the FoodData Central client")?;
    let service = NutritionService::new(client, settings.rate_limiter(), settings.default_page_size);
    let caller = cli.caller.as_str();

    match cli.command {
        Command::Search { query, limit } => {
            let suggestions = service
                .suggest(caller, &query, limit)
                .await
                .with_context(|| format!("Search for '{query}' failed"))?;
            print_json(&suggestions)
        }
        Command::Ingredient {
            query,
            fdc_id,
            amount,
            unit,
        } => {
            let input = IngredientInput {
                fdc_id,
                q: query,
                amount,
                unit: unit.map(|u| u.trim().to_lowercase()),
            };
            let ingredient = service
                .get_ingredient(caller, &input)
                .await
                .context("Ingredient lookup failed")?;
            print_json(&ingredient)
        }
        Command::Recipe { file } => {
            let request = load_recipe_request(&file).await?;
            let output = service
                .calculate_recipe(caller, &request.ingredients)
                .await
                .with_context(|| format!("Failed to calculate recipe '{}'", file.display()))?;
            print_json(&output)
        }
        Command::Label {
            file,
            title,
            business,
            hide_business,
            allergens,
        } => {
            let request = load_recipe_request(&file).await?;
            let recipe_data = service
                .calculate_recipe(caller, &request.ingredients)
                .await
                .with_context(|| format!("Failed to calculate recipe '{}'", file.display()))?;
            let label = build_label(&LabelInput {
                recipe_title: title,
                recipe_data,
                business_name: business,
                hide_business_info: hide_business,
                allergens,
                nutrition_adjustments: Default::default(),
            })?;
            print!("{label}");
            Ok(())
        }
        Command::Convert { .. } => Ok(()),
    }
}
