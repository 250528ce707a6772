use anyhow::Result;
use property_valuer::features::PropertyInput;
use property_valuer::valuation::EstimateRequest;
use property_valuer::{config, presenter, server};
use std::path::Path;

use crate::cli::EstimateArgs;

/// Execute the estimate command
///
/// Runs the same pipeline as `POST /v1/estimate` and prints the result.
pub async fn execute(config_path: &Path, args: EstimateArgs) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let service = server::build_service(&cfg)?;

    let request = EstimateRequest {
        property: PropertyInput {
            bedrooms: args.bedrooms,
            bathrooms: args.bathrooms,
            size_sq_ft: args.size_sq_ft,
            property_type: args.property_type,
        },
        location: args.location_query(),
    };

    let response = service.estimate(&request).await?;

    let view = presenter::present(&response);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", presenter::render_text(&view));
    }

    Ok(())
}
