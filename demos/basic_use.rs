use nimbus::{to_frame, Channel, DashboardConfig, ForecastFrameExt, LatLon, Nimbus, NimbusError};
use polars::prelude::IntoLazy;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    configure_polars_display();
    let config = DashboardConfig::from_json(r#"{"temperatureUnit": "celsius"}"#)
        .map_err(NimbusError::from)?;
    let client = Nimbus::new(config)?;

    let forecast = client
        .forecast()
        .location(LatLon(55.6761, 12.5683))
        .call()
        .await?;

    for point in forecast.data.iter().filter(|p| p.is_maximum_of(Channel::Temperature)) {
        println!("Warmest around {}: {:?} °C", point.time, point.temperature);
    }

    let frame = to_frame(&forecast.data)?;
    println!("{}", frame);
    println!("{}", frame.lazy().precipitation_groups().collect()?);

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
