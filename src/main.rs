mod app;
mod clock;
mod config;
mod error;
mod fairing;
mod geocode;
mod geolocate;
mod page;
mod resolver;
mod routes;
mod store;
mod sunset;
mod time;
mod view;

use config::Settings;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(e) => println!("WARNING! .env NOT LOADED: {}", e),
        Ok(_) => println!("Successfully loaded .env"),
    };
    let settings = Settings::load()?;

    let _rocket = app::build(&settings)?
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {e}"))?;
    Ok(())
}
