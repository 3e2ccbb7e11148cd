use clap::Parser;
use rocket::info;

#[derive(Parser)]
#[command(name = "gather-api")]
#[command(about = "Event management and audience Q&A API server")]
#[command(version)]
struct Cli {}

#[rocket::main]
async fn main() {
    let _cli = Cli::parse();

    // Pick up DATABASE_URL / JWT_SECRET from a local .env if present.
    dotenvy::dotenv().ok();

    info!("gather-api v{} starting", env!("CARGO_PKG_VERSION"));

    gather_api::rocket()
        .launch()
        .await
        .expect("Rocket server failed to launch");
}
