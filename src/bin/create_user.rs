use catalog_back::{
    Result,
    config::DatabaseConfig,
    database,
    repositories::{PgUserStore, UserStore},
    services::auth_service,
};
use clap::Parser;
use tracing::Level;

/// Adds a user to the catalog's user store.
#[derive(Debug, Parser)]
#[command(name = "create_user")]
struct Args {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,

    /// Allow the user to log in to the management area.
    #[arg(long)]
    staff: bool,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Failed to create user: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = DatabaseConfig::from_env()?;
    let pool = database::create_pool(&config).await?;
    let users = PgUserStore::new(pool);

    let password_hash = auth_service::hash_password(&args.password)?;
    let user = users
        .create(&args.username, &password_hash, args.staff)
        .await?;

    tracing::info!(
        "Created user {} (id {}, staff: {})",
        user.username,
        user.id,
        user.is_staff
    );

    Ok(())
}
