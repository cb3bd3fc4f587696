//! Scripted cart session against local storage, exercising the stores the
//! way an app shell would.

use anyhow::Result;
use clap::Parser;
use rust_decimal_macros::dec;
use storefront_client::config::StorefrontConfig;
use storefront_client::models::{ProductListing, StorageScope};
use storefront_client::StorefrontClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "storefront-demo", about = "Run a scripted cart session")]
struct Args {
    /// Partition the cart under this user id instead of the anonymous scope.
    #[arg(long)]
    user_id: Option<Uuid>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = StorefrontConfig::load()?;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (client, mut events) = StorefrontClient::from_config(&config)?;
    let scope = args
        .user_id
        .map(StorageScope::User)
        .unwrap_or(StorageScope::Anonymous);
    client.cart.initialize(scope).await;

    let listing = ProductListing {
        id: Uuid::new_v4(),
        name: "Espresso Beans 1kg".to_string(),
        slug: "espresso-beans-1kg".to_string(),
        price: dec!(18.50),
        list_price: dec!(24.00),
        image_url: None,
        brand_id: None,
        category_id: None,
        variant_label: Some("1 kg".to_string()),
        stock: 40,
        purchase_limit: 5,
    };

    client.cart.add_to_cart(listing.clone(), 1).await;
    client.cart.add_to_cart(listing.clone(), 1).await;
    client.cart.update_quantity(listing.id, 3).await;
    println!(
        "cart total: {} ({} units, {} saved)",
        client.cart.total(),
        client.cart.item_count(),
        client.cart.savings()
    );

    client.cart.flush().await?;

    while let Ok(event) = events.try_recv() {
        println!("event: {event:?}");
    }
    Ok(())
}
