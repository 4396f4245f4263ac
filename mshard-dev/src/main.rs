use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use envconfig::Envconfig;
use mshard_auth::{
    BlobClient, CredentialConfig, CredentialRegistry, HttpTokenExchanger,
    MemoryCredentialPersistence, TokenClientSettings,
};
use mshard_models::{
    BlobRef, EntityFilter, EntityId, GeoLocation, MediaItem, MediaItemSortField,
    SortBy, SortDirection,
};
use mshard_store::{
    AggregateStore, DynShardStore, FanOutCoordinator, MemoryShardStore,
    StoreSettings,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mshard-dev", about = "Development driver for sharded media stores")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed in-memory shards with random media items and walk every page.
    List(ListArgs),
    /// Refresh a credential loaded from a JSON file of credential configs.
    Refresh(RefreshArgs),
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 3)]
    shards: usize,
    #[arg(long, default_value_t = 20)]
    items_per_shard: usize,
    /// Falls back to MSHARD_DEFAULT_PAGE_SIZE.
    #[arg(long)]
    page_size: Option<usize>,
    #[arg(long, default_value = "DATE_TAKEN")]
    sort: MediaItemSortField,
    #[arg(long, default_value = "ASCENDING")]
    direction: SortDirection,
    /// Only list items of this album, e.g. `shard-0:album-1`.
    #[arg(long)]
    album: Option<EntityId>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(clap::Args, Debug)]
struct RefreshArgs {
    /// JSON array of credential configs.
    #[arg(long)]
    credentials: PathBuf,
    /// Credential to refresh; all of them when absent.
    #[arg(long)]
    id: Option<String>,
    /// Fetch this blob's metadata with the refreshed credential.
    #[arg(long, requires = "api_base")]
    item: Option<String>,
    #[arg(long)]
    api_base: Option<String>,
}

const ALBUMS_PER_SHARD: usize = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            signal_cancel.cancel();
        }
    });

    match cli.command {
        Command::List(args) => list(args, &cancel).await,
        Command::Refresh(args) => refresh(args, &cancel).await,
    }
}

async fn list(args: ListArgs, cancel: &CancellationToken) -> anyhow::Result<()> {
    let settings = StoreSettings::init_from_env()?;
    info!("use {:?}", settings);

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut shards: Vec<DynShardStore<MediaItem>> = Vec::with_capacity(args.shards);
    for s in 0..args.shards {
        let shard_id = format!("shard-{s}");
        let store = MemoryShardStore::new(shard_id.clone());
        for i in 0..args.items_per_shard {
            store.insert(random_item(&mut rng, &shard_id, i)?).await?;
        }
        shards.push(Arc::new(store));
    }
    let coordinator = FanOutCoordinator::with_settings(shards, settings)?;

    let filter = match args.album {
        Some(album) => EntityFilter::children_of(album),
        None => EntityFilter::all(),
    };
    let total = coordinator.count(&filter, cancel).await?;
    info!(total, "matching media items");

    let mut query = coordinator
        .query(SortBy::new(args.sort, args.direction))
        .with_filter(filter);
    if let Some(page_size) = args.page_size {
        query.page_size = page_size;
    }

    let mut page_no = 0;
    let mut seen = 0u64;
    loop {
        let page = coordinator.list_page(query.clone(), cancel).await?;
        if page.items.is_empty() {
            break;
        }
        page_no += 1;
        println!("-- page {page_no} ({} items)", page.items.len());
        for item in &page.items {
            println!(
                "{:<20} {:<16} {}",
                item.id.to_string(),
                item.file_name,
                item.date_taken.to_rfc3339()
            );
        }
        seen += page.items.len() as u64;
        match page.next_page_token {
            Some(token) => query = query.with_page_token(Some(token)),
            None => break,
        }
    }
    println!("listed {seen} of {total} items in {page_no} pages");
    Ok(())
}

fn random_item(
    rng: &mut StdRng,
    shard_id: &str,
    n: usize,
) -> anyhow::Result<MediaItem> {
    let album = format!("album-{}", rng.random_range(0..ALBUMS_PER_SHARD));
    // Somewhere in 2020..2025.
    let secs = rng.random_range(1_577_836_800i64..1_735_689_600i64);
    let date_taken = DateTime::from_timestamp(secs, 0)
        .context("generated timestamp out of range")?;
    let location = rng.random_bool(0.5).then(|| GeoLocation {
        lat: rng.random_range(-90.0..90.0),
        lon: rng.random_range(-180.0..180.0),
    });
    Ok(MediaItem {
        id: EntityId::new(shard_id, format!("item-{n:04}"))?,
        file_name: format!("IMG_{:04}.jpg", rng.random_range(0..10_000)),
        album_id: EntityId::new(shard_id, album)?,
        location,
        width: 4032,
        height: 3024,
        date_taken,
        blob_ref: BlobRef {
            account_id: "dev".into(),
            item_id: format!("{shard_id}-{n}"),
        },
    })
}

async fn refresh(args: RefreshArgs, cancel: &CancellationToken) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.credentials)
        .await
        .with_context(|| format!("reading {}", args.credentials.display()))?;
    let configs: Vec<CredentialConfig> = serde_json::from_str(&raw)?;

    let settings = TokenClientSettings::init_from_env()?;
    let exchanger = Arc::new(HttpTokenExchanger::new(&settings)?);
    let persistence = Arc::new(MemoryCredentialPersistence::new(configs));
    let registry = CredentialRegistry::load(persistence.clone(), exchanger).await?;

    let targets = match &args.id {
        Some(id) => vec![(id.clone(), registry.get_by_id(id)?)],
        None => registry.list_all(),
    };
    for (id, manager) in &targets {
        match manager.refresh(cancel).await {
            Ok(_) => info!(%id, refreshes = manager.refresh_count(), "credential refreshed"),
            Err(err) => warn!(%id, error = %err, "credential refresh failed"),
        }
    }

    if let (Some(item), Some(api_base)) = (args.item, args.api_base) {
        let (id, manager) = targets
            .first()
            .context("no credential to fetch the item with")?;
        let client = BlobClient::new(api_base, &settings)?;
        let metadata = client.get_item_metadata(manager, &item, cancel).await?;
        info!(%id, ?metadata, "fetched item metadata");
    }
    Ok(())
}
