use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hostel_listing_editor::editor::{ControlValue, FieldKind, FieldTable};
use hostel_listing_editor::services::{HttpListingApi, HttpObjectStore, ImageFile};
use hostel_listing_editor::{ChangeEvent, Config, CurrentUser, ListingEditor};
use serde_json::{Map, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Create a hostel listing from a field file and a set of images
#[derive(Debug, Parser)]
#[command(name = "hostel-editor", version)]
struct Args {
    /// Identifier of the acting user (sent as `userRef`)
    #[arg(long)]
    user_id: String,

    /// JSON object of control id to value, e.g. {"name": "...", "sale": true}
    #[arg(long)]
    draft: PathBuf,

    /// Image to upload; repeat for more (max 6, first is the cover)
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

/// Turn one entry of the field file into the event its control would emit
fn change_event(fields: &FieldTable, id: &str, value: &Value) -> Result<ChangeEvent> {
    let kind = fields
        .kind(id)
        .with_context(|| format!("Unknown control '{}' in draft file", id))?;

    let value = match (kind, value) {
        (FieldKind::Checkbox | FieldKind::Category(_), Value::Bool(checked)) => {
            ControlValue::Checked(*checked)
        }
        (FieldKind::Text | FieldKind::Number, Value::String(text)) => ControlValue::Text(text.clone()),
        (FieldKind::Number, Value::Number(number)) => ControlValue::Text(number.to_string()),
        (kind, other) => anyhow::bail!("Unsupported value for '{}' ({:?}): {}", id, kind, other),
    };
    Ok(ChangeEvent {
        id: id.to_string(),
        value,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("🏠 Hostel Listing Editor");
    info!("API: {}  storage bucket: {}", config.api_url, config.storage_bucket);

    let store = HttpObjectStore::new(&config).context("Failed to create storage client")?;
    let api = HttpListingApi::new(&config).context("Failed to create listing API client")?;
    let mut editor = ListingEditor::new(
        CurrentUser::new(args.user_id),
        Arc::new(store),
        Arc::new(api),
    );

    // Progress is only logged
    let mut progress = editor.subscribe_progress();
    tokio::spawn(async move {
        loop {
            match progress.recv().await {
                Ok(sample) => info!("Upload {} is {:.0}% done", sample.key, sample.percent()),
                Err(RecvError::Lagged(skipped)) => debug!("Skipped {} progress samples", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let raw = tokio::fs::read_to_string(&args.draft)
        .await
        .with_context(|| format!("Failed to read {}", args.draft.display()))?;
    let fields: Map<String, Value> = serde_json::from_str(&raw).context("Draft file must be a JSON object")?;

    for (id, value) in &fields {
        let event = change_event(editor.fields(), id, value)?;
        editor.handle_change(event)?;
    }
    info!("Applied {} field(s) from {}", fields.len(), args.draft.display());

    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        files.push(ImageFile::from_path(path).await?);
    }

    if let Err(e) = editor.upload_images(&files).await {
        warn!("{}", editor.image_upload_error().unwrap_or_default());
        return Err(e).context("Image upload failed");
    }

    let draft = editor.draft();
    println!("{} ({})", draft.name, draft.category.as_str());
    match draft.price_unit() {
        Some(unit) => println!("   Price: {} ({})", draft.regular_price, unit),
        None => println!("   Price: {}", draft.regular_price),
    }
    if let Some(cover) = draft.cover_image() {
        println!("   Cover: {}", cover);
    }
    println!("   Images: {}", draft.image_urls.len());

    match editor.submit().await {
        Ok(route) => {
            info!("✅ Listing created");
            println!("{}", route.path());
            Ok(())
        }
        Err(e) => {
            warn!("{}", editor.error().unwrap_or_default());
            Err(e).context("Submission failed")
        }
    }
}
