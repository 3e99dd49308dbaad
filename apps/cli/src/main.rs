use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    detail::directions_url, load_settings, AddImageOutcome, ClientSettings, DetailLoader,
    DetailState, HttpOrphanageApi, ListingLoader, Notification, PositionPicker,
    RegistrationWizard,
};
use shared::domain::{GeoPosition, OrphanageId};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

mod devices;

use devices::{FileQueuePicker, TerminalNavigator};

#[derive(Parser, Debug)]
#[command(name = "orphanages", about = "Browse and register orphanages")]
struct Args {
    /// Overrides the configured backend URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every registered orphanage.
    List,
    /// Show one orphanage.
    Show {
        id: i64,
        /// Extra attempts after a failed or timed-out load.
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
    /// Register a new orphanage.
    Register {
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        about: String,
        #[arg(long)]
        instructions: String,
        #[arg(long)]
        opening_hours: String,
        #[arg(long)]
        open_on_weekends: bool,
        /// Photo to attach; repeat for several.
        #[arg(long = "image", required = true)]
        images: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load client settings")?;
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    let api = Arc::new(HttpOrphanageApi::from_settings(&settings)?);
    let (events, _) = broadcast::channel(64);

    match args.command {
        Command::List => list(api, events).await,
        Command::Show { id, retries } => show(api, &settings, OrphanageId(id), retries).await,
        Command::Register {
            latitude,
            longitude,
            name,
            about,
            instructions,
            opening_hours,
            open_on_weekends,
            images,
        } => {
            let position = GeoPosition::new(latitude, longitude)?;
            let form = FormInput {
                name,
                about,
                instructions,
                opening_hours,
                open_on_weekends,
            };
            register(api, events, position, form, images).await
        }
    }
}

async fn list(api: Arc<HttpOrphanageApi>, events: broadcast::Sender<Notification>) -> Result<()> {
    let listing = ListingLoader::new(api, events);
    listing.reload().await?;
    let orphanages = listing.orphanages().await;
    for orphanage in &orphanages {
        println!(
            "#{:<4} {:<32} ({}, {})",
            orphanage.id, orphanage.name, orphanage.latitude, orphanage.longitude
        );
    }
    println!("{} orphanages found", orphanages.len());
    Ok(())
}

async fn show(
    api: Arc<HttpOrphanageApi>,
    settings: &ClientSettings,
    id: OrphanageId,
    retries: u32,
) -> Result<()> {
    let loader = DetailLoader::new(api, settings.detail_timeout());
    let mut state = loader.load(id).await;
    for attempt in 1..=retries {
        if !matches!(state, DetailState::Failed(_)) {
            break;
        }
        tracing::info!(attempt, "retrying orphanage detail");
        state = loader.retry().await.unwrap_or(state);
    }

    match state {
        DetailState::Loaded(detail) => {
            println!("{}", detail.name);
            println!("{}", detail.about);
            println!();
            println!("Visiting instructions: {}", detail.instructions);
            println!("Week days: {}", detail.opening_hours);
            println!(
                "{}",
                if detail.open_on_weekends {
                    "Open on weekends"
                } else {
                    "Closed on weekends"
                }
            );
            for image in &detail.images {
                println!("photo: {}", image.url);
            }
            if let Some(position) = detail.summary().position() {
                println!("directions: {}", directions_url(position)?);
            }
            Ok(())
        }
        DetailState::Failed(err) => Err(anyhow!("could not load orphanage {id}: {err}")),
        DetailState::Loading => Err(anyhow!("orphanage {id} is still loading")),
    }
}

struct FormInput {
    name: String,
    about: String,
    instructions: String,
    opening_hours: String,
    open_on_weekends: bool,
}

async fn register(
    api: Arc<HttpOrphanageApi>,
    events: broadcast::Sender<Notification>,
    position: GeoPosition,
    input: FormInput,
    images: Vec<PathBuf>,
) -> Result<()> {
    let navigator = Arc::new(TerminalNavigator::default());
    let mut picker = PositionPicker::new(navigator.clone());
    picker.handle_map_press(position);
    picker.choose_position();
    let session = navigator
        .take_wizard_session()
        .ok_or_else(|| anyhow!("position was not handed to the data screen"))?;

    let media = Arc::new(FileQueuePicker::new(images));
    let wizard = RegistrationWizard::mount(
        session,
        api.clone(),
        media.clone(),
        navigator.clone(),
        events.clone(),
    );
    let mut notifications = wizard.subscribe_events();

    wizard
        .edit_form(|form| {
            form.set_name(input.name);
            form.set_about(input.about);
            form.set_instructions(input.instructions);
            form.set_opening_hours(input.opening_hours);
            form.set_open_on_weekends(input.open_on_weekends);
        })
        .await;
    let remaining = wizard.about_chars_remaining().await;
    if remaining < 0 {
        eprintln!("note: about is {} characters over the advised limit", -remaining);
    }

    while media.remaining() > 0 {
        match wizard.add_image().await {
            AddImageOutcome::Added(image) => tracing::debug!(%image, "image attached"),
            AddImageOutcome::Duplicate(image) => eprintln!("skipping duplicate image {image}"),
            AddImageOutcome::Cancelled => break,
            AddImageOutcome::PermissionDenied | AddImageOutcome::Failed => {}
        }
    }

    let result = wizard.submit().await;
    while let Ok(notification) = notifications.try_recv() {
        println!("{}", notification.message());
    }
    if let Err(err) = result {
        if err.is_remote() {
            return Err(anyhow!("the backend did not register the orphanage: {err}"));
        }
        return Err(anyhow!("the orphanage was not sent: {err}"));
    }

    let listing = ListingLoader::new(api, events);
    let count = listing.reload().await?;
    println!("{count} orphanages found");
    Ok(())
}
