//! Subcommand implementations

use crate::config::SoundboardConfig;
use crate::database::open_database;
use crate::input::{InputCommand, HELP};
use crate::view::TerminalView;
use anyhow::Context;
use mlc_audio_desktop::DesktopAudioBackend;
use mlc_client::ManifestClient;
use mlc_core::{KeyValueStore, SoundCatalog, SOUND_MAP_KEY};
use mlc_offline::{router, HttpNetwork, OfflineWorker};
use mlc_playback::{ControllerServices, SoundboardController};
use mlc_storage::{SqliteCacheStorage, SqliteKeyValueStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

/// Interactive soundboard on the default output device
pub async fn play(config: &SoundboardConfig) -> anyhow::Result<()> {
    let pool = open_database(&config.storage.database_url).await?;
    let store = Arc::new(SqliteKeyValueStore::new(pool));

    let client = Arc::new(
        ManifestClient::new(config.blob_store()).context("Invalid manifest settings")?,
    );

    let (events, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
    let audio = DesktopAudioBackend::new(Arc::clone(&client), events)
        .context("Failed to open audio output")?;
    let layout = audio.layout();
    tracing::info!(
        channels = layout.channels,
        sample_rate = layout.sample_rate,
        "Audio output ready"
    );

    let services = ControllerServices {
        store,
        source: client,
        audio: Arc::new(audio),
    };
    let mut controller = SoundboardController::new(services, Box::new(TerminalView::stdout()));

    if let Err(e) = controller.load_from_cache().await {
        tracing::warn!(error = %e, "Starting without a catalog");
    }
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match line.parse::<InputCommand>() {
                    Ok(InputCommand::Toggle(position)) => {
                        toggle_position(&mut controller, position).await;
                    }
                    Ok(InputCommand::Stop) => {
                        controller.stop();
                    }
                    Ok(InputCommand::Resync) => {
                        if let Err(e) = controller.sync().await {
                            tracing::warn!(error = %e, "Resync failed");
                        }
                    }
                    Ok(InputCommand::Quit) => break,
                    Ok(InputCommand::Help) => println!("{}", HELP),
                    Err(e) => println!("{}. {}", e, HELP),
                }
            }
            Some(event) = events_rx.recv() => {
                controller.handle_audio_event(event);
            }
        }
    }

    controller.stop();
    tracing::info!("Soundboard closed");
    Ok(())
}

async fn toggle_position(controller: &mut SoundboardController, position: usize) {
    let row = position
        .checked_sub(1)
        .and_then(|index| controller.rows().get(index))
        .map(|row| row.handle);
    let Some(row) = row else {
        println!("No sound at position {}", position);
        return;
    };

    match controller.toggle_row(row).await {
        Ok(outcome) => tracing::debug!(position, outcome = ?outcome, "Toggled"),
        // already reported through the view
        Err(e) => tracing::debug!(error = %e, "Toggle failed"),
    }
}

/// Fetch the manifest once and store it as the snapshot
pub async fn sync(config: &SoundboardConfig) -> anyhow::Result<()> {
    let pool = open_database(&config.storage.database_url).await?;
    let store = SqliteKeyValueStore::new(pool);
    let client = ManifestClient::new(config.blob_store()).context("Invalid manifest settings")?;

    let manifest = client
        .get_manifest()
        .await
        .with_context(|| format!("Failed to fetch {}", client.manifest_url()))?;
    store
        .set(SOUND_MAP_KEY, &manifest.body)
        .await
        .context("Failed to store manifest")?;

    let catalog = SoundCatalog::from_unsorted(manifest.sounds);
    println!("Synced {} sounds from {}", catalog.len(), client.manifest_url());
    print_catalog(&catalog);
    Ok(())
}

/// Print the stored snapshot without touching the network
pub async fn list(config: &SoundboardConfig) -> anyhow::Result<()> {
    let pool = open_database(&config.storage.database_url).await?;
    let store = SqliteKeyValueStore::new(pool);

    let Some(body) = store
        .get(SOUND_MAP_KEY)
        .await
        .context("Failed to read stored manifest")?
    else {
        println!("No sounds stored yet. Run `soundboard sync` first.");
        return Ok(());
    };

    let catalog =
        SoundCatalog::from_manifest_body(&body).context("Stored manifest is not readable")?;
    print_catalog(&catalog);
    Ok(())
}

fn print_catalog(catalog: &SoundCatalog) {
    for (index, sound) in catalog.iter().enumerate() {
        match sound.attribution() {
            Some(by) => println!("{:>3}. {} (by {}) [{}]", index + 1, sound.name, by, sound.path),
            None => println!("{:>3}. {} [{}]", index + 1, sound.name, sound.path),
        }
    }
}

/// Serve the shell through the offline worker until ctrl-c
pub async fn serve_shell(config: &SoundboardConfig) -> anyhow::Result<()> {
    let worker_config = config.worker()?;
    let upstream = Url::parse(&config.shell.upstream).context("Invalid shell.upstream")?;

    let pool = open_database(&config.storage.database_url).await?;
    let cache = Arc::new(SqliteCacheStorage::new(pool));
    let network = HttpNetwork::new(worker_config.origin.clone(), upstream)
        .context("Failed to build shell HTTP client")?;

    let worker = Arc::new(OfflineWorker::new(worker_config, cache, Arc::new(network)));
    let state = worker
        .start()
        .await
        .context("Failed to install the shell")?;
    tracing::info!(
        version = %worker.config().cache_version,
        state = ?state,
        "Offline worker started"
    );

    let listener = tokio::net::TcpListener::bind(&config.shell.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.shell.listen))?;
    tracing::info!("Shell listening on {}", config.shell.listen);

    axum::serve(listener, router(worker))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shell server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
    }
}
