use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arcapture::capture::coordinator::CaptureCoordinator;
use arcapture::capture::thumbnail::thumbnail_payload;
use arcapture::config::ConfigStore;
use arcapture::session::simulated::SimulatedSession;
use arcapture::session::types::InterfaceOrientation;

/// Demo: run a few high-resolution captures against the simulated session,
/// write the decoded frames to disk, and print diagnostics.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(ConfigStore::new(PathBuf::from("arcapture.json")));
    store.start_debounce_task();
    let config = store.get();

    let session = Arc::new(
        SimulatedSession::new()
            .with_resolution(config.simulated.width, config.simulated.height)
            .with_orientation(config.simulated.orientation)
            .with_depth(config.depth_enabled),
    );
    let coordinator = CaptureCoordinator::new(Arc::clone(&session));
    let mut receiver = coordinator.subscribe();

    for seq in 1..=3u32 {
        if seq == 3 {
            // Third capture runs in portrait to exercise depth alignment.
            session.set_orientation(InterfaceOrientation::Portrait);
        }

        coordinator.request_capture()?;
        tokio::time::timeout(Duration::from_secs(5), receiver.changed()).await??;

        let result = receiver
            .borrow_and_update()
            .clone()
            .ok_or("capture completed without a publication")?;

        let color_path = format!("capture-{seq}.png");
        result.color.save(&color_path)?;
        tracing::info!("Capture {seq}: {} -> {color_path}", result.resolution_text());

        if let Some(depth) = &result.depth {
            let depth_path = format!("capture-{seq}-depth.png");
            depth.save(&depth_path)?;
            tracing::info!(
                "  depth {}x{} -> {depth_path}",
                depth.width(),
                depth.height()
            );
        }

        let thumbnail = thumbnail_payload(&result.color, config.thumbnail_max_edge);
        tracing::info!(
            "  thumbnail {}x{} ({} base64 bytes)",
            thumbnail.width,
            thumbnail.height,
            thumbnail.data.len()
        );
    }

    let snapshot = coordinator.diagnostics();
    tracing::info!("Diagnostics: {}", serde_json::to_string_pretty(&snapshot)?);

    store.save()?;
    Ok(())
}
