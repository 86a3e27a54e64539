//! Tripwire Runtime
//!
//! Boots logging and a reference world, lists what the factories can build
//! and spawns the triggers listed in the settings file.
//!
//! Usage: `tripwire [settings.json]`

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tripwire_actor::{ActorDispatcher, TriggerFactory};
use tripwire_core::SpawnContext;
use tripwire_services::Settings;

const DEFAULT_SETTINGS_PATH: &str = "tripwire.json";

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = Settings::load_or_default(&path)?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.filter))
        .context("invalid logging filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Tripwire v{}", tripwire_core::VERSION);

    let factory = TriggerFactory::new();
    let mut world = tripwire_services::init_world(&settings.world);
    factory
        .register_classes(&mut world)
        .context("registering trigger classes")?;

    let mut dispatcher = ActorDispatcher::new();
    dispatcher
        .bind(factory)
        .context("binding trigger factory")?;

    for definition in dispatcher.definitions() {
        let attributes: Vec<String> = definition
            .attributes
            .iter()
            .map(|a| format!("{}:{}={}", a.name, a.kind, a.default))
            .collect();
        tracing::info!(id = %definition.id, tags = %definition.tags, "definition [{}]", attributes.join(", "));
    }

    let mut spawned = 0;
    for request in &settings.spawns {
        let description = match dispatcher.describe(&request.definition, request.attributes.clone()) {
            Ok(description) => description,
            Err(err) => {
                tracing::error!(definition = %request.definition, "skipping spawn: {err}");
                continue;
            }
        };
        let result = dispatcher.spawn(
            &mut SpawnContext::new(&mut world),
            &request.placement,
            &description,
        );
        if result.is_success() {
            spawned += 1;
        }
    }

    for handle in world.live_handles() {
        if let Some(trigger) = world.trigger(handle) {
            tracing::info!(
                %handle,
                role = trigger.role_name(),
                friction = trigger.friction(),
                extent = ?trigger.extent(),
                "trigger live"
            );
        }
    }

    tracing::info!(
        spawned,
        requested = settings.spawns.len(),
        live = world.live_count(),
        "startup spawns finished"
    );
    Ok(())
}
