use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use hearth_lib::game::launcher::validate_username;
use hearth_lib::game::{
    ChannelProgressReporter, DetachedSpawner, HostJava, LaunchOptions, LaunchPlanner,
    PlatformDescriptor, ProcessSpawner, ProgressEvent, ResolutionEngine,
};
use hearth_lib::HearthConfig;

/// Usage: launch [version] [username] [--spawn]
///
/// Resolves the version (latest release by default), prints the launch command
/// and starts the game when `--spawn` is given. `HEARTH_CONFIG` points at an
/// optional JSON config file.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let spawn = args.iter().any(|a| a == "--spawn");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let config = match std::env::var_os("HEARTH_CONFIG") {
        Some(path) => HearthConfig::load(&PathBuf::from(path))?,
        None => HearthConfig::default(),
    };
    let platform = PlatformDescriptor::current();
    let engine = ResolutionEngine::from_config(&config, platform.clone())?;

    let index = engine.manifest().fetch_index().await?;
    let version = match positional.first() {
        Some(v) => v.to_string(),
        None => index.latest_release().to_string(),
    };
    let username = validate_username(positional.get(1).map(|s| s.as_str()).unwrap_or(""));

    let (reporter, mut events) = ChannelProgressReporter::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ProgressEvent::StepStarted { name, .. } => println!("[STEP] {}", name),
                ProgressEvent::StepCount { current, total } => {
                    println!("[COUNT] {}/{}", current, total.unwrap_or(0))
                }
                ProgressEvent::Message(message) => println!("[MSG] {}", message),
                ProgressEvent::Done { success, message } => {
                    println!("[DONE] success={} message={:?}", success, message)
                }
            }
        }
    });

    let resolved = engine.resolve_in(&index, &version, &reporter).await;
    drop(reporter);
    printer.await?;
    resolved.with_context(|| format!("Failed to resolve {}", version))?;

    let planner = LaunchPlanner::from_config(&config, platform, Arc::new(HostJava::detect()));
    let plan = planner
        .plan_version(&version, &LaunchOptions::new(username, config.default_memory_gb))
        .await?;

    println!("{}", plan);

    if spawn {
        let pid = DetachedSpawner.spawn(&plan)?;
        println!("Started {} with PID {}", version, pid);
    }

    Ok(())
}
