use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use inputmap::action::{Action, ControlType};
use inputmap::binding::{CompositeBinding, Control, SingleBinding};
use inputmap::config::InputConfig;
use inputmap::console::{self, HostTargets};
use inputmap::device::{GamepadDevice, GyroscopeDevice, KeyboardDevice, PointerDevice};
use inputmap::manager::{self, Manager};
use inputmap::processor::Processor;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = setup().await?;
    let targets = HostTargets::default();
    let token = CancellationToken::new();

    {
        let mut manager = manager::global().lock();
        register_devices(&mut manager, &config, &targets)?;
        for action in demo_actions() {
            manager.add_action(action);
        }
    }

    #[cfg(feature = "gamepad")]
    let collector = inputmap::device::gamepad_collector::spawn(
        config.gamepad.clone(),
        targets.gamepad.clone(),
        token.child_token(),
    );

    info!("Reading host events from stdin (down KeyW, up KeyW, move 3 -1, blur, ...)");
    let result = run(&config, &targets).await;

    token.cancel();
    #[cfg(feature = "gamepad")]
    match collector.await {
        Ok(Ok(())) => debug!("Gamepad collector stopped"),
        Ok(Err(e)) => warn!("Gamepad collector failed: {}", e),
        Err(e) => tracing::error!(
            "{}",
            inputmap::device::gamepad_collector::CollectorError::TaskError(e.to_string())
        ),
    }

    manager::global().lock().unregister_all_devices();
    result
}

async fn setup() -> Result<InputConfig> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let config = InputConfig::ensure_default_config(&InputConfig::default_path()).await?;
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or_else(|| config.tracing_level());
    setup_logging_env(level);
    info!("Loaded config: {:?}", config);
    Ok(config)
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

fn register_devices(
    manager: &mut Manager,
    config: &InputConfig,
    targets: &HostTargets,
) -> Result<()> {
    manager.register_device(KeyboardDevice::with_settings(
        targets.keyboard.clone(),
        config.keyboard.clone(),
    ))?;
    manager.register_device(PointerDevice::with_settings(
        targets.pointer.clone(),
        config.pointer.clone(),
    ))?;
    manager.register_device(GamepadDevice::new(targets.gamepad.clone()))?;
    manager.register_device(GyroscopeDevice::new(targets.motion.clone()))?;

    Ok(())
}

fn keys(codes: &[&str]) -> Vec<Control> {
    codes.iter().map(|code| Control::keyboard(*code)).collect()
}

fn demo_actions() -> Vec<Action> {
    vec![
        Action::new("move", ControlType::Vector2)
            .with_binding(CompositeBinding::axis_2d(
                keys(&["KeyA", "ArrowLeft"]),
                keys(&["KeyD", "ArrowRight"]),
                keys(&["KeyW", "ArrowUp"]),
                keys(&["KeyS", "ArrowDown"]),
            ))
            .with_binding(CompositeBinding::axis_2d(
                vec![],
                vec![Control::gamepad("LeftStickX")],
                vec![Control::gamepad("LeftStickY")],
                vec![],
            ))
            .with_processor(Processor::NormalizeVector),
        Action::new("jump", ControlType::Discrete)
            .with_binding(Control::keyboard("Space"))
            .with_binding(Control::gamepad("South")),
        Action::new("look", ControlType::Vector2).with_binding(
            SingleBinding::new(Control::pointer("Mouse")).with_processor(Processor::Scale(0.1)),
        ),
        Action::new("throttle", ControlType::Axis)
            .with_binding(CompositeBinding::axis_1d(keys(&["KeyE"]), keys(&["KeyQ"])))
            .with_binding(Control::pointer("Touch0"))
            .with_processor(Processor::Clamp { min: -1.0, max: 1.0 }),
    ]
}

async fn run(config: &InputConfig, targets: &HostTargets) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(config.tick_interval_ms.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Ctrl-C received, shutting down");
                return Ok(());
            }
            line = lines.next_line() => {
                match line.map_err(|e| eyre!("Failed to read stdin: {}", e))? {
                    Some(line) => match console::parse_line(&line) {
                        Ok(Some(event)) => targets.deliver(&event),
                        Ok(None) => {}
                        Err(e) => warn!("Ignoring line '{}': {}", line, e),
                    },
                    None => {
                        info!("stdin closed, shutting down");
                        return Ok(());
                    }
                }
            }
            _ = ticker.tick() => tick(),
        }
    }
}

fn tick() {
    let mut manager = manager::global().lock();
    manager.update();

    for action in manager.actions() {
        if action.just_pressed() {
            info!("{} -> {:?}", action.name(), action.value());
        } else if action.just_released() {
            info!("{} released", action.name());
        } else if action.value().as_bool() {
            debug!("{} = {:?}", action.name(), action.value());
        }
    }
}
