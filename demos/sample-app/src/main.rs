mod camera_state;
mod commands;

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use camera_capture_core::{CameraController, ControllerConfiguration, LogicalCamera};
use camera_capture_virtual::{AuthorizationMode, VirtualPlatform};

use camera_state::{CameraState, EventLog};

fn load_configuration() -> Result<ControllerConfiguration, String> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = fs::read_to_string(&path).map_err(|e| format!("{}: {}", path, e))?;
            ControllerConfiguration::from_json(&json).map_err(|e| e.to_string())
        }
        None => Ok(ControllerConfiguration::default()),
    }
}

fn print_events(state: &CameraState) {
    for line in state.events.drain() {
        println!("{}", line);
    }
}

fn run(state: &CameraState) -> Result<(), String> {
    commands::start_preview(state)?;
    print_events(state);

    for camera in [LogicalCamera::Front, LogicalCamera::Back] {
        match commands::switch_camera(state, camera) {
            Ok(camera) => log::info!("Using {} camera", camera),
            Err(e) => log::warn!("{}", e),
        }
        let metadata = commands::take_photo(state)?;
        println!("{}", serde_json::to_string_pretty(&metadata).map_err(|e| e.to_string())?);
    }

    commands::stop_preview(state);
    let diagnostics = commands::get_diagnostics(state);
    print_events(state);
    println!("{}", serde_json::to_string_pretty(&diagnostics).map_err(|e| e.to_string())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let platform = match VirtualPlatform::builder()
        .authorization(AuthorizationMode::Prompt {
            grant: true,
            delay: Duration::from_millis(200),
        })
        .frame_size(640, 480)
        .build()
    {
        Ok(platform) => Arc::new(platform),
        Err(e) => {
            log::error!("Failed to start virtual camera platform: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let events = EventLog::new();
    let Some(controller) = CameraController::builder(platform)
        .configuration(config)
        .observer(events.clone())
        .build()
    else {
        log::error!("No camera available");
        return ExitCode::FAILURE;
    };

    let state = CameraState { controller, events };
    match run(&state) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_events(&state);
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
