//=========================================================================
// Flappy Shell — Binary Entry
//
// Opens the game window, runs the shell until Escape or window close,
// and maps the outcome to the process exit status.
//
// Driver selection: `FLAPPY_DRIVER=native|hosted` (default: native).
//
//=========================================================================

use std::process::ExitCode;

use flappy_shell::core::input::DefaultHandlers;
use flappy_shell::driver::{launch, run_hosted, run_native, DriveError, DriverKind, LaunchOutcome};
use flappy_shell::logging::{init_logging, LoggingConfig};
use flappy_shell::platform::WinitPlatform;
use flappy_shell::ShellBuilder;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let driver = DriverKind::from_env();
    log::info!(target: "shell", "Starting with {} driver", driver);

    let mut shell = ShellBuilder::new()
        .with_title("Flappy Bird Clone")
        .with_size(1136, 640)
        .build(WinitPlatform::new(), DefaultHandlers);

    let outcome = launch(&mut shell, |shell| match driver {
        DriverKind::Native => Ok(run_native(shell)),
        DriverKind::Hosted => {
            let host = shell
                .platform_mut()
                .detach_host()
                .ok_or(DriveError::HostUnavailable)?;
            run_hosted(shell, host)
        }
    });

    if let LaunchOutcome::InitFailed(e) = &outcome {
        eprintln!("Error initializing game: {}", e);
    }

    ExitCode::from(outcome.exit_code())
}
