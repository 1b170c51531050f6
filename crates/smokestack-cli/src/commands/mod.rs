mod doctor;
mod init;
mod reap;
mod smoke;

use std::path::Path;
use std::process::ExitCode;

use smokestack_core::SmokestackConfig;
use smokestack_engine::ReapError;

pub use doctor::doctor;
pub use init::init;
pub use reap::reap;
pub use smoke::smoke;

/// Load `smokestack.toml` from the working directory, apply the `--engine`
/// override, and validate the result.
pub(crate) fn load_config(engine: Option<&str>) -> anyhow::Result<SmokestackConfig> {
    let mut config = SmokestackConfig::load(Path::new("."))?;
    if let Some(program) = engine {
        config.engine.program = program.to_owned();
    }
    config.validate()?;
    Ok(config)
}

/// Process exit code for a failed command.
///
/// A container that could not be stopped exits with the engine's own status
/// so callers such as make see the original failure; everything else is 1.
pub(crate) fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ReapError>().and_then(ReapError::exit_code) {
        Some(code @ 1..=255) => ExitCode::from(code as u8),
        _ => ExitCode::FAILURE,
    }
}
