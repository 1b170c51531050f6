use std::path::Path;

use smokestack_core::CONFIG_FILE_NAME;

const TEMPLATE: &str = r#"[engine]
# program = "docker"

[smoke]
# container_name = "smk"
# host_port = 8080
# container_port = 8080
# readiness = "poll"        # or "fixed"
# warmup_secs = 5
# poll_interval_ms = 250
# url = "http://localhost:8080/"   # port must match host_port
# host_header = "localhost"
# request_timeout_secs = 10

[reap]
# strict_remove = false
"#;

/// Write a commented config file with every default spelled out.
pub fn init() -> anyhow::Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists — edit it directly");
    }

    std::fs::write(path, TEMPLATE)?;
    println!("Created {CONFIG_FILE_NAME}");
    Ok(())
}
