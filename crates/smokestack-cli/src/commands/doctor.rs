use std::fmt;
use std::path::Path;

use smokestack_core::{CONFIG_FILE_NAME, SmokestackConfig};
use smokestack_engine::EngineClient;

#[derive(Debug, Clone)]
struct CheckResult {
    passed: bool,
    detail: String,
}

impl CheckResult {
    fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

#[derive(Debug, Default)]
struct DoctorReport {
    checks: Vec<(&'static str, CheckResult)>,
}

impl DoctorReport {
    fn push(&mut self, label: &'static str, result: CheckResult) {
        self.checks.push((label, result));
    }

    fn all_passed(&self) -> bool {
        self.checks.iter().all(|(_, r)| r.passed)
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "smokestack doctor")?;
        for (label, result) in &self.checks {
            writeln!(f, "  [{}] {label:<14} {}", result.icon(), result.detail)?;
        }
        Ok(())
    }
}

/// Report on config and container engine without stopping at the first problem.
pub async fn doctor(engine: Option<&str>) -> anyhow::Result<()> {
    let mut report = DoctorReport::default();

    if Path::new(CONFIG_FILE_NAME).exists() {
        report.push("Config file", CheckResult::ok(CONFIG_FILE_NAME));
    } else {
        report.push("Config file", CheckResult::ok("not found, using defaults"));
    }

    let program = match SmokestackConfig::load(Path::new(".")) {
        Ok(mut config) => {
            if let Some(program) = engine {
                config.engine.program = program.to_owned();
            }
            match config.validate() {
                Ok(()) => report.push("Config values", CheckResult::ok("valid")),
                Err(e) => report.push("Config values", CheckResult::fail(&e.to_string())),
            }
            config.engine.program
        }
        Err(e) => {
            report.push(
                "Config values",
                CheckResult::fail(&format!("{:#}", anyhow::Error::from(e))),
            );
            engine.unwrap_or("docker").to_owned()
        }
    };

    let client = EngineClient::new(&program);
    match client.version().await {
        Ok(version) => report.push("Engine", CheckResult::ok(&format!("{program} {version}"))),
        Err(e) => report.push("Engine", CheckResult::fail(&e.to_string())),
    }

    println!("{report}");

    if !report.all_passed() {
        anyhow::bail!("some checks failed — see above for details");
    }

    Ok(())
}
