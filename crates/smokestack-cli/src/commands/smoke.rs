use smokestack_core::ImageRef;
use smokestack_engine::{EngineClient, Reaper, ReqwestProbe, SmokeTester};
use tokio::signal;

/// Start, probe, and reap one container built from `image`.
pub async fn smoke(image: &str, engine: Option<&str>) -> anyhow::Result<()> {
    let image = ImageRef::parse(image)?;
    let config = super::load_config(engine)?;

    println!("Smoke testing {image}");

    let probe = ReqwestProbe::new(config.smoke.request_timeout())?;
    let reaper = Reaper::new(EngineClient::new(&config.engine.program))
        .with_strict_remove(config.reap.strict_remove);
    let tester = SmokeTester::new(reaper, probe, config.smoke);

    let report = tester.run_until(&image, shutdown_signal()).await?;

    println!("{}", report.body);
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
