use smokestack_engine::{EngineClient, ReapMode, Reaper};

/// Stop and remove each container in turn; absent containers are skipped.
pub async fn reap(ids: &[String], kill: bool, engine: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(engine)?;

    let mode = if kill { ReapMode::Kill } else { ReapMode::Stop };
    let reaper = Reaper::new(EngineClient::new(&config.engine.program))
        .with_mode(mode)
        .with_strict_remove(config.reap.strict_remove);

    let outcomes = reaper.reap_all(ids).await?;
    tracing::debug!(?outcomes, "reap finished");

    Ok(())
}
