use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

use grid::{HealthPolicy, HealthStatus, HttpTransport, WorkerProxy, format_elapsed};
use grid_protocol::CommandParameters;

use crate::cli::{Command, WorkerArgs};

pub async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Probe {
            worker,
            attempts,
            delay_ms,
        } => probe(&worker, attempts, delay_ms).await,
        Command::Forward { worker, fields } => forward(&worker, &fields).await,
        Command::Terminate { worker, session } => terminate(&worker, &session).await,
    }
}

fn build_proxy(args: &WorkerArgs) -> Result<WorkerProxy> {
    let transport = HttpTransport::with_timeout(Duration::from_secs(args.timeout))
        .context("failed to build HTTP transport")?;
    let proxy = WorkerProxy::new(
        args.host.as_str(),
        args.port,
        args.environment.as_str(),
        Arc::new(transport),
    )?;
    Ok(proxy)
}

async fn probe(worker: &WorkerArgs, attempts: u32, delay_ms: u64) -> Result<()> {
    let proxy = build_proxy(worker)?;
    let policy = HealthPolicy::new(attempts, Duration::from_millis(delay_ms));

    info!(
        target = "grid",
        proxy = %proxy,
        attempts = policy.attempts(),
        "checking worker health"
    );

    match policy.check(&proxy).await {
        HealthStatus::Healthy { status } => {
            println!(
                "{} ({}) healthy: status {status}",
                proxy,
                proxy.resolved_host().await
            );
            Ok(())
        }
        HealthStatus::Unresponsive { status } => {
            bail!("{proxy} unresponsive after {} attempts: status {status}", policy.attempts())
        }
    }
}

async fn forward(worker: &WorkerArgs, fields: &[String]) -> Result<()> {
    let params = parse_fields(fields)?;
    let proxy = build_proxy(worker)?;

    proxy.acquire_lease()?;
    let result = proxy.forward(&params).await;
    let elapsed = proxy.elapsed_lease_time();
    proxy.release_lease()?;

    let response = result?;
    if let Some(elapsed) = elapsed {
        info!(target = "grid", elapsed = %format_elapsed(elapsed), "command round trip");
    }

    println!("{} {}", response.status, response.body);
    if !response.is_success() {
        bail!("worker answered with status {}", response.status);
    }
    Ok(())
}

async fn terminate(worker: &WorkerArgs, session: &str) -> Result<()> {
    let proxy = build_proxy(worker)?;

    // terminate_session routes through forward, which requires a lease.
    proxy.acquire_lease()?;
    proxy.terminate_session(session).await;
    proxy.release_lease()?;

    println!("termination sent to {proxy} for session {session} (best effort)");
    Ok(())
}

fn parse_fields(fields: &[String]) -> Result<CommandParameters> {
    let mut params = CommandParameters::new();
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("expected FIELD=VALUE, got '{field}'"))?;
        if name.is_empty() {
            bail!("field name cannot be empty in '{field}'");
        }
        params.append(name, value);
    }
    Ok(params)
}
