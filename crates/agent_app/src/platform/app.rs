use agent_core::TransitionPolicy;
use agent_engine::{
    AgentClient, AgentSettings, InvocationError, Invoker, ProgressTracker, SseEventSource,
};
use agent_logging::{agent_info, agent_warn, level_for_verbosity};
use clap::Parser;
use colored::*;

use super::cli::{Cli, Command};
use super::logging;
use super::ui::render::ProgressRenderer;

pub async fn run_app() -> anyhow::Result<()> {
    // A missing .env file is fine; the variable may come from the environment.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logging::initialize(cli.log.into(), level_for_verbosity(cli.verbose));

    let settings = match cli.api_url.as_deref() {
        Some(url) => AgentSettings::new(url)?,
        None => AgentSettings::from_env()?,
    };
    agent_info!("agent base url {}", settings.base_url);

    match cli.command {
        Command::Health => {
            let client = AgentClient::new(settings)?;
            let health = client.health().await?;
            if health.is_ok() {
                println!("{} Agent is up", "[✓]".green());
            } else {
                println!("{} Agent status: {}", "[!]".yellow(), health.status);
            }
        }
        Command::Run {
            query,
            task_id,
            strict,
            no_follow,
        } => {
            let client = AgentClient::new(settings.clone())?;
            let invocation = match client.invoke(&query).await {
                Ok(invocation) => invocation,
                Err(err) => {
                    report_invocation_error(&err);
                    return Err(err.into());
                }
            };
            println!("{}", serde_json::to_string_pretty(&invocation)?);

            if no_follow {
                return Ok(());
            }
            match task_id.or(invocation.task_id) {
                Some(task_id) => follow(settings, task_id, policy(strict)).await?,
                None => agent_info!("agent returned no task id; nothing to follow"),
            }
        }
        Command::Watch { task_id, strict } => {
            follow(settings, task_id, policy(strict)).await?;
        }
    }

    Ok(())
}

fn policy(strict: bool) -> TransitionPolicy {
    if strict {
        TransitionPolicy::Strict
    } else {
        TransitionPolicy::Permissive
    }
}

fn report_invocation_error(err: &InvocationError) {
    match err {
        InvocationError::Rejected { body, .. } => eprintln!("{} {}", "[✗]".red(), body),
        InvocationError::Unreachable(_) => eprintln!(
            "{} {} (check the agent is running, then try again)",
            "[✗]".red(),
            err
        ),
        other => eprintln!("{} {}", "[✗]".red(), other),
    }
}

/// Renders progress until the task finishes, the stream stops, or Ctrl-C.
async fn follow(
    settings: AgentSettings,
    task_id: String,
    policy: TransitionPolicy,
) -> anyhow::Result<()> {
    let source = SseEventSource::new(settings)?;
    let tracker = ProgressTracker::attach(&source, task_id, policy);
    // Register before the first snapshot so no later change is missed.
    let mut updates = tracker.updates();
    let mut renderer = ProgressRenderer::new();
    let mut view = tracker.view();

    loop {
        for line in renderer.render(&view) {
            println!("{}", line);
        }
        if !view.is_live() {
            break;
        }
        if view.stage.is_terminal() {
            // Finish is only a convention on the wire; stop listening here.
            tracker.dispose();
            println!("{} Task finished", "[✓]".green());
            break;
        }

        tokio::select! {
            next = updates.recv() => match next {
                Some(next) => view = next,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                agent_warn!("interrupted; disposing tracker for task {}", tracker.task_id());
                tracker.dispose();
            }
        }
    }

    tracker.dispose();
    Ok(())
}
