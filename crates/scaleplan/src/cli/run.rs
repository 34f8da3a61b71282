//! `run` command handler: the workflow in a terminal.

use super::RunArgs;
use anyhow::{Context, bail};
use scaleplan::{
    ProjectBrief, ReviewDecision, Settings, Stage, WorkflowSession, build_handlers,
    load_screenshot, write_deliverables,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Runs one brand through extraction, review and the final deliverables.
pub async fn run_wizard(settings: &Settings, args: RunArgs) -> anyhow::Result<()> {
    let images = args
        .images
        .iter()
        .map(load_screenshot)
        .collect::<Result<Vec<_>, _>>()?;
    let brief = ProjectBrief::new(&args.brand, &args.category, args.competitor.clone(), images)?;

    let handlers = build_handlers(settings).context("Failed to create completion client")?;
    let (mut session, mut stage_rx) = WorkflowSession::new(Arc::new(handlers));

    let progress = tokio::spawn(async move {
        while stage_rx.changed().await.is_ok() {
            let stage = *stage_rx.borrow_and_update();
            if stage.is_working() {
                eprintln!("... {}", stage);
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stage = session.start(brief).await?;

    loop {
        match stage {
            Stage::AwaitingApproval => {
                print_plan(session.state().plan_text().as_deref());
                if args.auto_approve {
                    stage = session.approve().await?;
                    continue;
                }
                prompt("Press Enter to approve, type feedback to revise, or q to quit: ")?;
                let line = stdin.next_line().await?.unwrap_or_default();
                stage = match ReviewDecision::parse(&line) {
                    ReviewDecision::Approve => session.approve().await?,
                    ReviewDecision::Changes(feedback) => session.request_changes(&feedback).await?,
                    ReviewDecision::Quit => break,
                };
            }
            Stage::Failed => {
                let message = session
                    .state()
                    .failure()
                    .as_ref()
                    .map(|f| f.message().clone())
                    .unwrap_or_default();
                warn!(message = %message, "Stage failed");
                eprintln!("Failed: {}", message);
                prompt("Retry? [Y/n]: ")?;
                let line = stdin.next_line().await?.unwrap_or_default();
                if line.trim().eq_ignore_ascii_case("n") {
                    break;
                }
                stage = session.retry().await?;
            }
            Stage::Complete => break,
            other => bail!("Workflow stopped unexpectedly at {}", other),
        }
    }

    progress.abort();
    let written = write_deliverables(session.state(), &args.out)
        .with_context(|| format!("Failed to write to {}", args.out.display()))?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    info!(stage = %session.stage(), files = written.len(), "Run finished");
    Ok(())
}

fn print_plan(plan: Option<&str>) {
    println!("\n{}\n", plan.unwrap_or("(no plan)"));
}

fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}
