use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Session;
use crate::config::Settings;
use crate::render::render_plan;

pub async fn run(settings: &Settings, verbose: bool) -> Result<()> {
    let session = Session::open(settings).await?;
    let plan = &session.prepared.plan;

    println!("{}", render_plan(plan, verbose));

    let counts = plan.counts();
    println!(
        "\n{}",
        format!(
            "Would create {}, update {}, skip {} ({} calendar events, {} database rows)",
            counts.create,
            counts.update,
            counts.skip,
            session.loaded.total_events,
            plan.total_remote_rows
        )
        .dimmed()
    );

    Ok(())
}
