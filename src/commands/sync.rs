use anyhow::Result;
use owo_colors::OwoColorize;

use crate::commands::Session;
use crate::config::Settings;
use crate::render::{Render, render_plan, render_summary};

pub async fn run(settings: &Settings, verbose: bool) -> Result<()> {
    let session = Session::open(settings).await?;
    let plan = &session.prepared.plan;

    println!("{}", render_plan(plan, verbose));

    let report = plan
        .apply(
            &session.store,
            &session.prepared.fields,
            session.ctx.now,
            &settings.retry,
        )
        .await;

    println!("{}", render_summary(&report, &session.loaded, plan));

    if !report.is_clean() {
        println!("{}", "Failed writes (will be retried on the next run):".red());
        for failure in &report.failures {
            println!("{}", failure.render());
        }
    }

    Ok(())
}
