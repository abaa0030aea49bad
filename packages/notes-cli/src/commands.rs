//! One-shot subcommands.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use notes_client::{parse_local_datetime, NotesError, SortOrder};
use std::time::Duration;

use crate::context::{AppContext, Saved};
use crate::render;

pub async fn list(ctx: &AppContext, search: Option<&str>, sort: Option<SortOrder>) -> Result<()> {
    ctx.store.refresh().await.context("Failed to fetch notes")?;

    if let Some(query) = search {
        ctx.store.apply_search(query).await?;
    }
    if let Some(order) = sort {
        ctx.store.apply_sort(order).await?;
    }

    render::print_notes(&ctx.store.view().await);
    Ok(())
}

pub async fn add(
    ctx: &AppContext,
    title: &str,
    content: &str,
    remind_at: Option<&str>,
) -> Result<()> {
    let notification_time = match remind_at {
        Some(value) => parse_local_datetime(value)?,
        None => None,
    };

    let past_due = notification_time.filter(|at| is_past_due(*at, Utc::now()));

    ctx.store.set_draft_title(title).await;
    ctx.store.set_draft_content(content).await;
    ctx.store.set_notification_time(notification_time).await;
    submit(ctx).await?;
    ctx.report_saved(Saved::Created);

    match (notification_time, past_due) {
        (Some(_), None) => wait_for_reminders(ctx).await,
        (_, Some(at)) => ctx.warn(&format!(
            "La hora {} ya pasó, no se programó recordatorio",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )),
        (None, None) => {}
    }
    Ok(())
}

/// Reminders at or before `now` are never armed.
fn is_past_due(at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    at <= now
}

pub async fn edit(
    ctx: &AppContext,
    id: &str,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<()> {
    ctx.store.refresh().await.context("Failed to fetch notes")?;
    let Some(note) = ctx.store.get(id).await else {
        bail!("No note with id {}", id);
    };

    ctx.store.begin_edit(&note).await;
    if let Some(title) = title {
        ctx.store.set_draft_title(title).await;
    }
    if let Some(content) = content {
        ctx.store.set_draft_content(content).await;
    }
    submit(ctx).await?;
    ctx.report_saved(Saved::Updated);
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    match ctx.store.remove(id).await {
        Ok(_) => {
            ctx.report_saved(Saved::Deleted);
            Ok(())
        }
        Err(e @ NotesError::Api { .. }) => Err(e).context(format!("Failed to delete note {}", id)),
        Err(e) => Err(e.into()),
    }
}

/// Submit the draft, reporting validation problems without the error chain.
pub async fn submit(ctx: &AppContext) -> Result<()> {
    match ctx.store.submit().await {
        Ok(_) => Ok(()),
        Err(NotesError::Validation(msg)) => bail!("{}", msg),
        Err(e) => Err(e).context("Failed to save note"),
    }
}

/// Keep the process alive until every pending reminder has fired.
/// Ctrl+C cancels them.
async fn wait_for_reminders(ctx: &AppContext) {
    if let Some(next) = ctx.store.pending_reminders().await.first() {
        ctx.hint(&format!(
            "⏰ Recordatorio para {}. Ctrl+C para cancelar.",
            next.fire_at().with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ));
    }

    let wait = async {
        while !ctx.store.pending_reminders().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    };

    tokio::select! {
        _ = wait => {}
        _ = tokio::signal::ctrl_c() => {
            ctx.store.reminders().cancel_all().await;
            ctx.warn("Recordatorio cancelado");
        }
    }
}
