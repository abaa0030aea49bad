//! Interactive session: a menu loop over the note store.

use anyhow::Result;
use dialoguer::{Input, Select};
use notes_client::{parse_local_datetime, SortOrder};

use crate::commands;
use crate::context::{AppContext, Saved};
use crate::render;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum MenuAction {
    Create,
    Edit,
    Delete,
    Search,
    Sort,
    Refresh,
    Exit,
}

impl MenuAction {
    fn label(&self) -> &'static str {
        match self {
            MenuAction::Create => "📝 Crear una nota",
            MenuAction::Edit => "✏️  Editar nota",
            MenuAction::Delete => "🗑  Eliminar nota",
            MenuAction::Search => "🔍 Buscar por título",
            MenuAction::Sort => "↕️  Ordenar",
            MenuAction::Refresh => "🔄 Actualizar",
            MenuAction::Exit => "🚪 Salir",
        }
    }
}

/// Menu entries, without the ones whose feature is switched off.
fn menu_actions(enable_search: bool, enable_sort: bool) -> Vec<MenuAction> {
    let mut actions = vec![MenuAction::Create, MenuAction::Edit, MenuAction::Delete];
    if enable_search {
        actions.push(MenuAction::Search);
    }
    if enable_sort {
        actions.push(MenuAction::Sort);
    }
    actions.extend([MenuAction::Refresh, MenuAction::Exit]);
    actions
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    if let Err(e) = ctx.store.refresh().await {
        ctx.warn(&format!("No se pudieron cargar las notas: {}", e));
    }

    let config = ctx.store.config();
    let actions = menu_actions(config.enable_search, config.enable_sort);
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

    loop {
        print_view(ctx).await;

        let selection = Select::with_theme(&ctx.theme())
            .with_prompt("¿Qué quieres hacer?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result = match actions[selection] {
            MenuAction::Create => create(ctx).await,
            MenuAction::Edit => edit(ctx).await,
            MenuAction::Delete => delete(ctx).await,
            MenuAction::Search => search(ctx).await,
            MenuAction::Sort => sort(ctx).await,
            MenuAction::Refresh => ctx.store.refresh().await.map(|_| ()).map_err(Into::into),
            MenuAction::Exit => break,
        };

        if let Err(e) = result {
            ctx.report_error(&e);
        }
    }

    let pending = ctx.store.pending_reminders().await;
    if !pending.is_empty() && !ctx.confirm_exit(pending.len())? {
        ctx.hint("Esperando recordatorios... Ctrl+C para salir.");
        tokio::signal::ctrl_c().await?;
    }
    ctx.store.reminders().cancel_all().await;
    ctx.hint("👋 ¡Hasta luego!");
    Ok(())
}

async fn print_view(ctx: &AppContext) {
    let config = ctx.store.config();
    let view = ctx.store.view().await;
    ctx.print_banner(view.len(), ctx.store.notes().await.len());
    if config.enable_search {
        let query = ctx.store.search_query().await;
        if !query.is_empty() {
            ctx.hint(&format!("Buscando: {}", query));
        }
    }
    if config.enable_sort {
        ctx.hint(&render::sort_label(ctx.store.sort_order().await));
    }
    render::print_notes(&view);
}

async fn create(ctx: &AppContext) -> Result<()> {
    ctx.store.reset_draft().await;
    prompt_draft(ctx, "", "").await?;

    let when: String = Input::with_theme(&ctx.theme())
        .with_prompt("Programar notificación (YYYY-MM-DDTHH:MM, vacío para ninguna)")
        .allow_empty(true)
        .interact_text()?;
    ctx.store
        .set_notification_time(parse_local_datetime(&when)?)
        .await;

    commands::submit(ctx).await?;
    ctx.report_saved(Saved::Created);
    Ok(())
}

async fn edit(ctx: &AppContext) -> Result<()> {
    let Some(note) = pick_note(ctx, "Editar").await? else {
        return Ok(());
    };
    ctx.store.begin_edit(&note).await;
    let draft = ctx.store.draft().await;
    prompt_draft(ctx, &draft.title, &draft.content).await?;

    if let Err(e) = commands::submit(ctx).await {
        ctx.store.reset_draft().await;
        return Err(e);
    }
    ctx.report_saved(Saved::Updated);
    Ok(())
}

async fn delete(ctx: &AppContext) -> Result<()> {
    let Some(note) = pick_note(ctx, "Eliminar").await? else {
        return Ok(());
    };
    if !ctx.confirm_delete(&note)? {
        return Ok(());
    }
    commands::delete(ctx, &note.id).await
}

async fn search(ctx: &AppContext) -> Result<()> {
    let query: String = Input::with_theme(&ctx.theme())
        .with_prompt("Buscar por título")
        .with_initial_text(ctx.store.search_query().await)
        .allow_empty(true)
        .interact_text()?;
    ctx.store.apply_search(&query).await?;
    Ok(())
}

async fn sort(ctx: &AppContext) -> Result<()> {
    let orders = SortOrder::variants();
    let labels: Vec<&str> = orders.iter().map(|o| o.label()).collect();
    let current = ctx.store.sort_order().await;
    let selection = Select::with_theme(&ctx.theme())
        .with_prompt("Ordenar")
        .items(&labels)
        .default(orders.iter().position(|o| *o == current).unwrap_or(0))
        .interact()?;
    ctx.store.apply_sort(orders[selection]).await?;
    Ok(())
}

async fn prompt_draft(ctx: &AppContext, title: &str, content: &str) -> Result<()> {
    let title: String = Input::with_theme(&ctx.theme())
        .with_prompt("Título")
        .with_initial_text(title)
        .interact_text()?;
    let content: String = Input::with_theme(&ctx.theme())
        .with_prompt("Contenido")
        .with_initial_text(content)
        .interact_text()?;
    ctx.store.set_draft_title(title).await;
    ctx.store.set_draft_content(content).await;
    Ok(())
}

async fn pick_note(ctx: &AppContext, prompt: &str) -> Result<Option<notes_client::Note>> {
    let view = ctx.store.view().await;
    if view.is_empty() {
        ctx.warn("No hay notas");
        return Ok(None);
    }
    let labels: Vec<String> = view.iter().map(render::note_label).collect();
    let selection = Select::with_theme(&ctx.theme())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(selection.map(|i| view[i].clone()))
}
