//! Application context: the note store plus terminal output for it

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use notes_client::{ClientConfig, Note, NoteStore};
use std::sync::Arc;

use crate::notifier::TerminalNotifier;

/// A write that reached the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Saved {
    Created,
    Updated,
    Deleted,
}

impl Saved {
    pub fn message(&self) -> &'static str {
        match self {
            Saved::Created => "✅ Nota creada",
            Saved::Updated => "✅ Nota actualizada",
            Saved::Deleted => "🗑  Nota eliminada",
        }
    }
}

/// Application context passed to all commands
pub struct AppContext {
    pub store: NoteStore,
    pub quiet: bool,
}

impl AppContext {
    pub fn new(config: ClientConfig, quiet: bool) -> Result<Self> {
        let store = NoteStore::from_config(config)
            .context("Failed to create notes client")?
            .with_notifier(Arc::new(TerminalNotifier::new()));
        Ok(Self { store, quiet })
    }

    pub fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    /// Ask before deleting. Quiet mode never deletes without asking.
    pub fn confirm_delete(&self, note: &Note) -> Result<bool> {
        if self.quiet {
            return Ok(false);
        }
        Ok(Confirm::with_theme(&self.theme())
            .with_prompt(format!("¿Eliminar \"{}\"?", note.title))
            .default(false)
            .interact()?)
    }

    /// Ask whether to leave while reminders are still armed.
    pub fn confirm_exit(&self, pending: usize) -> Result<bool> {
        if self.quiet {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme())
            .with_prompt(format!(
                "Hay {} recordatorio(s) pendiente(s). ¿Salir y cancelarlos?",
                pending
            ))
            .default(true)
            .interact()?)
    }

    /// Heading above the note list, with how many notes are shown.
    pub fn print_banner(&self, shown: usize, total: usize) {
        if self.quiet {
            return;
        }
        println!();
        if shown == total {
            println!("{}", style(format!("📒 Notas ({})", total)).bold());
        } else {
            println!("{}", style(format!("📒 Notas ({} de {})", shown, total)).bold());
        }
    }

    pub fn report_saved(&self, saved: Saved) {
        if !self.quiet {
            println!("{}", style(saved.message()).green());
        }
    }

    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(format!("⚠️  {}", msg)).yellow());
        }
    }

    pub fn hint(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).cyan());
        }
    }

    /// Errors are shown even in quiet mode.
    pub fn report_error(&self, err: &anyhow::Error) {
        eprintln!("{} {:#}", style("❌").red(), err);
    }
}
