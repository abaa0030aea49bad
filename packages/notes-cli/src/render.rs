//! Note rendering for the terminal.

use chrono::Local;
use colored::Colorize;
use notes_client::{format_created_at, Note, SortOrder};

/// One-line label for selection menus.
pub fn note_label(note: &Note) -> String {
    let created = format_created_at(note, &Local);
    if created.is_empty() {
        note.title.clone()
    } else {
        format!("{}  ({})", note.title, created)
    }
}

/// Full card: title, content, creation date and id.
pub fn note_card(note: &Note) -> String {
    let mut card = format!("{}\n{}", note.title.bold(), note.content);
    let created = format_created_at(note, &Local);
    if !created.is_empty() {
        card.push_str(&format!("\n{}", format!("Creado: {}", created).dimmed()));
    }
    card.push_str(&format!("\n{}", note.id.dimmed()));
    card
}

pub fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("{}", "No hay notas".dimmed());
        return;
    }
    for note in notes {
        println!("{}", note_card(note));
        println!();
    }
}

pub fn sort_label(order: SortOrder) -> String {
    format!("Ordenar: {}", order.label())
}
