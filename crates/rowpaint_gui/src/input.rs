//! Keyboard events mapped to view commands.

use crate::document::Motion;
use eframe::egui;

/// Intent derived from one key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ViewCommand {
    Move { motion: Motion, select: bool },
    PageUp { select: bool },
    PageDown { select: bool },
    SelectAll,
    ZoomIn,
    ZoomOut,
    ToggleSoftWrap,
}

/// Translate egui input events into view commands.
///
/// # Returns
/// Commands in event order; unrelated events are skipped.
pub(crate) fn commands_from_events(events: &[egui::Event]) -> Vec<ViewCommand> {
    let mut out = Vec::new();
    for event in events {
        let egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } = event
        else {
            continue;
        };
        let select = modifiers.shift;
        if modifiers.command {
            match key {
                egui::Key::A => out.push(ViewCommand::SelectAll),
                egui::Key::Plus | egui::Key::Equals => out.push(ViewCommand::ZoomIn),
                egui::Key::Minus => out.push(ViewCommand::ZoomOut),
                egui::Key::Home => out.push(ViewCommand::Move {
                    motion: Motion::DocumentStart,
                    select,
                }),
                egui::Key::End => out.push(ViewCommand::Move {
                    motion: Motion::DocumentEnd,
                    select,
                }),
                _ => {}
            }
            continue;
        }
        if modifiers.alt {
            if *key == egui::Key::Z {
                out.push(ViewCommand::ToggleSoftWrap);
            }
            continue;
        }
        let motion = match key {
            egui::Key::ArrowLeft => Motion::Left,
            egui::Key::ArrowRight => Motion::Right,
            egui::Key::ArrowUp => Motion::Up,
            egui::Key::ArrowDown => Motion::Down,
            egui::Key::Home => Motion::RowStart,
            egui::Key::End => Motion::RowEnd,
            egui::Key::PageUp => {
                out.push(ViewCommand::PageUp { select });
                continue;
            }
            egui::Key::PageDown => {
                out.push(ViewCommand::PageDown { select });
                continue;
            }
            _ => continue,
        };
        out.push(ViewCommand::Move { motion, select });
    }
    out
}
