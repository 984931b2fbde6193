use crate::app::Scene;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    StartPause,
    Reset,
    NudgeMass(i32),
    Preset(usize),
    ToggleBraille,
    ToggleColor,
    HelpToggle,
    Back,
    Quit,
}

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(scene: Scene, ev: &InputEvent) -> Option<Action> {
    // Global
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(Action::Quit);
    }
    match ev.key {
        KeyCode::Char('h') | KeyCode::Char('H') => return Some(Action::HelpToggle),
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Action::Quit),
        KeyCode::Esc => return Some(Action::Back),
        _ => {}
    }

    match scene {
        Scene::Main => match ev.key {
            KeyCode::Char(' ') | KeyCode::Enter => Some(Action::StartPause),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Reset),
            KeyCode::Left | KeyCode::Down | KeyCode::Char('-') => Some(Action::NudgeMass(-1)),
            KeyCode::Right | KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
                Some(Action::NudgeMass(1))
            }
            KeyCode::Char(ch @ '1'..='4') => Some(Action::Preset((ch as u8 - b'1') as usize)),
            KeyCode::Char('v') | KeyCode::Char('V') => Some(Action::ToggleBraille),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::ToggleColor),
            _ => None,
        },
        Scene::Help => None,
    }
}
