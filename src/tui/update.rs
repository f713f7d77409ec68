//! Pure update function for the dashboard.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//! No I/O happens here.

use super::input::{InputAction, resolve_key};
use super::model::{CycleRecord, DashboardCmd, DashboardModel, DashboardMsg, PanelStatus};
use super::selection::{CycleStatus, RefreshOutcome};

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut DashboardModel, msg: DashboardMsg) -> DashboardCmd {
    match msg {
        DashboardMsg::Tick => {
            model.tick = model.tick.wrapping_add(1);
            DashboardCmd::None
        }

        DashboardMsg::Key(key) => match resolve_key(key, model.focus) {
            Some(action) => apply_input_action(model, action),
            None => DashboardCmd::None,
        },

        DashboardMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            model.sync_viewports();
            DashboardCmd::None
        }

        DashboardMsg::RefreshLoaded(outcome) => apply_refresh(model, *outcome),
    }
}

fn apply_input_action(model: &mut DashboardModel, action: InputAction) -> DashboardCmd {
    match action {
        InputAction::Quit => {
            model.quit = true;
            DashboardCmd::Quit
        }
        InputAction::ToggleFocus => {
            model.focus = model.focus.toggled();
            DashboardCmd::None
        }
        InputAction::MoveCursor(delta) => {
            model.entity_view.cursor_move(delta);
            DashboardCmd::None
        }
        InputAction::ScrollLine(direction) => {
            let delta = step(model.settings.line_step, direction);
            model.panels.log_view.scroll_by(delta);
            DashboardCmd::None
        }
        InputAction::ScrollPage(direction) => {
            let delta = step(model.settings.page_step, direction);
            model.panels.log_view.scroll_by(delta);
            DashboardCmd::None
        }
        InputAction::FollowTail => {
            model.panels.log_view.follow_tail();
            DashboardCmd::None
        }
        InputAction::ScrollTop => {
            // Saturates to the first line.
            model.panels.log_view.scroll_by(isize::MIN);
            DashboardCmd::None
        }
        InputAction::Activate => activate_cursor_entity(model),
    }
}

/// Select the function under the list cursor and start its refresh cycle.
fn activate_cursor_entity(model: &mut DashboardModel) -> DashboardCmd {
    let Some(entity) = model.cursor_entity().map(str::to_owned) else {
        return DashboardCmd::None;
    };
    let ticket = model.selection.activate(&entity);
    model.panels.status = PanelStatus::Loading { entity };
    model.in_flight = Some(ticket.clone());
    DashboardCmd::StartRefresh(ticket)
}

fn apply_refresh(model: &mut DashboardModel, outcome: RefreshOutcome) -> DashboardCmd {
    let entity = outcome.ticket.entity.clone();
    let generation = outcome.ticket.generation;
    let elapsed = outcome.elapsed;

    let status = model.selection.apply_outcome(outcome, &mut model.panels);

    if status != CycleStatus::Stale
        && model
            .in_flight
            .as_ref()
            .is_some_and(|ticket| ticket.generation == generation)
    {
        model.in_flight = None;
    }

    DashboardCmd::RecordCycle(CycleRecord {
        entity,
        generation,
        status,
        elapsed,
    })
}

fn step(size: usize, direction: isize) -> isize {
    isize::try_from(size)
        .unwrap_or(isize::MAX)
        .saturating_mul(direction)
}
