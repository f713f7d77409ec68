//! Dashboard scenarios driven through the public API against the in-memory
//! backend: startup, activation, merge order, failures, and scrolling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use lambda_log_viewer::logs::classify::LineCategory;
use lambda_log_viewer::source::memory::{BackendCall, MemoryBackend};
use lambda_log_viewer::source::{RawEvent, startup_entities};
use lambda_log_viewer::tui::input::Key;
use lambda_log_viewer::tui::model::{
    DashboardCmd, DashboardModel, DashboardMsg, DashboardSettings, Focus, PanelStatus,
};
use lambda_log_viewer::tui::render::render_to_string;
use lambda_log_viewer::tui::selection::{CycleStatus, RefreshContext, RefreshStage};
use lambda_log_viewer::tui::update::update;
use lambda_log_viewer::tui::RefreshWorker;

fn context(backend: &Arc<MemoryBackend>) -> RefreshContext {
    RefreshContext::new(backend.clone(), backend.clone())
}

fn dashboard(backend: &MemoryBackend, filter: Option<&str>) -> DashboardModel {
    let entities = startup_entities(backend, backend, filter).expect("startup");
    DashboardModel::new(entities, DashboardSettings::default(), (120, 40))
}

/// Press Enter and run the resulting cycle synchronously.
fn activate(model: &mut DashboardModel, ctx: &RefreshContext) -> DashboardCmd {
    match update(model, DashboardMsg::Key(Key::Enter)) {
        DashboardCmd::StartRefresh(ticket) => {
            let outcome = ctx.run(ticket);
            update(model, DashboardMsg::RefreshLoaded(Box::new(outcome)))
        }
        other => panic!("expected a refresh, got {other:?}"),
    }
}

fn texts(model: &DashboardModel) -> Vec<&str> {
    model
        .panels
        .log_lines
        .iter()
        .map(|l| l.text.as_str())
        .collect()
}

#[test]
fn activation_merges_two_streams_oldest_first() {
    let backend = Arc::new(common::order_service_backend());
    let ctx = context(&backend);
    let mut model = dashboard(&backend, None);
    assert_eq!(model.entities, vec!["orderSvc".to_string()]);

    let cmd = activate(&mut model, &ctx);
    match cmd {
        DashboardCmd::RecordCycle(record) => assert_eq!(
            record.status,
            CycleStatus::Completed {
                streams: 2,
                lines: 2
            }
        ),
        other => panic!("unexpected command {other:?}"),
    }

    assert_eq!(model.selection.selected(), Some("orderSvc"));
    assert_eq!(texts(&model), vec!["START RequestId: 1", "hello"]);
    assert_eq!(model.panels.log_lines[0].category, LineCategory::Boundary);
    assert_eq!(model.panels.log_lines[1].category, LineCategory::Plain);

    let (entity, metadata) = model.panels.metadata.as_ref().expect("metadata shown");
    assert_eq!(entity, "orderSvc");
    assert_eq!(metadata.len(), 6);
    assert_eq!(metadata["runtime"], "nodejs20.x");

    let screen = render_to_string(&model);
    assert!(screen.contains("Logs: orderSvc"), "{screen}");
    assert!(screen.contains("Order intake"), "{screen}");
}

#[test]
fn activation_issues_one_call_per_step() {
    let backend = Arc::new(common::order_service_backend());
    let ctx = context(&backend);
    let mut model = dashboard(&backend, None);
    backend.clear_calls();

    activate(&mut model, &ctx);
    let calls = backend.calls();
    assert_eq!(calls[0], BackendCall::GetMetadata("orderSvc".to_string()));
    assert_eq!(calls[1], BackendCall::ListStreams("orderSvc".to_string()));
    assert_eq!(backend.fetch_count(), 2);
    assert_eq!(calls.len(), 4);
}

#[test]
fn function_without_streams_shows_empty_panel() {
    let backend = Arc::new(MemoryBackend::new().with_entity("quiet", &[("runtime", "python3.12")]));
    let ctx = context(&backend);
    let mut model = dashboard(&backend, None);

    activate(&mut model, &ctx);
    assert!(model.panels.log_lines.is_empty());
    assert_eq!(model.panels.status, PanelStatus::Ready);
    assert!(model.panels.metadata.is_some());
    assert_eq!(backend.fetch_count(), 0);
    assert!(render_to_string(&model).contains("(no log events)"));
}

#[test]
fn second_fetch_failure_keeps_metadata_and_empty_logs() {
    let backend = Arc::new(common::order_service_backend());
    let ctx = context(&backend);
    let mut model = dashboard(&backend, None);
    activate(&mut model, &ctx);
    assert_eq!(model.panels.log_lines.len(), 2);

    // Streams are fetched most-recent first; the older one is second.
    backend.fail_fetch("2024/05/01/[$LATEST]aaaa");
    let cmd = activate(&mut model, &ctx);
    match cmd {
        DashboardCmd::RecordCycle(record) => match record.status {
            CycleStatus::Failed { stage, error_code, .. } => {
                assert_eq!(stage, RefreshStage::Logs);
                assert_eq!(error_code, "LLV-2001");
            }
            other => panic!("unexpected status {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }

    assert!(model.panels.log_lines.is_empty());
    assert!(model.panels.metadata.is_some());
    assert!(matches!(
        model.panels.status,
        PanelStatus::Failed {
            stage: RefreshStage::Logs,
            ..
        }
    ));
    assert!(render_to_string(&model).contains("(logs unavailable)"));
}

#[test]
fn reactivation_reruns_the_cycle_with_new_events() {
    let backend = Arc::new(common::order_service_backend());
    let ctx = context(&backend);
    let mut model = dashboard(&backend, None);
    activate(&mut model, &ctx);
    let first = model.panels.log_lines.clone();

    activate(&mut model, &ctx);
    assert_eq!(model.panels.log_lines, first);

    backend.push_event(
        "orderSvc",
        "2024/05/01/[$LATEST]bbbb",
        RawEvent::new(110, "END RequestId: 1"),
    );
    activate(&mut model, &ctx);
    assert_eq!(
        texts(&model),
        vec!["START RequestId: 1", "hello", "END RequestId: 1"]
    );
    assert_eq!(backend.fetch_count(), 6);
}

#[test]
fn startup_filter_is_case_sensitive_and_sorted() {
    let backend = MemoryBackend::new()
        .with_entity("b", &[])
        .with_entity("alpha", &[])
        .with_entity("Zeta", &[]);
    let model = dashboard(&backend, Some("a"));
    assert_eq!(model.entities, vec!["Zeta".to_string(), "alpha".to_string()]);

    let screen = render_to_string(&model);
    assert!(screen.contains("Functions (2)"), "{screen}");
    assert!(screen.contains("select a function"), "{screen}");
}

#[test]
fn startup_failure_is_reported() {
    let backend = MemoryBackend::new().with_entity("orderSvc", &[]);
    backend.fail_list_entities(true);
    let err = startup_entities(&backend, &backend, None).expect_err("must fail");
    assert_eq!(err.code(), "LLV-2001");
}

#[test]
fn scrolling_up_pauses_and_end_resumes_tail() {
    let events: Vec<RawEvent> = (0..100)
        .map(|i| RawEvent::new(1_700_000_000 + i, format!("line {i}")))
        .collect();
    let backend = Arc::new(MemoryBackend::new().with_entity("busy", &[]).with_stream(
        "busy",
        "s1",
        1_700_000_100,
        events,
    ));
    let ctx = context(&backend);
    let mut model = dashboard(&backend, None);
    activate(&mut model, &ctx);

    let view = model.panels.log_view.state();
    assert!(view.autoscroll);
    assert_eq!(view.origin, model.panels.log_view.max_origin());

    update(&mut model, DashboardMsg::Key(Key::Tab));
    assert_eq!(model.focus, Focus::Logs);
    update(&mut model, DashboardMsg::Key(Key::PageUp));
    let paused = model.panels.log_view.state();
    assert!(!paused.autoscroll);
    assert_eq!(paused.origin, model.panels.log_view.max_origin() - 5);

    update(&mut model, DashboardMsg::Key(Key::End));
    assert!(model.panels.log_view.state().autoscroll);
    let visible = model.panels.visible_lines();
    assert_eq!(visible.last().map(|l| l.text.as_str()), Some("line 99"));
}

#[test]
fn worker_delivers_outcomes_for_submitted_tickets() {
    let backend = Arc::new(common::order_service_backend());
    let worker = RefreshWorker::spawn(context(&backend)).expect("spawn worker");
    let mut model = dashboard(&backend, None);

    let DashboardCmd::StartRefresh(ticket) = update(&mut model, DashboardMsg::Key(Key::Enter))
    else {
        panic!("expected a refresh");
    };
    worker.submit(ticket).expect("submit");
    let outcome = worker
        .recv_timeout(Duration::from_secs(5))
        .expect("outcome delivered");
    update(&mut model, DashboardMsg::RefreshLoaded(Box::new(outcome)));

    assert!(!model.is_loading());
    assert_eq!(model.panels.log_lines.len(), 2);
}
