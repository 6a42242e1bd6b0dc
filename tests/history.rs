use price_chart_tools::domain::history::{HistoryAction, HistoryManager};
use price_chart_tools::domain::mapping::DomainPoint;
use price_chart_tools::domain::tools::{Tool, ToolId, ToolKind};
use quickcheck_macros::quickcheck;

fn added(id: u64) -> HistoryAction {
    let kind = ToolKind::HorizontalLine;
    HistoryAction::Add { tool: Tool::new(ToolId::from(id), kind, vec![DomainPoint::new(0.0, id as f64)], kind.default_options()) }
}

#[quickcheck]
fn stacks_never_exceed_capacity(capacity: u8, pushes: u8, undos: u8) -> bool {
    let capacity = capacity as usize % 30 + 1;
    let mut history = HistoryManager::new(capacity);
    for id in 0..pushes as u64 {
        history.push(added(id));
    }
    for _ in 0..undos {
        history.pop_undo();
    }
    history.undo_len() <= capacity
        && history.redo_len() <= capacity
        && history.undo_len() + history.redo_len() <= (pushes as usize).min(capacity)
}

#[test]
fn oldest_entries_are_dropped() {
    let mut history = HistoryManager::default();
    for id in 0..25 {
        history.push(added(id));
    }
    assert_eq!(history.undo_len(), 20);
    assert_eq!(history.undo_ids().first(), Some(&ToolId::from(5)));
}

#[test]
fn new_action_discards_redo() {
    let mut history = HistoryManager::new(20);
    history.push(added(1));
    history.push(added(2));
    assert_eq!(history.pop_undo().map(|a| a.tool_id()), Some(ToolId::from(2)));
    assert!(history.can_redo());

    history.push(added(3));
    assert!(!history.can_redo());
    assert_eq!(history.undo_ids(), vec![ToolId::from(1), ToolId::from(3)]);
    assert!(history.pop_redo().is_none());
}

#[test]
fn add_and_delete_carry_one_side() {
    let add = added(1);
    assert!(add.prev_state().is_none());
    assert_eq!(add.new_state().map(|s| s.points.len()), Some(1));

    let HistoryAction::Add { tool } = add else { unreachable!() };
    let delete = HistoryAction::Delete { tool, index: 0 };
    assert!(delete.new_state().is_none());
    assert!(delete.prev_state().is_some());
}
