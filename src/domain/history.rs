use crate::domain::tools::{Tool, ToolId, ToolKind, ToolState};
use serde::Serialize;
use std::collections::VecDeque;

/// One undoable step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum HistoryAction {
    /// A finalized tool; `tool` is its state right after placement
    Add { tool: Tool },
    /// A removed tool and the list position it occupied
    Delete { tool: Tool, index: usize },
    /// A drag edit of a live tool
    Modify { tool_id: ToolId, kind: ToolKind, prev_state: ToolState, new_state: ToolState },
}

impl HistoryAction {
    pub fn tool_id(&self) -> ToolId {
        match self {
            HistoryAction::Add { tool } | HistoryAction::Delete { tool, .. } => tool.id,
            HistoryAction::Modify { tool_id, .. } => *tool_id,
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            HistoryAction::Add { tool } | HistoryAction::Delete { tool, .. } => tool.kind,
            HistoryAction::Modify { kind, .. } => *kind,
        }
    }

    pub fn prev_state(&self) -> Option<ToolState> {
        match self {
            HistoryAction::Add { .. } => None,
            HistoryAction::Delete { tool, .. } => Some(tool.state()),
            HistoryAction::Modify { prev_state, .. } => Some(prev_state.clone()),
        }
    }

    pub fn new_state(&self) -> Option<ToolState> {
        match self {
            HistoryAction::Add { tool } => Some(tool.state()),
            HistoryAction::Delete { .. } => None,
            HistoryAction::Modify { new_state, .. } => Some(new_state.clone()),
        }
    }
}

/// Linear undo/redo history with bounded stacks
#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo: VecDeque<HistoryAction>,
    redo: VecDeque<HistoryAction>,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(20)
    }
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self { undo: VecDeque::new(), redo: VecDeque::new(), capacity: capacity.max(1) }
    }

    /// Record a new action. Any redoable future is discarded.
    pub fn push(&mut self, action: HistoryAction) {
        self.redo.clear();
        self.undo.push_back(action);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    pub fn pop_undo(&mut self) -> Option<HistoryAction> {
        let action = self.undo.pop_back()?;
        self.redo.push_back(action.clone());
        while self.redo.len() > self.capacity {
            self.redo.pop_front();
        }
        Some(action)
    }

    pub fn pop_redo(&mut self) -> Option<HistoryAction> {
        let action = self.redo.pop_back()?;
        self.undo.push_back(action.clone());
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        Some(action)
    }

    /// Replace the most recent redo entry, used when the undone tool had
    /// unrecorded style edits that redo must bring back
    pub fn amend_redo_top(&mut self, action: HistoryAction) {
        if let Some(top) = self.redo.back_mut() {
            *top = action;
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Tool ids on the undo stack, oldest first
    pub fn undo_ids(&self) -> Vec<ToolId> {
        self.undo.iter().map(HistoryAction::tool_id).collect()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
