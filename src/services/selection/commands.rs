//! Commands the calendar view asks its host to carry out.

use crate::models::event::EventId;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    /// Show details of an existing event instance.
    OpenEvent {
        id: EventId,
        start_millis: i64,
        end_millis: i64,
    },
    /// Start creating an event in the selected slot.
    CreateEvent {
        start_millis: i64,
        end_millis: i64,
        all_day: bool,
    },
    /// Switch to the single-day view at the given time.
    OpenDay { millis: i64 },
    /// Long press: offer actions for the selected slot or event.
    ShowContextMenu {
        millis: i64,
        event: Option<EventId>,
    },
    DeleteEvent {
        id: EventId,
        start_millis: i64,
        end_millis: i64,
    },
    /// The visible range moved by one page.
    SwitchPage { forward: bool, selection_day: i32 },
    /// Events for the new range should be loaded.
    ReloadEvents { first_day: i32, num_days: u32 },
}

/// Result of feeding one input event to the view.
///
/// Collects everything the host has to act on after the event was handled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionResult {
    /// The input was consumed by the view.
    pub handled: bool,
    /// The grid must be repainted.
    pub redraw: bool,
    pub commands: Vec<ViewCommand>,
}

impl InteractionResult {
    pub fn handled() -> Self {
        Self {
            handled: true,
            redraw: true,
            commands: Vec::new(),
        }
    }

    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: ViewCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn push(&mut self, command: ViewCommand) {
        self.commands.push(command);
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: InteractionResult) {
        self.handled |= other.handled;
        self.redraw |= other.redraw;
        self.commands.extend(other.commands);
    }

    /// Check if any action needs to be processed.
    pub fn has_actions(&self) -> bool {
        self.redraw || !self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_result_default() {
        let result = InteractionResult::default();
        assert!(!result.handled);
        assert!(!result.has_actions());
    }

    #[test]
    fn test_merge_keeps_commands_in_order() {
        let mut first = InteractionResult::handled().with_command(ViewCommand::OpenDay { millis: 1 });
        let second = InteractionResult::ignored().with_command(ViewCommand::OpenDay { millis: 2 });
        first.merge(second);

        assert!(first.handled);
        assert_eq!(
            first.commands,
            vec![
                ViewCommand::OpenDay { millis: 1 },
                ViewCommand::OpenDay { millis: 2 }
            ]
        );
    }

    #[test]
    fn test_has_actions_with_command_only() {
        let result = InteractionResult::ignored().with_command(ViewCommand::SwitchPage {
            forward: true,
            selection_day: 10,
        });
        assert!(result.has_actions());
    }
}
