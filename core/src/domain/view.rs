//! Interactive view state and its reducer.
//!
//! [`ViewState::reduce`] is a pure transition function: it performs no I/O and
//! depends only on the current state and the action. List-dependent actions
//! carry the current list length and window height with them, because the
//! filtered list lives outside the state.

use super::search::search;
use super::sort::{sort_entities, SortField, SortOrder};
use super::PortProcess;

/// Which screen currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    List,
    Search,
    KillConfirm,
    Help,
    Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

/// Discrete user intents understood by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate {
        direction: Direction,
        list_len: usize,
        max_visible: usize,
    },
    JumpTop,
    JumpBottom {
        list_len: usize,
        max_visible: usize,
    },
    SetViewMode(ViewMode),
    SetSearchQuery(String),
    AppendSearchChar(char),
    BackspaceSearch,
    ClearSearch,
    ToggleSortField,
    ToggleSortOrder,
    /// Back to the top of the list view; used when leaving a modal.
    Reset,
    /// Pull selection and scroll back inside bounds after the list changed
    /// size (rescan, resize).
    Clamp {
        list_len: usize,
        max_visible: usize,
    },
}

/// The whole interactive session state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Index into the filtered and sorted list.
    pub selected_index: usize,
    /// First visible row of the list window.
    pub scroll_offset: usize,
    pub view_mode: ViewMode,
    pub search_query: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl ViewState {
    /// Initial state, optionally filtered to a port.
    pub fn new(initial_port: Option<u16>) -> Self {
        Self {
            search_query: initial_port.map(|p| p.to_string()).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Apply one action and return the next state.
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::Navigate {
                direction,
                list_len,
                max_visible,
            } => self.navigate(direction, list_len, max_visible),
            Action::JumpTop => self.with_position(0, 0),
            Action::JumpBottom {
                list_len,
                max_visible,
            } => {
                let max_visible = max_visible.max(1);
                self.with_position(
                    list_len.saturating_sub(1),
                    list_len.saturating_sub(max_visible),
                )
            }
            Action::SetViewMode(view_mode) => Self { view_mode, ..self },
            Action::SetSearchQuery(search_query) => Self {
                search_query,
                ..self
            }
            .with_position(0, 0),
            Action::AppendSearchChar(c) => {
                let mut search_query = self.search_query;
                search_query.push(c);
                Self {
                    search_query,
                    ..self
                }
                .with_position(0, 0)
            }
            Action::BackspaceSearch => {
                let mut search_query = self.search_query;
                search_query.pop();
                Self {
                    search_query,
                    ..self
                }
                .with_position(0, 0)
            }
            Action::ClearSearch => Self {
                search_query: String::new(),
                view_mode: ViewMode::List,
                ..self
            }
            .with_position(0, 0),
            Action::ToggleSortField => Self {
                sort_field: self.sort_field.next(),
                ..self
            }
            .with_position(0, 0),
            Action::ToggleSortOrder => Self {
                sort_order: self.sort_order.toggled(),
                ..self
            }
            .with_position(0, 0),
            Action::Reset => Self {
                view_mode: ViewMode::List,
                ..self
            }
            .with_position(0, 0),
            Action::Clamp {
                list_len,
                max_visible,
            } => self.clamp(list_len, max_visible),
        }
    }

    /// Apply a sequence of actions in order.
    pub fn reduce_all(self, actions: impl IntoIterator<Item = Action>) -> Self {
        actions.into_iter().fold(self, ViewState::reduce)
    }

    /// Filter and sort `entities` according to the current query and sort
    /// settings. The result is the list `selected_index` points into.
    pub fn visible(&self, entities: &[PortProcess]) -> Vec<PortProcess> {
        let mut list = search(&self.search_query, entities);
        sort_entities(&mut list, self.sort_field, self.sort_order);
        list
    }

    /// The selected entity of an already derived visible list.
    pub fn selected<'a>(&self, visible: &'a [PortProcess]) -> Option<&'a PortProcess> {
        visible.get(self.selected_index)
    }

    fn with_position(self, selected_index: usize, scroll_offset: usize) -> Self {
        Self {
            selected_index,
            scroll_offset,
            ..self
        }
    }

    fn navigate(self, direction: Direction, list_len: usize, max_visible: usize) -> Self {
        if list_len == 0 {
            return self;
        }
        let max_visible = max_visible.max(1);

        // The list may have shrunk since the last action.
        let current = self.selected_index.min(list_len - 1);
        let next_index = match direction {
            Direction::Down => (current + 1).min(list_len - 1),
            Direction::Up => current.saturating_sub(1),
        };

        let mut next_scroll = self.scroll_offset;
        if next_index < next_scroll {
            next_scroll = next_index;
        } else if next_index >= next_scroll + max_visible {
            next_scroll = next_index + 1 - max_visible;
        }
        next_scroll = next_scroll.min(list_len.saturating_sub(max_visible));

        self.with_position(next_index, next_scroll)
    }

    fn clamp(self, list_len: usize, max_visible: usize) -> Self {
        if list_len == 0 {
            return self.with_position(0, 0);
        }
        let max_visible = max_visible.max(1);

        let selected = self.selected_index.min(list_len - 1);
        let mut scroll = self.scroll_offset.min(list_len.saturating_sub(max_visible));
        if selected < scroll {
            scroll = selected;
        } else if selected >= scroll + max_visible {
            scroll = selected + 1 - max_visible;
        }

        self.with_position(selected, scroll)
    }
}
