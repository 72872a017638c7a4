#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    NextTab,
    ToggleHelp,
    ToggleCpuView,
    Navigate(Direction),
    BeginEdit,
    UpdateEdit(String),
    CommitEdit,
    CancelEdit,
    Save,
    Apply,
    SaveApply,
    Reload,
    None,
}
