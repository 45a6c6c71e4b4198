//! Visual style classes per task state

use super::TaskState;
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Style class attached to a node. Every [`TaskState`] maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleClass {
    Success,
    Running,
    WaitingNeutral,
    Failed,
    StartFailed,
    StopFailed,
    Default,
}

impl StyleClass {
    /// Total state -> style mapping
    pub fn for_state(state: &TaskState) -> Self {
        match state {
            TaskState::Successful => Self::Success,
            TaskState::Up => Self::Running,
            TaskState::Waiting => Self::WaitingNeutral,
            TaskState::Failed => Self::Failed,
            TaskState::StartFailed => Self::StartFailed,
            TaskState::StopFailed => Self::StopFailed,
            TaskState::Other(_) | TaskState::Unknown => Self::Default,
        }
    }

    /// Class name as used in exported snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Running => "running",
            Self::WaitingNeutral => "waiting-neutral",
            Self::Failed => "failed",
            Self::StartFailed => "start-failed",
            Self::StopFailed => "stop-failed",
            Self::Default => "default",
        }
    }

    /// Terminal style for the node label
    pub fn style(&self) -> Style {
        match self {
            Self::Success => Style::default().fg(Color::White).bg(Color::Green),
            Self::Running => Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::SLOW_BLINK),
            Self::WaitingNeutral => Style::default().fg(Color::DarkGray),
            Self::Failed => Style::default().fg(Color::White).bg(Color::Red),
            Self::StartFailed => Style::default().fg(Color::LightRed),
            Self::StopFailed => Style::default().fg(Color::Magenta),
            Self::Default => Style::default(),
        }
    }

    /// Border color of the node box
    pub fn border_color(&self) -> Color {
        match self {
            Self::Success => Color::Green,
            Self::Running => Color::Blue,
            Self::WaitingNeutral => Color::DarkGray,
            Self::Failed | Self::StartFailed => Color::Red,
            Self::StopFailed => Color::Magenta,
            Self::Default => Color::Gray,
        }
    }
}

impl fmt::Display for StyleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_states() {
        let cases = [
            ("SUCCESSFUL", StyleClass::Success),
            ("UP", StyleClass::Running),
            ("WAITING", StyleClass::WaitingNeutral),
            ("FAILED", StyleClass::Failed),
            ("START_FAILED", StyleClass::StartFailed),
            ("STOP_FAILED", StyleClass::StopFailed),
        ];
        for (tag, expected) in cases {
            let state = TaskState::from_tag(Some(tag));
            assert_eq!(StyleClass::for_state(&state), expected, "tag {}", tag);
        }
    }

    #[test]
    fn test_fallback_is_default() {
        for state in [
            TaskState::Unknown,
            TaskState::from_tag(Some("")),
            TaskState::from_tag(Some("successful")),
            TaskState::from_tag(Some("BUILDING")),
        ] {
            assert_eq!(StyleClass::for_state(&state), StyleClass::Default);
        }
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&StyleClass::WaitingNeutral).unwrap();
        assert_eq!(json, "\"waiting-neutral\"");
        assert_eq!(StyleClass::Success.to_string(), "success");
    }
}
