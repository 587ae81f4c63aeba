#![forbid(unsafe_code)]

//! Formatting commands and the per-session toggle state behind them.
//!
//! A [`FormatCommand`] is what the user asked for (a toolbar button or a
//! shortcut). The session turns it into a [`PortCommand`], the concrete
//! instruction for the document-mutation port, using the current
//! [`FormatState`]. Toggle buttons (list, alignment, text size) are pure
//! state machines here; what `InsertOrderedList` actually does to the
//! document is the port's business.
//!
//! ```text
//! ListStyle:  None ──► Bullet ──► Numbered ──► None
//!                  InsertUnordered  InsertOrdered  InsertOrdered
//!
//! Alignment:  Left ──► Center ──► Right ──► Left
//!                 JustifyCenter JustifyRight JustifyLeft
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A formatting request from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    /// Advance the list toggle.
    ToggleList,
    /// Advance the alignment toggle.
    CycleAlignment,
    /// Step the text size one notch.
    TextSize(SizeStep),
}

/// Direction for [`FormatCommand::TextSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeStep {
    Larger,
    Smaller,
}

/// Instruction for the document-mutation port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortCommand {
    Bold,
    Italic,
    Underline,
    InsertUnorderedList,
    InsertOrderedList,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    SetTextSize(TextSize),
}

/// List toggle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ListStyle {
    #[default]
    None,
    Bullet,
    Numbered,
}

impl ListStyle {
    /// Next state and the port command that gets there.
    #[must_use]
    pub fn advance(self) -> (Self, PortCommand) {
        match self {
            Self::None => (Self::Bullet, PortCommand::InsertUnorderedList),
            Self::Bullet => (Self::Numbered, PortCommand::InsertOrderedList),
            // Re-issuing the ordered list command removes the list.
            Self::Numbered => (Self::None, PortCommand::InsertOrderedList),
        }
    }
}

/// Alignment toggle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    #[must_use]
    pub fn advance(self) -> (Self, PortCommand) {
        match self {
            Self::Left => (Self::Center, PortCommand::JustifyCenter),
            Self::Center => (Self::Right, PortCommand::JustifyRight),
            Self::Right => (Self::Left, PortCommand::JustifyLeft),
        }
    }
}

/// Editor text size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextSize {
    Xs,
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
    #[cfg_attr(feature = "serde", serde(rename = "2xl"))]
    Xxl,
}

impl TextSize {
    pub const ALL: [TextSize; 6] = [
        TextSize::Xs,
        TextSize::Sm,
        TextSize::Md,
        TextSize::Lg,
        TextSize::Xl,
        TextSize::Xxl,
    ];

    /// Short class-style name (`"xs"` through `"2xl"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
            Self::Xxl => "2xl",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.as_str() == name)
    }

    /// One step in `direction`, saturating at either end.
    #[must_use]
    pub fn step(self, direction: SizeStep) -> Self {
        let index = self as usize;
        let next = match direction {
            SizeStep::Larger => (index + 1).min(Self::ALL.len() - 1),
            SizeStep::Smaller => index.saturating_sub(1),
        };
        Self::ALL[next]
    }
}

/// Toggle state owned by one edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormatState {
    pub list: ListStyle,
    pub alignment: Alignment,
    pub text_size: TextSize,
}

impl FormatState {
    /// Start a session at a stored text size with the other toggles reset.
    #[must_use]
    pub fn with_text_size(text_size: TextSize) -> Self {
        Self {
            text_size,
            ..Self::default()
        }
    }

    /// Resolve `command` against this state.
    ///
    /// Returns the port command to run and the state to adopt once it
    /// succeeds. `self` is left untouched.
    #[must_use]
    pub fn plan(&self, command: FormatCommand) -> (PortCommand, FormatState) {
        let mut next = *self;
        let port = match command {
            FormatCommand::Bold => PortCommand::Bold,
            FormatCommand::Italic => PortCommand::Italic,
            FormatCommand::Underline => PortCommand::Underline,
            FormatCommand::ToggleList => {
                let (list, port) = self.list.advance();
                next.list = list;
                port
            }
            FormatCommand::CycleAlignment => {
                let (alignment, port) = self.alignment.advance();
                next.alignment = alignment;
                port
            }
            FormatCommand::TextSize(direction) => {
                next.text_size = self.text_size.step(direction);
                PortCommand::SetTextSize(next.text_size)
            }
        };
        (port, next)
    }
}
