//! Closed enumerations describing vertex and transition flavours.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The flavour of a pseudo-state; determines what happens when it is entered.
///
/// | Kind | On entry |
/// |---|---|
/// | `Initial` | follows its single unguarded transition |
/// | `ShallowHistory` | restores the region's last active state, else its default |
/// | `DeepHistory` | as `ShallowHistory`, forcing history into nested regions |
/// | `Junction` | first passing guard in declaration order, else the `else` |
/// | `Choice` | as `Junction`, guard order is configurable |
/// | `Terminate` | sink; the region accepts no further triggers |
/// | `EntryPoint` / `ExitPoint` | pass-through, as `Junction` |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PseudoStateKind {
    Initial,
    ShallowHistory,
    DeepHistory,
    Junction,
    Choice,
    Terminate,
    EntryPoint,
    ExitPoint,
}

impl PseudoStateKind {
    /// True for the two history kinds.
    pub fn is_history(self) -> bool {
        matches!(self, Self::ShallowHistory | Self::DeepHistory)
    }

    /// True for kinds that may act as a region's initial vertex.
    pub fn is_starting(self) -> bool {
        matches!(self, Self::Initial) || self.is_history()
    }

    /// True for kinds that may carry an `else` transition.
    pub fn is_branch(self) -> bool {
        matches!(self, Self::Junction | Self::Choice)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::ShallowHistory => "shallow-history",
            Self::DeepHistory => "deep-history",
            Self::Junction => "junction",
            Self::Choice => "choice",
            Self::Terminate => "terminate",
            Self::EntryPoint => "entry-point",
            Self::ExitPoint => "exit-point",
        }
    }
}

impl fmt::Display for PseudoStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a transition traverses the containment tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// The source is exited, the effect runs, then the target is entered.
    #[default]
    External,

    /// The target lies inside the source; the source itself is not exited.
    Local,

    /// Only the effect runs; the active configuration is untouched.
    Internal,
}
