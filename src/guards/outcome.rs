use crate::navigation::route::Route;
use futures_util::future::BoxFuture;
use std::fmt;

/// Final verdict of a guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Route),
}

/// Guard result, either known now or after a verification round-trip
///
/// The deferred variant resolves exactly once; [`resolve`](Self::resolve)
/// awaits both variants the same way.
pub enum GuardOutcome {
    Immediate(Navigation),
    Deferred(BoxFuture<'static, Navigation>),
}

impl GuardOutcome {
    pub fn allow() -> Self {
        GuardOutcome::Immediate(Navigation::Allow)
    }

    pub fn redirect(route: Route) -> Self {
        GuardOutcome::Immediate(Navigation::Redirect(route))
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, GuardOutcome::Immediate(_))
    }

    /// The decision if it did not need any request
    pub fn immediate(&self) -> Option<&Navigation> {
        match self {
            GuardOutcome::Immediate(decision) => Some(decision),
            GuardOutcome::Deferred(_) => None,
        }
    }

    pub async fn resolve(self) -> Navigation {
        match self {
            GuardOutcome::Immediate(decision) => decision,
            GuardOutcome::Deferred(pending) => pending.await,
        }
    }
}

impl fmt::Debug for GuardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardOutcome::Immediate(decision) => f.debug_tuple("Immediate").field(decision).finish(),
            GuardOutcome::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
