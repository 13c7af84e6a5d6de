pub mod calls;
pub mod error;
pub mod replies;


pub use calls::{Call, CallArgs, CallId};
pub use error::{Result, TaskwireError};
pub use replies::{Outcome, Reply};

/// Reserved action name used for the discovery handshake.
///
/// The worker always answers this action with the list of registered action
/// names (the reserved name itself excluded). Callers send it once, before
/// building their proxy surface, and never expose it as a proxy function.
pub const DISCOVER_ACTION: &str = "_getFunctionality";
