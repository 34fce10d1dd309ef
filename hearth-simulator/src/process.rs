//! Continuations stored in the event queue.

use hearth_core::network::Address;
use hearth_core::resource::Grant;

/// A suspended piece of simulation logic, resumed when its wake-up time arrives.
#[derive(Debug)]
pub enum Process {
    /// Start of a user's day: draw the day's interactions and schedule them.
    PlanDay { user: usize },
    /// A user presses one of their controllers.
    Interact { user: usize },
    /// A communication arrives at `to` after travelling from `from`.
    Deliver {
        interaction: usize,
        sender: Address,
        from: Address,
        to: Address,
    },
    /// A server finishes processing and gives up its slot.
    ServiceComplete {
        interaction: usize,
        sender: Address,
        server: Address,
        grant: Grant,
    },
}
