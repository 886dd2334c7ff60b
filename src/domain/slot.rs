//! Single-slot storage for the deferred call.
//!
//! Only the most recent deferred call is kept. A new call replaces whatever was
//! pending, and only the first deferral of a window asks for a timer.

/// A captured call: the receiver it should be replayed against and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<C, A> {
    /// Invocation context (the receiver of the call)
    pub context: C,
    /// Arguments of the call
    pub args: A,
}

impl<C, A> Call<C, A> {
    /// Capture a call.
    pub fn new(context: C, args: A) -> Self {
        Self { context, args }
    }

    /// Split the call back into its context and arguments.
    pub fn into_parts(self) -> (C, A) {
        (self.context, self.args)
    }
}

/// Outcome of offering a call to the pending slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The slot was idle; the caller must arm a timer
    Armed,
    /// A timer is already armed; the previous pending call was replaced
    Coalesced,
}

/// Holds at most one pending call and tracks whether a flush is armed.
///
/// # Example
/// ```
/// use call_throttle::{Call, PendingSlot, SlotOutcome};
///
/// let mut slot = PendingSlot::new();
/// assert_eq!(slot.offer(Call::new((), 1)), SlotOutcome::Armed);
/// assert_eq!(slot.offer(Call::new((), 2)), SlotOutcome::Coalesced);
/// assert_eq!(slot.offer(Call::new((), 3)), SlotOutcome::Coalesced);
///
/// // The flush sees only the latest call
/// assert_eq!(slot.fire(), Some(Call::new((), 3)));
/// assert!(!slot.is_armed());
/// ```
#[derive(Debug)]
pub struct PendingSlot<C, A> {
    pending: Option<Call<C, A>>,
    armed: bool,
}

impl<C, A> PendingSlot<C, A> {
    /// Create an idle, empty slot.
    pub fn new() -> Self {
        Self {
            pending: None,
            armed: false,
        }
    }

    /// Store `call` as the pending call, replacing any previous one.
    ///
    /// Returns `SlotOutcome::Armed` exactly once per window: the caller that
    /// receives it is responsible for scheduling the flush.
    pub fn offer(&mut self, call: Call<C, A>) -> SlotOutcome {
        self.pending = Some(call);
        if self.armed {
            SlotOutcome::Coalesced
        } else {
            self.armed = true;
            SlotOutcome::Armed
        }
    }

    /// Disarm the slot and take the pending call for execution.
    pub fn fire(&mut self) -> Option<Call<C, A>> {
        self.armed = false;
        self.pending.take()
    }

    /// Check if a flush is currently armed.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The call that would run if the timer fired now.
    pub fn pending(&self) -> Option<&Call<C, A>> {
        self.pending.as_ref()
    }
}

impl<C, A> Default for PendingSlot<C, A> {
    fn default() -> Self {
        Self::new()
    }
}
