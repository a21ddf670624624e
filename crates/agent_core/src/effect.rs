#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Release the stream connection. Emitted at most once per tracker.
    CloseStream { reason: StopReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Disposed,
    Completed,
    TransportFailed,
}
