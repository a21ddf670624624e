#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Raw data of one message from the progress stream.
    FrameReceived(String),
    /// The transport could not decode one frame; the stream stays open.
    FrameMalformed(String),
    /// The server closed the stream.
    StreamEnded,
    /// The connection failed or could not be opened.
    TransportFailed(String),
    /// Owner stopped tracking.
    Disposed,
}
