use crate::{
    decode_frame, Effect, FrameDecode, Msg, StopReason, StreamError, TrackerState, TrackingStatus,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    if !state.is_live() {
        // Nothing is processed once tracking has ended, including a second dispose.
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::FrameReceived(data) => {
            match decode_frame(&data) {
                FrameDecode::Event(event) => state.apply_event(&event),
                FrameDecode::Malformed(reason) => state.record_decode_error(reason),
                FrameDecode::Ignored => {}
            }
            Vec::new()
        }
        Msg::FrameMalformed(reason) => {
            state.record_decode_error(reason);
            Vec::new()
        }
        Msg::StreamEnded => {
            if state.current().is_terminal() {
                state.stop(TrackingStatus::Completed);
                close(StopReason::Completed)
            } else {
                let err = StreamError::Transport(format!(
                    "stream closed before finish (last stage {})",
                    state.current()
                ));
                state.stop(TrackingStatus::Failed(err));
                close(StopReason::TransportFailed)
            }
        }
        Msg::TransportFailed(reason) => {
            state.stop(TrackingStatus::Failed(StreamError::Transport(reason)));
            close(StopReason::TransportFailed)
        }
        Msg::Disposed => {
            state.stop(TrackingStatus::Stopped);
            close(StopReason::Disposed)
        }
    };

    (state, effects)
}

fn close(reason: StopReason) -> Vec<Effect> {
    vec![Effect::CloseStream { reason }]
}
