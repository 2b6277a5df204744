//! The command engine: single-outstanding-command state machine over a
//! raw HCI byte stream (spec.md §4.3, §5, §7).
//!
//! A controller transport is full duplex and asynchronous: the host writes a
//! command packet and, some time later, an event packet arrives on a
//! possibly different task. There is no HCI-level "cancel a pending
//! command" — a command only ever resolves by its matching Command Complete
//! arriving, or by timing out. [`CommandEngine`] models exactly that: one
//! pending slot, guarded by a mutex because the transport's receive path may
//! call [`CommandEngine::handle_event`] from a different task than the one
//! awaiting [`CommandEngine::execute`].

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::time::timeout;

use crate::codec::HciCommand;
use crate::error::{ExecuteError, HciStatus};
use crate::opcode::event_code;

/// Diagnostic information about bytes the engine could not interpret as a
/// well-formed event, or events it intentionally dropped. Never fatal: a
/// malformed or unrelated event is reported here and otherwise ignored
/// (spec.md §4.3 "never panics on malformed input").
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// Fewer than 2 header bytes, or the declared parameter length does not
    /// match the bytes actually supplied.
    Framing { received: usize },
    /// A Command Complete arrived whose opcode did not match the pending
    /// command (or no command was pending at all).
    UnmatchedCommandComplete { opcode: u16 },
    /// A non-Command-Complete event (e.g. an LE Meta event) was received and
    /// handed to subscribers verbatim.
    Event { code: u8, parameters: Vec<u8> },
}

struct Pending {
    opcode: u16,
    sender: oneshot::Sender<Result<Vec<u8>, ExecuteError>>,
}

struct State {
    pending: Option<Pending>,
}

/// Tracks at most one in-flight HCI command and routes Command Complete
/// events back to whichever caller is awaiting them.
///
/// `send` is supplied by the caller because this crate does not own a
/// transport: it is the host-side protocol engine, not the socket.
pub struct CommandEngine<S>
where
    S: Fn(&[u8]) + Send + Sync,
{
    state: Mutex<State>,
    diagnostics: broadcast::Sender<Diagnostic>,
    send: S,
    timeout: Duration,
}

impl<S> CommandEngine<S>
where
    S: Fn(&[u8]) + Send + Sync,
{
    /// `send` writes a fully framed HCI command packet to the transport.
    /// `timeout` bounds how long [`Self::execute`] waits for a Command
    /// Complete before giving up (spec.md §4.3, §7 liveness).
    pub fn new(send: S, timeout: Duration) -> Self {
        let (diagnostics, _rx) = broadcast::channel(64);
        CommandEngine {
            state: Mutex::new(State { pending: None }),
            diagnostics,
            send,
            timeout,
        }
    }

    /// Subscribe to framing diagnostics and non-command-complete events.
    pub fn diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    /// Encode, send, and await the Command Complete for `C`.
    ///
    /// Returns [`ExecuteError::Busy`] immediately if another command is
    /// already pending (mutual exclusion, spec.md §8 property 1).
    /// Returns [`ExecuteError::Timeout`] if no matching Command Complete
    /// arrives before the configured deadline, and clears the pending slot
    /// so the engine accepts new commands afterward (liveness, spec.md §8
    /// property 7 / scenario S3).
    pub async fn execute<C: HciCommand>(
        &self,
        params: &C::Params,
    ) -> Result<C::Return, ExecuteError> {
        // Busy is checked before anything else (spec.md §4.3 step 1), ahead
        // of encoding parameters that might themselves be rejected.
        {
            let state = self.state.lock().expect("command engine mutex poisoned");
            if state.pending.is_some() {
                return Err(ExecuteError::Busy);
            }
        }

        let encoded = C::encode_params(params)?;

        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().expect("command engine mutex poisoned");
            if state.pending.is_some() {
                return Err(ExecuteError::Busy);
            }
            state.pending = Some(Pending {
                opcode: C::OPCODE,
                sender: tx,
            });
        }

        let packet = encode_command_packet(C::OPCODE, &encoded);
        (self.send)(&packet);

        let outcome = timeout(self.timeout, rx).await;
        match outcome {
            Ok(Ok(Ok(return_bytes))) => C::decode_return(&return_bytes),
            Ok(Ok(Err(err))) => Err(err),
            Ok(Err(_canceled)) => Err(ExecuteError::Timeout),
            Err(_elapsed) => {
                self.clear_pending();
                Err(ExecuteError::Timeout)
            }
        }
    }

    fn clear_pending(&self) {
        let mut state = self.state.lock().expect("command engine mutex poisoned");
        state.pending = None;
    }

    /// Feed one received HCI event packet (`[event_code, param_len,
    /// parameters...]`) to the engine. Synchronous: called directly from the
    /// transport's receive path.
    ///
    /// Never panics. A malformed packet, or an event the engine has no use
    /// for, is reported via [`Self::diagnostics`] and otherwise dropped.
    pub fn handle_event(&self, bytes: &[u8]) {
        if bytes.len() < 2 {
            let _ = self.diagnostics.send(Diagnostic::Framing {
                received: bytes.len(),
            });
            return;
        }
        let event_code = bytes[0];
        let declared_len = bytes[1] as usize;
        let parameters = &bytes[2..];
        if parameters.len() != declared_len {
            let _ = self.diagnostics.send(Diagnostic::Framing {
                received: bytes.len(),
            });
            return;
        }

        if event_code != event_code::COMMAND_COMPLETE {
            let _ = self.diagnostics.send(Diagnostic::Event {
                code: event_code,
                parameters: parameters.to_vec(),
            });
            return;
        }

        self.handle_command_complete(parameters);
    }

    fn handle_command_complete(&self, parameters: &[u8]) {
        // num_hci_command_packets(1) | opcode(2) | status(1) | return_params...
        if parameters.len() < 4 {
            let _ = self.diagnostics.send(Diagnostic::Framing {
                received: parameters.len(),
            });
            return;
        }
        let opcode = u16::from_le_bytes([parameters[1], parameters[2]]);
        let status = HciStatus::from(parameters[3]);
        let return_parameters = &parameters[4..];

        let mut state = self.state.lock().expect("command engine mutex poisoned");
        let matches = matches!(&state.pending, Some(pending) if pending.opcode == opcode);
        if !matches {
            drop(state);
            let _ = self
                .diagnostics
                .send(Diagnostic::UnmatchedCommandComplete { opcode });
            return;
        }

        let pending = state.pending.take().expect("checked Some above");
        let result = if status.is_success() {
            Ok(return_parameters.to_vec())
        } else {
            Err(ExecuteError::Hci(status))
        };
        // The receiver may already be gone (the awaiting future timed out
        // and dropped it); that's fine, there's nothing left to notify.
        let _ = pending.sender.send(result);
    }
}

fn encode_command_packet(opcode: u16, params: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(3 + params.len());
    packet.extend_from_slice(&opcode.to_le_bytes());
    packet.push(params.len() as u8);
    packet.extend_from_slice(params);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::require_len;
    use crate::test_support::command_complete_packet as command_complete;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;

    struct Probe;

    impl HciCommand for Probe {
        type Params = ();
        type Return = u8;
        const OPCODE: u16 = 0x0C03;

        fn encode_params(_: &()) -> Result<Vec<u8>, ExecuteError> {
            Ok(Vec::new())
        }

        fn decode_return(bytes: &[u8]) -> Result<u8, ExecuteError> {
            require_len(bytes, 1)?;
            Ok(bytes[0])
        }
    }

    #[tokio::test]
    async fn test_execute_resolves_on_matching_command_complete() {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let sent_clone = sent.clone();
        let engine = Arc::new(CommandEngine::new(
            move |bytes: &[u8]| sent_clone.lock().unwrap().push(bytes.to_vec()),
            Duration::from_millis(200),
        ));

        let engine_clone = engine.clone();
        let exec = tokio::spawn(async move { engine_clone.execute::<Probe>(&()).await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        engine.handle_event(&command_complete(Probe::OPCODE, 0x00, &[42]));
        assert_eq!(exec.await.unwrap().unwrap(), 42);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_second_command_while_pending_is_busy() {
        let engine = Arc::new(CommandEngine::new(|_: &[u8]| {}, Duration::from_millis(50)));
        let engine_clone = engine.clone();
        let _first = tokio::spawn(async move { engine_clone.execute::<Probe>(&()).await });
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(engine.execute::<Probe>(&()).await, Err(ExecuteError::Busy));
    }

    #[tokio::test]
    async fn test_timeout_clears_pending_state_for_the_next_command() {
        let engine = CommandEngine::new(|_: &[u8]| {}, Duration::from_millis(5));
        assert_eq!(engine.execute::<Probe>(&()).await, Err(ExecuteError::Timeout));
        // engine must accept a new command after timing out
        let reply = command_complete(Probe::OPCODE, 0x00, &[7]);
        let engine = Arc::new(engine);
        let engine_clone = engine.clone();
        let exec = tokio::spawn(async move { engine_clone.execute::<Probe>(&()).await });
        tokio::time::sleep(Duration::from_millis(1)).await;
        engine.handle_event(&reply);
        assert_eq!(exec.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_non_matching_command_complete_is_ignored_not_consumed() {
        let engine = CommandEngine::new(|_: &[u8]| {}, Duration::from_millis(200));
        let mut diagnostics = engine.diagnostics();
        let engine = Arc::new(engine);
        let engine_clone = engine.clone();
        let exec = tokio::spawn(async move { engine_clone.execute::<Probe>(&()).await });
        tokio::time::sleep(Duration::from_millis(1)).await;

        // a Command Complete for a different opcode must not resolve or
        // clear the pending command
        engine.handle_event(&command_complete(0x0C99, 0x00, &[]));
        let diag = diagnostics.recv().await.unwrap();
        assert!(matches!(diag, Diagnostic::UnmatchedCommandComplete { opcode: 0x0C99 }));

        engine.handle_event(&command_complete(Probe::OPCODE, 0x00, &[9]));
        assert_eq!(exec.await.unwrap().unwrap(), 9);
    }

    #[tokio::test]
    async fn test_malformed_event_is_reported_not_panicked_on() {
        let engine = CommandEngine::new(|_: &[u8]| {}, Duration::from_millis(200));
        let mut diagnostics = engine.diagnostics();
        engine.handle_event(&[0x0E]); // too short for a header
        let diag = diagnostics.recv().await.unwrap();
        assert!(matches!(diag, Diagnostic::Framing { .. }));

        engine.handle_event(&[0x0E, 5, 1, 2]); // declared len doesn't match
        let diag = diagnostics.recv().await.unwrap();
        assert!(matches!(diag, Diagnostic::Framing { .. }));
    }

    #[tokio::test]
    async fn test_controller_error_status_surfaces_as_hci_error() {
        let engine = CommandEngine::new(|_: &[u8]| {}, Duration::from_millis(200));
        let engine = Arc::new(engine);
        let engine_clone = engine.clone();
        let exec = tokio::spawn(async move { engine_clone.execute::<Probe>(&()).await });
        tokio::time::sleep(Duration::from_millis(1)).await;
        engine.handle_event(&command_complete(Probe::OPCODE, 0x0C, &[]));
        assert_eq!(
            exec.await.unwrap(),
            Err(ExecuteError::Hci(HciStatus::CommandDisallowed))
        );
    }
}
