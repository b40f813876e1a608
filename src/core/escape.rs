//! Tilde escape detection on bytes typed at the local terminal.
//!
//! An escape is only recognised right after a carriage return, so a `~`
//! in the middle of a line always reaches the device.

pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';
pub const ESCAPE_CHAR: u8 = b'~';

/// Where the classifier is within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    /// Somewhere in the middle of a line
    Idle,
    /// The previous byte ended a line
    AfterNewline,
    /// `~` seen at the start of a line, next byte selects a command
    AwaitingCommand,
}

/// What to do with one byte of local input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Send the byte to the device
    Forward,
    /// The escape character itself; swallowed
    EscapeTrigger,
    /// Command selector following the escape character; swallowed
    CommandByte(u8),
}

#[derive(Debug, Clone)]
pub struct EscapeStateMachine {
    state: EscapeState,
    interactive: bool,
}

impl EscapeStateMachine {
    /// A session starts as if a line had just ended, so `~` as the very
    /// first keystroke is an escape.
    pub fn new(interactive: bool) -> Self {
        Self {
            state: EscapeState::AfterNewline,
            interactive,
        }
    }

    pub fn state(&self) -> EscapeState {
        self.state
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn classify(&mut self, byte: u8) -> Classification {
        // Redirected input is data, never commands.
        if !self.interactive {
            return Classification::Forward;
        }

        let (classification, next) = match (self.state, byte) {
            (EscapeState::Idle, CR) => (Classification::Forward, EscapeState::AfterNewline),
            (EscapeState::Idle, _) => (Classification::Forward, EscapeState::Idle),
            (EscapeState::AfterNewline, ESCAPE_CHAR) => {
                (Classification::EscapeTrigger, EscapeState::AwaitingCommand)
            }
            (EscapeState::AfterNewline, CR) => (Classification::Forward, EscapeState::AfterNewline),
            (EscapeState::AfterNewline, _) => (Classification::Forward, EscapeState::Idle),
            (EscapeState::AwaitingCommand, selector) => {
                (Classification::CommandByte(selector), EscapeState::AfterNewline)
            }
        };

        self.state = next;
        classification
    }
}

/// Expand a forwarded byte for the line: CR goes out as CR LF.
pub fn expand_outbound(byte: u8, out: &mut Vec<u8>) {
    out.push(byte);
    if byte == CR {
        out.push(LF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classify_all(machine: &mut EscapeStateMachine, bytes: &[u8]) -> Vec<Classification> {
        bytes.iter().map(|&b| machine.classify(b)).collect()
    }

    fn mid_line() -> EscapeStateMachine {
        let mut machine = EscapeStateMachine::new(true);
        machine.classify(b'x');
        machine
    }

    #[test]
    fn test_initial_state() {
        let machine = EscapeStateMachine::new(true);
        assert_eq!(machine.state(), EscapeState::AfterNewline);
        assert!(machine.is_interactive());
    }

    #[test]
    fn test_transition_table() {
        let cases = [
            (EscapeState::Idle, CR, Classification::Forward, EscapeState::AfterNewline),
            (EscapeState::Idle, b'a', Classification::Forward, EscapeState::Idle),
            (EscapeState::Idle, b'~', Classification::Forward, EscapeState::Idle),
            (EscapeState::AfterNewline, b'~', Classification::EscapeTrigger, EscapeState::AwaitingCommand),
            (EscapeState::AfterNewline, CR, Classification::Forward, EscapeState::AfterNewline),
            (EscapeState::AfterNewline, LF, Classification::Forward, EscapeState::Idle),
            (EscapeState::AwaitingCommand, b'.', Classification::CommandByte(b'.'), EscapeState::AfterNewline),
            (EscapeState::AwaitingCommand, CR, Classification::CommandByte(CR), EscapeState::AfterNewline),
        ];

        for (from, byte, expected, to) in cases {
            let mut machine = EscapeStateMachine { state: from, interactive: true };
            assert_eq!(machine.classify(byte), expected, "{:?} on {:#04x}", from, byte);
            assert_eq!(machine.state(), to, "{:?} on {:#04x}", from, byte);
        }
    }

    #[test]
    fn test_tilde_mid_line_is_forwarded() {
        let mut machine = mid_line();
        let result = classify_all(&mut machine, b"a~b");
        assert!(result.iter().all(|c| *c == Classification::Forward));
    }

    #[test]
    fn test_escape_after_carriage_return() {
        let mut machine = mid_line();
        let result = classify_all(&mut machine, b"\r~q");
        assert_eq!(
            result,
            vec![
                Classification::Forward,
                Classification::EscapeTrigger,
                Classification::CommandByte(b'q'),
            ]
        );
        assert_eq!(machine.state(), EscapeState::AfterNewline);
    }

    #[test]
    fn test_double_tilde_selects_tilde() {
        let mut machine = EscapeStateMachine::new(true);
        let result = classify_all(&mut machine, b"~~");
        assert_eq!(
            result,
            vec![Classification::EscapeTrigger, Classification::CommandByte(b'~')]
        );
    }

    #[test]
    fn test_escape_can_follow_escape() {
        let mut machine = EscapeStateMachine::new(true);
        let result = classify_all(&mut machine, b"~?~.");
        assert_eq!(
            result,
            vec![
                Classification::EscapeTrigger,
                Classification::CommandByte(b'?'),
                Classification::EscapeTrigger,
                Classification::CommandByte(b'.'),
            ]
        );
    }

    #[test]
    fn test_line_feed_does_not_arm_escape() {
        let mut machine = mid_line();
        let result = classify_all(&mut machine, b"\n~");
        assert_eq!(result, vec![Classification::Forward, Classification::Forward]);
    }

    #[test]
    fn test_non_interactive_forwards_everything() {
        let mut machine = EscapeStateMachine::new(false);
        let result = classify_all(&mut machine, b"~.\r~q\r\r~~");
        assert!(result.iter().all(|c| *c == Classification::Forward));
    }

    #[test]
    fn test_expand_outbound() {
        let mut out = Vec::new();
        for &b in b"hi\r" {
            expand_outbound(b, &mut out);
        }
        assert_eq!(out, b"hi\r\n");
    }

    fn contains_escape(bytes: &[u8]) -> bool {
        bytes.windows(2).any(|w| w == [CR, ESCAPE_CHAR])
    }

    proptest! {
        #[test]
        fn prop_no_escape_without_cr_tilde(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assume!(!contains_escape(&bytes));
            let mut machine = mid_line();
            for b in bytes {
                prop_assert_eq!(machine.classify(b), Classification::Forward);
            }
        }

        #[test]
        fn prop_cr_tilde_then_any_byte(prefix in proptest::collection::vec(any::<u8>(), 0..64), selector in any::<u8>()) {
            prop_assume!(!contains_escape(&prefix));
            prop_assume!(prefix.last() != Some(&CR));
            let mut machine = mid_line();
            for b in prefix {
                machine.classify(b);
            }
            prop_assert_eq!(machine.classify(CR), Classification::Forward);
            prop_assert_eq!(machine.classify(ESCAPE_CHAR), Classification::EscapeTrigger);
            prop_assert_eq!(machine.classify(selector), Classification::CommandByte(selector));
            prop_assert_eq!(machine.state(), EscapeState::AfterNewline);
        }

        #[test]
        fn prop_redirected_input_never_escapes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut machine = EscapeStateMachine::new(false);
            for b in bytes {
                prop_assert_eq!(machine.classify(b), Classification::Forward);
            }
        }

        #[test]
        fn prop_outbound_expansion_only_adds_lf_after_cr(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut out = Vec::new();
            for &b in &bytes {
                expand_outbound(b, &mut out);
            }
            let mut restored = Vec::new();
            let mut iter = out.iter().copied();
            while let Some(b) = iter.next() {
                restored.push(b);
                if b == CR {
                    prop_assert_eq!(iter.next(), Some(LF));
                }
            }
            prop_assert_eq!(restored, bytes);
        }
    }
}
