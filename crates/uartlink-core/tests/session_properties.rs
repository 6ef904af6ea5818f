//! End-to-end behaviour of a session driven through the mock harness.

use uartlink_core::{BackendKind, ControlCommand, FrameDirection, SessionBuilder, StopBits};
use uartlink_test_harness::{
    DELIMITER, ManualClock, MockOneWire, MockUart, OneWireEvent, ScriptedDecoder, UartEvent,
};

#[test]
fn bytes_arrive_in_order_with_non_decreasing_timestamps() {
    let uart = MockUart::new();
    let payload: Vec<u8> = (1..=40).collect();
    uart.push_rx(&payload);

    let clock = ManualClock::stepping(1_000, 2);
    let mut buffer = [0u8; 64];
    let mut session = SessionBuilder::new()
        .clock(clock)
        .begin_hardware(uart.clone(), &mut buffer, ScriptedDecoder::new())
        .unwrap();

    assert_eq!(session.feed(), None);

    let received = session.decoder().received();
    let bytes: Vec<u8> = received.iter().map(|(b, _)| *b).collect();
    assert_eq!(bytes, payload);
    assert!(received.windows(2).all(|w| w[0].1 <= w[1].1));
    assert_eq!(uart.rx_remaining(), 0);
}

#[test]
fn no_duplicate_completion_after_rearm() {
    let uart = MockUart::new();
    uart.push_rx(&[0x01, 0x02, DELIMITER]);

    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_hardware(uart.clone(), &mut buffer, ScriptedDecoder::new())
            .unwrap();

    let info = session.feed().unwrap();
    assert_eq!(info.length, 2);
    assert_eq!(session.frame(&info), &[0x01, 0x02]);

    assert_eq!(session.feed(), None);
    assert_eq!(session.feed(), None);
    assert_eq!(session.decoder().completed().len(), 1);
}

#[test]
fn feed_returns_promptly_at_frame_boundary() {
    let uart = MockUart::new();
    uart.push_rx(&[0x01, DELIMITER, 0x02, 0x03, DELIMITER]);

    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_hardware(uart.clone(), &mut buffer, ScriptedDecoder::new())
            .unwrap();

    assert_eq!(session.feed().map(|i| i.length), Some(1));
    // The second frame is still waiting in the backend.
    assert_eq!(uart.rx_remaining(), 3);
    assert_eq!(session.feed().map(|i| i.length), Some(2));
    assert_eq!(uart.rx_remaining(), 0);
}

#[test]
fn rearm_reuses_the_same_buffer() {
    let uart = MockUart::new();
    uart.push_rx(&[1, DELIMITER, 2, DELIMITER, 3, DELIMITER]);

    let mut buffer = [0u8; 32];
    let expected = (buffer.as_ptr() as usize, buffer.len());
    let mut session =
        uartlink_core::Session::begin_hardware(uart, &mut buffer, ScriptedDecoder::new()).unwrap();

    while session.feed().is_some() {}

    let armed = session.decoder().armed();
    assert_eq!(armed.len(), 4);
    assert!(armed.iter().all(|&a| a == expected));
}

#[test]
fn hardware_quirk_baud_is_never_programmed() {
    let uart = MockUart::new();
    uart.push_rx(&[0x55]);

    let decoder = ScriptedDecoder::new().on_byte(0x55, &[ControlCommand::SetBaudRate(57_600)]);
    let mut buffer = [0u8; 16];
    let mut session = SessionBuilder::new()
        .initial_baud(57_600)
        .begin_hardware(uart.clone(), &mut buffer, decoder)
        .unwrap();
    session.feed();

    let begins: Vec<UartEvent> = uart
        .events()
        .into_iter()
        .filter(|e| matches!(e, UartEvent::Begin(_)))
        .collect();
    assert_eq!(begins, vec![UartEvent::Begin(57_601), UartEvent::Begin(57_601)]);
    assert_eq!(uart.baud_rate(), Some(57_601));
}

#[test]
fn software_parity_maps_to_break() {
    let line = MockOneWire::new();
    line.push_rx(&[0xE0, 0xE1]);

    let decoder = ScriptedDecoder::new()
        .on_byte(0xE0, &[ControlCommand::SetParityEven])
        .on_byte(0xE1, &[ControlCommand::SetParityNone]);
    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_software(line.clone(), &mut buffer, decoder).unwrap();
    assert_eq!(session.backend_kind(), BackendKind::Software);

    session.feed();

    assert_eq!(
        line.events(),
        vec![
            OneWireEvent::Begin {
                stop_bits: StopBits::One,
                baud_rate: 57_600,
            },
            OneWireEvent::Break(true),
            OneWireEvent::Break(false),
        ]
    );
    assert!(!line.is_break_enabled());
}

#[test]
fn control_takes_effect_before_next_byte() {
    let line = MockOneWire::new();
    line.push_rx(&[0xE0, 0x01]);

    let decoder = ScriptedDecoder::new().on_byte(0xE0, &[ControlCommand::SetBaudRate(9_600)]);
    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_software(line.clone(), &mut buffer, decoder).unwrap();

    session.feed();
    assert_eq!(line.baud_rate(), Some(9_600));
    assert_eq!(session.decoder().received().len(), 2);
}

#[test]
fn disable_tx_drains_output_first() {
    let uart = MockUart::new();
    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_hardware(uart.clone(), &mut buffer, ScriptedDecoder::new())
            .unwrap();

    assert!(session.write(&[0x10, 0x20, 0x30]));

    assert!(uart.truncated().is_empty());
    assert!(uart.pending().is_empty());
    assert_eq!(uart.sent(), vec![0x10, 0x20, 0x30, DELIMITER]);
    assert!(!uart.is_tx_enabled());

    let tail: Vec<UartEvent> = uart.events().into_iter().rev().take(2).collect();
    assert_eq!(tail, vec![UartEvent::TxEnabled(false), UartEvent::Flush]);
}

#[test]
fn connection_follows_handshake() {
    let uart = MockUart::new();
    let mut buffer = [0u8; 16];
    let mut session = uartlink_core::Session::begin_hardware(
        uart.clone(),
        &mut buffer,
        ScriptedDecoder::new().handshake(b"HELLO"),
    )
    .unwrap();

    assert!(!session.is_connected());
    assert_eq!(session.feed(), None);
    assert!(!session.is_connected());

    uart.push_rx(b"HELLO");
    uart.push_rx(&[DELIMITER]);
    let info = session.feed().unwrap();
    assert_eq!(info.direction, FrameDirection::Incoming);
    assert!(session.is_connected());
}

#[test]
fn write_is_refused_mid_frame_and_accepted_after() {
    let uart = MockUart::new();
    uart.push_rx(&[0x01]);
    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_hardware(uart.clone(), &mut buffer, ScriptedDecoder::new())
            .unwrap();

    assert_eq!(session.feed(), None);
    assert!(!session.write(&[0xAA]));
    assert!(uart.written().is_empty());

    uart.push_rx(&[DELIMITER]);
    assert!(session.feed().is_some());
    assert!(session.write(&[0xAA]));
    assert_eq!(uart.written(), vec![0xAA, DELIMITER]);
}

#[test]
fn notify_goes_out_on_the_active_backend() {
    let line = MockOneWire::new();
    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_software(line.clone(), &mut buffer, ScriptedDecoder::new())
            .unwrap();

    session.notify();
    session.notify();
    assert_eq!(line.sent(), vec![DELIMITER, DELIMITER]);
    assert_eq!(session.decoder().notifications(), 2);
}

#[test]
fn single_wire_echo_reads_back() {
    let line = MockOneWire::new().with_echo();
    let mut buffer = [0u8; 16];
    let mut session = uartlink_core::Session::begin_software(
        line.clone(),
        &mut buffer,
        ScriptedDecoder::new().readback(true),
    )
    .unwrap();

    assert!(session.write(&[0x42, 0x43]));
    let info = session.feed().unwrap();
    assert_eq!(info.direction, FrameDirection::Readback);
    assert!(!info.is_incoming());
    assert_eq!(session.frame(&info), &[0x42, 0x43]);

    line.push_rx(&[0x01, DELIMITER]);
    assert!(session.feed().unwrap().is_incoming());
}

#[test]
fn backend_selection_is_sticky() {
    let uart = MockUart::new();
    let line = MockOneWire::new();
    // Hardware pins see traffic too, but the session is bound to the wire.
    uart.push_rx(&[0x99, DELIMITER]);
    line.push_rx(&[0x01, DELIMITER]);

    let decoder = ScriptedDecoder::new().on_byte(0x01, &[ControlCommand::SetParityEven]);
    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_software(line.clone(), &mut buffer, decoder).unwrap();

    let info = session.feed().unwrap();
    assert_eq!(session.frame(&info), &[0x01]);
    assert!(session.write(&[0x02]));
    session.notify();
    assert_eq!(session.feed(), None);

    assert!(uart.events().is_empty());
    assert_eq!(uart.rx_remaining(), 2);
    assert!(line.is_break_enabled());
    assert_eq!(line.sent(), vec![0x02, DELIMITER, DELIMITER]);
}

#[test]
fn restart_rebinds_backend_and_reinitializes() {
    let line = MockOneWire::new();
    let uart = MockUart::new();
    let mut buffer = [0u8; 16];
    let expected = (buffer.as_ptr() as usize, buffer.len());
    let mut session = SessionBuilder::new()
        .initial_baud(115_200)
        .begin_software(line.clone(), &mut buffer, ScriptedDecoder::new())
        .unwrap();

    session.restart_hardware(uart.clone());
    assert_eq!(session.backend_kind(), BackendKind::Hardware);
    assert_eq!(session.decoder().initialized(), &[115_200, 115_200]);
    assert!(session.decoder().armed().iter().all(|&a| a == expected));

    assert!(session.write(&[0x07]));
    assert_eq!(uart.sent(), vec![0x07, DELIMITER]);
    assert!(line.sent().is_empty());
    assert_eq!(uart.baud_rate(), Some(115_200));
}

#[test]
fn partial_frame_survives_across_feeds() {
    let uart = MockUart::new();
    let clock = ManualClock::new(0);
    let mut buffer = [0u8; 16];
    let mut session = SessionBuilder::new()
        .clock(clock.clone())
        .begin_hardware(
            uart.clone(),
            &mut buffer,
            ScriptedDecoder::new().inter_byte_timeout(100),
        )
        .unwrap();

    uart.push_rx(&[0x01, 0x02]);
    assert_eq!(session.feed(), None);

    clock.advance(20);
    uart.push_rx(&[0x03, DELIMITER]);
    let info = session.feed().unwrap();
    assert_eq!(session.frame(&info), &[0x01, 0x02, 0x03]);

    uart.push_rx(&[0x04]);
    assert_eq!(session.feed(), None);
    clock.advance(500);
    uart.push_rx(&[0x05, DELIMITER]);
    let info = session.feed().unwrap();
    assert_eq!(session.frame(&info), &[0x05]);
    assert_eq!(session.decoder().timeouts(), 1);
}

#[test]
fn unplugged_uart_reads_as_idle() {
    let uart = MockUart::new();
    let mut buffer = [0u8; 16];
    let mut session =
        uartlink_core::Session::begin_hardware(uart.clone(), &mut buffer, ScriptedDecoder::new())
            .unwrap();

    uart.push_rx(&[0x01, DELIMITER]);
    uart.set_connected(false);
    assert_eq!(session.feed(), None);

    uart.set_connected(true);
    assert!(session.feed().is_some());
}
