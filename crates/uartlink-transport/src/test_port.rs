//! In-memory `SerialPort` for driver unit tests.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

/// One settings or modem-line change seen by a [`FakePort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCall {
    BaudRate(u32),
    StopBits(StopBits),
    Parity(Parity),
    Rts(bool),
    Dtr(bool),
    SetBreak,
    ClearBreak,
    Flush,
}

#[derive(Debug, Default)]
struct PortState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    calls: Vec<PortCall>,
}

/// A port whose reads come from a queue and whose writes are recorded.
///
/// Reads on an empty queue fail with `TimedOut`, like a real port whose read
/// timeout expired.
#[derive(Debug, Clone, Default)]
pub struct FakePort {
    state: Arc<Mutex<PortState>>,
}

impl FakePort {
    pub fn push_rx(&self, bytes: &[u8]) {
        self.state.lock().unwrap().rx.extend(bytes);
    }

    pub fn tx(&self) -> Vec<u8> {
        self.state.lock().unwrap().tx.clone()
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn boxed(&self) -> Box<dyn SerialPort> {
        Box::new(self.clone())
    }

    fn record(&self, call: PortCall) -> serialport::Result<()> {
        self.state.lock().unwrap().calls.push(call);
        Ok(())
    }
}

impl Read for FakePort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        if state.rx.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));
        }
        let n = buf.len().min(state.rx.len());
        for slot in buf.iter_mut().take(n) {
            *slot = state.rx.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for FakePort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.lock().unwrap().tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().calls.push(PortCall::Flush);
        Ok(())
    }
}

impl SerialPort for FakePort {
    fn name(&self) -> Option<String> {
        Some("fake".to_string())
    }

    fn baud_rate(&self) -> serialport::Result<u32> {
        Ok(57_600)
    }

    fn data_bits(&self) -> serialport::Result<DataBits> {
        Ok(DataBits::Eight)
    }

    fn flow_control(&self) -> serialport::Result<FlowControl> {
        Ok(FlowControl::None)
    }

    fn parity(&self) -> serialport::Result<Parity> {
        Ok(Parity::None)
    }

    fn stop_bits(&self) -> serialport::Result<StopBits> {
        Ok(StopBits::One)
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(10)
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> serialport::Result<()> {
        self.record(PortCall::BaudRate(baud_rate))
    }

    fn set_data_bits(&mut self, _data_bits: DataBits) -> serialport::Result<()> {
        Ok(())
    }

    fn set_flow_control(&mut self, _flow_control: FlowControl) -> serialport::Result<()> {
        Ok(())
    }

    fn set_parity(&mut self, parity: Parity) -> serialport::Result<()> {
        self.record(PortCall::Parity(parity))
    }

    fn set_stop_bits(&mut self, stop_bits: StopBits) -> serialport::Result<()> {
        self.record(PortCall::StopBits(stop_bits))
    }

    fn set_timeout(&mut self, _timeout: Duration) -> serialport::Result<()> {
        Ok(())
    }

    fn write_request_to_send(&mut self, level: bool) -> serialport::Result<()> {
        self.record(PortCall::Rts(level))
    }

    fn write_data_terminal_ready(&mut self, level: bool) -> serialport::Result<()> {
        self.record(PortCall::Dtr(level))
    }

    fn read_clear_to_send(&mut self) -> serialport::Result<bool> {
        Ok(false)
    }

    fn read_data_set_ready(&mut self) -> serialport::Result<bool> {
        Ok(false)
    }

    fn read_ring_indicator(&mut self) -> serialport::Result<bool> {
        Ok(false)
    }

    fn read_carrier_detect(&mut self) -> serialport::Result<bool> {
        Ok(false)
    }

    fn bytes_to_read(&self) -> serialport::Result<u32> {
        Ok(self.state.lock().unwrap().rx.len() as u32)
    }

    fn bytes_to_write(&self) -> serialport::Result<u32> {
        Ok(0)
    }

    fn clear(&self, _buffer_to_clear: ClearBuffer) -> serialport::Result<()> {
        Ok(())
    }

    fn try_clone(&self) -> serialport::Result<Box<dyn SerialPort>> {
        Ok(self.boxed())
    }

    fn set_break(&self) -> serialport::Result<()> {
        self.record(PortCall::SetBreak)
    }

    fn clear_break(&self) -> serialport::Result<()> {
        self.record(PortCall::ClearBreak)
    }
}
