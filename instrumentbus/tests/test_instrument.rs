//! Tests for the [`Instrument`] bus and the default implementations of the
//! [`InstrumentBus`] trait.

use std::{collections::VecDeque, time::Duration};

use rstest::*;

use instrumentbus::{Instrument, InstrumentBus, InstrumentError};

/// A bus that only provides the required trait methods, to exercise the defaults.
struct MinimalBus {}

impl InstrumentBus for MinimalBus {
    fn write_raw(&mut self, _data: &[u8]) -> Result<(), InstrumentError> {
        Ok(())
    }

    fn read_exact(&mut self, _buf: &mut [u8]) -> Result<(), InstrumentError> {
        Ok(())
    }
}

/// Set up an empty instrument with the default three second timeout.
#[fixture]
fn empt_inst() -> Instrument<VecDeque<u8>> {
    Instrument::new(VecDeque::new(), Duration::from_secs(3))
}

/// Set up an instrument with a pending response that carries no terminator and a zero
/// timeout duration.
#[fixture]
fn no_term_inst() -> Instrument<VecDeque<u8>> {
    Instrument::new(
        VecDeque::from(vec![b'r', b'e', b's', b'p']),
        Duration::from_secs(0),
    )
}

#[rstest]
fn test_default_get_terminator() {
    let bus = MinimalBus {};
    assert_eq!(bus.get_terminator(), "\n");
}

#[rstest]
fn test_default_get_timeout() {
    let bus = MinimalBus {};
    assert_eq!(bus.get_timeout(), Duration::from_secs(3));
}

#[rstest]
fn test_instrument_terminator(mut empt_inst: Instrument<VecDeque<u8>>) {
    assert_eq!(empt_inst.get_terminator(), "\n");

    empt_inst.set_terminator("\r\n");
    assert_eq!(empt_inst.get_terminator(), "\r\n");
}

#[rstest]
fn test_instrument_timeout(empt_inst: Instrument<VecDeque<u8>>) {
    assert_eq!(empt_inst.get_timeout(), Duration::from_secs(3));
}

#[rstest]
fn test_instrument_write_read(mut empt_inst: Instrument<VecDeque<u8>>) {
    let data = b"Hello, Instrument!";
    empt_inst.write_raw(data).unwrap();

    let mut buf = vec![0; data.len()];
    empt_inst.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, data);
}

/// A query over a `VecDeque` port reads back the pending line, terminator stripped.
#[rstest]
fn test_instrument_query() {
    let port = VecDeque::from(b"5.000000E+00\n".to_vec());
    let mut inst = Instrument::new(port, Duration::from_secs(3));

    let resp = inst.query("print(level)").unwrap();
    assert_eq!(resp, "5.000000E+00");
}

#[rstest]
fn test_instrument_read_until_terminator_timeout(mut no_term_inst: Instrument<VecDeque<u8>>) {
    let timeout_exp = Duration::from_secs(0);

    match no_term_inst.read_until_terminator() {
        Err(InstrumentError::Timeout(timeout)) => {
            assert_eq!(timeout_exp, timeout);
        }
        _ => panic!("Expected timeout error, but got a different result."),
    }
}

#[rstest]
fn test_instrument_query_timeout(mut no_term_inst: Instrument<VecDeque<u8>>) {
    let timeout_exp = Duration::from_secs(0);
    let query_exp = "QUERY";

    match no_term_inst.query(query_exp) {
        Err(InstrumentError::TimeoutQuery { query, timeout }) => {
            assert_eq!(query_exp, query);
            assert_eq!(timeout_exp, timeout);
        }
        _ => panic!("Expected timeout error, but got a different result."),
    }
}
