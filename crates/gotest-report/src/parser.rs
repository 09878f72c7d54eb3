// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Turning an input stream into events
//!
//! Both input formats implement [`EventParser`]; [`drive`] feeds a stream
//! through one line at a time.

use std::io::BufRead;

use tracing::trace;

use crate::config::InputFormat;
use crate::error::ReportError;
use crate::event::Event;
use crate::gojson::GoJsonParser;
use crate::gotest::GoTestParser;

/// Converts input lines into events
pub trait EventParser {
    /// Process a single line, without its terminator
    fn process_line(&mut self, line: &str) -> Vec<Event>;

    /// Flush anything still buffered at end of input
    fn finish(&mut self) -> Vec<Event> {
        Vec::new()
    }
}

/// Create the parser for an input format
#[must_use]
pub fn parser_for(format: InputFormat) -> Box<dyn EventParser> {
    match format {
        InputFormat::GoTest => Box::new(GoTestParser::new()),
        InputFormat::GoJson => Box::new(GoJsonParser::new()),
    }
}

/// Feed every line of `reader` through `parser`, handing each event to `sink`
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Errors
///
/// Returns `ReportError::Io` if reading from `reader` fails.
pub fn drive<R, F>(mut reader: R, parser: &mut dyn EventParser, mut sink: F) -> Result<(), ReportError>
where
    R: BufRead,
    F: FnMut(Event),
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.strip_suffix('\n').unwrap_or(&*text);
        let line = line.strip_suffix('\r').unwrap_or(line);
        for event in parser.process_line(line) {
            trace!(%event, "parsed event");
            sink(event);
        }
    }
    for event in parser.finish() {
        trace!(%event, "parsed event");
        sink(event);
    }
    Ok(())
}

/// Parse a whole stream into a list of events
///
/// # Errors
///
/// Returns `ReportError::Io` if reading from `reader` fails.
pub fn parse_events<R: BufRead>(reader: R, format: InputFormat) -> Result<Vec<Event>, ReportError> {
    let mut parser = parser_for(format);
    let mut events = Vec::new();
    drive(reader, parser.as_mut(), |event| events.push(event))?;
    Ok(events)
}
