//! Input stream driven line by line from the test, like an operator typing.
//!
//! Reads block until the test sends a line; dropping the [`Operator`] closes
//! the stream (end-of-input).

use std::io::{self, BufRead, Read};
use std::sync::mpsc;

pub struct Operator(mpsc::Sender<String>);

impl Operator {
    /// Types `line` followed by Enter.
    pub fn type_line(&self, line: &str) {
        self.0.send(format!("{}\n", line)).expect("input reader dropped");
    }
}

pub struct OperatorInput {
    rx: mpsc::Receiver<String>,
    buf: Vec<u8>,
    pos: usize,
}

pub fn operator() -> (Operator, OperatorInput) {
    let (tx, rx) = mpsc::channel();
    (
        Operator(tx),
        OperatorInput {
            rx,
            buf: Vec::new(),
            pos: 0,
        },
    )
}

impl Read for OperatorInput {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for OperatorInput {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.buf.len() {
            match self.rx.recv() {
                Ok(line) => {
                    self.buf = line.into_bytes();
                    self.pos = 0;
                }
                Err(_) => return Ok(&[]),
            }
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}
