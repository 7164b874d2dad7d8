use std::collections::VecDeque;
use std::io::{self, BufRead};

/// Iterator over the lines of a buffered reader.
///
/// Unlike [`BufRead::lines`], a lone `\r` also terminates a line (as do `\n`
/// and `\r\n`), and bytes that are not valid UTF-8 are decoded lossily rather
/// than failing the whole read. Terminators are not part of the yielded lines.
pub struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    pending: VecDeque<String>,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    fn fill(&mut self) -> io::Result<bool> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(false);
        }

        let mut chunk = self.buf.as_slice();
        if let Some(rest) = chunk.strip_suffix(b"\n") {
            chunk = rest;
        }
        if let Some(rest) = chunk.strip_suffix(b"\r") {
            chunk = rest;
        }

        self.pending.extend(
            chunk
                .split(|&b| b == b'\r')
                .map(|line| String::from_utf8_lossy(line).into_owned()),
        );
        Ok(true)
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.pending.pop_front() {
            return Some(Ok(line));
        }
        match self.fill() {
            Ok(true) => self.pending.pop_front().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
