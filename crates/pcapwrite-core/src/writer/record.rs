use std::io::{self, Write};

/// Writes the segments of one record and counts the bytes that got through.
pub(crate) struct RecordSink<'a, W: Write> {
    inner: &'a mut W,
    written: usize,
}

impl<'a, W: Write> RecordSink<'a, W> {
    pub(crate) fn new(inner: &'a mut W) -> Self {
        Self { inner, written: 0 }
    }

    /// Write all of `bytes`, retrying on `Interrupted`.
    ///
    /// A zero-length write is reported as `WriteZero`.
    pub(crate) fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut remaining = bytes;
        while !remaining.is_empty() {
            match self.inner.write(remaining) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "short write to pcap file",
                    ));
                }
                Ok(n) => {
                    self.written += n;
                    remaining = &remaining[n..];
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::RecordSink;
    use crate::storage::testing::BudgetHandle;

    #[test]
    fn put_loops_over_partial_writes() {
        let mut handle = BudgetHandle::new(100);
        let mut sink = RecordSink::new(&mut handle);
        sink.put(&[7u8; 30]).unwrap();
        assert_eq!(sink.written(), 30);
        assert_eq!(handle.data, vec![7u8; 30]);
    }

    #[test]
    fn put_retries_interrupted() {
        let mut handle = BudgetHandle {
            interrupt: true,
            ..BudgetHandle::new(100)
        };
        let mut sink = RecordSink::new(&mut handle);
        sink.put(&[1u8; 20]).unwrap();
        assert_eq!(sink.written(), 20);
    }

    #[test]
    fn zero_length_write_is_an_error() {
        let mut handle = BudgetHandle {
            short: true,
            ..BudgetHandle::new(10)
        };
        let mut sink = RecordSink::new(&mut handle);
        let err = sink.put(&[0u8; 16]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
        assert_eq!(sink.written(), 10);
    }
}
