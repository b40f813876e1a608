use std::io::{self, Write};
use tokio::io::{AsyncRead, AsyncWrite};

/// Byte source the relay reads from (local input)
pub trait ReadableEndpoint: AsyncRead + Unpin + Send {}

impl<T: AsyncRead + Unpin + Send> ReadableEndpoint for T {}

/// Byte sink the relay writes to (local output)
pub trait WritableEndpoint: AsyncWrite + Unpin + Send {}

impl<T: AsyncWrite + Unpin + Send> WritableEndpoint for T {}

/// Both directions at once (the serial device)
pub trait DuplexEndpoint: ReadableEndpoint + WritableEndpoint {}

impl<T: ReadableEndpoint + WritableEndpoint> DuplexEndpoint for T {}

/// Append-only copy of everything received from the device
pub trait RecordingSink: Send {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

impl<W: Write + Send> RecordingSink for W {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_recording_sink() {
        let mut sink: Vec<u8> = Vec::new();
        // Vec has an inherent `append`, so name the trait
        RecordingSink::append(&mut sink, b"ok").unwrap();
        RecordingSink::append(&mut sink, b"\r\n").unwrap();
        RecordingSink::flush(&mut sink).unwrap();
        assert_eq!(sink, b"ok\r\n");
    }

    #[test]
    fn test_boxed_recording_sink() {
        let mut sink: Box<dyn RecordingSink> = Box::new(io::Cursor::new(Vec::new()));
        assert!(sink.append(b"abc").is_ok());
        assert!(sink.flush().is_ok());
    }
}
