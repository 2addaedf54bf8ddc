//! Provides a wrapper around the raw socket to allow for simpler, `&self`-based APIs that can be
//! freely cloned and shared between the connection's read and write sides without `&mut`.

use std::fmt::Debug;
use std::io;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Represents a raw stream source the server can use to serve requests on.
/// Each instance represents a dedicated client connection.
///
/// The stream source is reference counted and handles concurrent reads/writes: separate
/// concurrent calls to read and write are possible independent of each other, but the
/// implementation does not need to support two concurrent reads (or two concurrent writes).
pub trait ConnectionStream: ConnectionStreamRead + ConnectionStreamWrite {
  /// Returns a new handle to the same underlying stream.
  fn new_ref(&self) -> Box<dyn ConnectionStream>;

  /// The remote address of the peer, if known.
  fn peer_addr(&self) -> io::Result<String>;
  /// The local address this connection was accepted on, if known.
  fn local_addr(&self) -> io::Result<String>;
}

/// The read half of a [`ConnectionStream`].
pub trait ConnectionStreamRead: Sync + Send + Debug + Read {
  /// De-mut of [`Read::read`].
  fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

  /// Reads until `end` is encountered (inclusive) or `limit` bytes have been read, whichever
  /// comes first. Returns the number of bytes read. If the returned count equals `limit`, the
  /// terminator was not found within the limit.
  fn read_until(&self, end: u8, limit: usize, buf: &mut Vec<u8>) -> io::Result<usize>;

  /// De-mut of [`Read::read_exact`].
  fn read_exact(&self, buf: &mut [u8]) -> io::Result<()>;

  /// Returns a new `Read` handle to the same underlying stream.
  fn new_ref_read(&self) -> Box<dyn Read + Send + Sync>;

  /// Returns a new [`ConnectionStreamRead`] handle to the same underlying stream.
  fn new_ref_stream_read(&self) -> Box<dyn ConnectionStreamRead>;

  /// Sets the read timeout, if the underlying transport supports one.
  fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()>;
}

/// The write half of a [`ConnectionStream`].
pub trait ConnectionStreamWrite: Sync + Send + Debug + Write {
  /// De-mut of [`Write::write`].
  fn write(&self, buf: &[u8]) -> io::Result<usize>;
  /// De-mut of [`Write::write_all`].
  fn write_all(&self, buf: &[u8]) -> io::Result<()>;
  /// De-mut of [`Write::flush`].
  fn flush(&self) -> io::Result<()>;

  /// Sets the write timeout, if the underlying transport supports one.
  fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()>;

  /// Returns a new `Write` handle to the same underlying stream.
  fn new_ref_write(&self) -> Box<dyn Write + Send + Sync>;
  /// Returns a new [`ConnectionStreamWrite`] handle to the same underlying stream.
  fn new_ref_stream_write(&self) -> Box<dyn ConnectionStreamWrite>;
}

/// Converts an owned I/O resource into a boxed [`ConnectionStream`].
pub trait IntoConnectionStream {
  /// Performs the conversion.
  fn into_connection_stream(self) -> Box<dyn ConnectionStream>;
}

impl IntoConnectionStream for TcpStream {
  fn into_connection_stream(self) -> Box<dyn ConnectionStream> {
    tcp::new(self)
  }
}

impl IntoConnectionStream for Box<dyn ConnectionStream> {
  fn into_connection_stream(self) -> Box<dyn ConnectionStream> {
    self
  }
}

mod tcp {
  use crate::stream::{ConnectionStream, ConnectionStreamRead, ConnectionStreamWrite};
  use crate::util::unwrap_poison;
  use std::io;
  use std::io::{Read, Write};
  use std::net::TcpStream;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;
  use unowned_buf::{UnownedReadBuffer, UnownedWriteBuffer};

  pub fn new(stream: TcpStream) -> Box<dyn ConnectionStream> {
    Box::new(TcpStreamOuter(Arc::new(TcpStreamInner::new(stream))))
  }

  #[derive(Debug, Clone)]
  struct TcpStreamOuter(Arc<TcpStreamInner>);

  #[derive(Debug)]
  struct TcpStreamInner {
    read_mutex: Mutex<UnownedReadBuffer<0x4000>>,
    write_mutex: Mutex<UnownedWriteBuffer<0x4000>>,
    stream: TcpStream,
  }

  impl TcpStreamInner {
    fn new(stream: TcpStream) -> TcpStreamInner {
      TcpStreamInner {
        read_mutex: Mutex::new(UnownedReadBuffer::new()),
        write_mutex: Mutex::new(UnownedWriteBuffer::new()),
        stream,
      }
    }
  }

  impl Read for TcpStreamOuter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      ConnectionStreamRead::read(self, buf)
    }
  }

  impl ConnectionStreamRead for TcpStreamOuter {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
      unwrap_poison(self.0.read_mutex.lock())?.read(&mut &self.0.stream, buf)
    }

    fn read_until(&self, end: u8, limit: usize, buf: &mut Vec<u8>) -> io::Result<usize> {
      unwrap_poison(self.0.read_mutex.lock())?.read_until_limit(&mut &self.0.stream, end, limit, buf)
    }

    fn read_exact(&self, buf: &mut [u8]) -> io::Result<()> {
      unwrap_poison(self.0.read_mutex.lock())?.read_exact(&mut &self.0.stream, buf)
    }

    fn new_ref_read(&self) -> Box<dyn Read + Send + Sync> {
      Box::new(self.clone()) as Box<dyn Read + Send + Sync>
    }

    fn new_ref_stream_read(&self) -> Box<dyn ConnectionStreamRead> {
      Box::new(self.clone()) as Box<dyn ConnectionStreamRead>
    }

    fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
      self.0.stream.set_read_timeout(dur)
    }
  }

  impl ConnectionStreamWrite for TcpStreamOuter {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
      unwrap_poison(self.0.write_mutex.lock())?.write(&mut &self.0.stream, buf)
    }

    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
      unwrap_poison(self.0.write_mutex.lock())?.write_all(&mut &self.0.stream, buf)
    }

    fn flush(&self) -> io::Result<()> {
      unwrap_poison(self.0.write_mutex.lock())?.flush(&mut &self.0.stream)
    }

    fn set_write_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
      self.0.stream.set_write_timeout(dur)
    }

    fn new_ref_write(&self) -> Box<dyn Write + Send + Sync> {
      Box::new(self.clone()) as Box<dyn Write + Send + Sync>
    }

    fn new_ref_stream_write(&self) -> Box<dyn ConnectionStreamWrite> {
      Box::new(self.clone()) as Box<dyn ConnectionStreamWrite>
    }
  }

  impl Write for TcpStreamOuter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      ConnectionStreamWrite::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
      ConnectionStreamWrite::flush(self)
    }
  }

  impl ConnectionStream for TcpStreamOuter {
    fn new_ref(&self) -> Box<dyn ConnectionStream> {
      Box::new(self.clone()) as Box<dyn ConnectionStream>
    }

    fn peer_addr(&self) -> io::Result<String> {
      Ok(format!("{}", self.0.stream.peer_addr()?))
    }

    fn local_addr(&self) -> io::Result<String> {
      Ok(format!("{}", self.0.stream.local_addr()?))
    }
  }
}

/// A [`ConnectionStream`] backed by any boxed `Read + Write` pair, used in tests to drive the
/// Conductor and WebSocket handshake with an in-memory duplex instead of a real socket.
pub mod boxed {
  use crate::stream::{ConnectionStream, ConnectionStreamRead, ConnectionStreamWrite};
  use crate::util::unwrap_poison;
  use std::fmt::{Debug, Formatter};
  use std::io;
  use std::io::{BufWriter, Read, Write};
  use std::ops::DerefMut;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;
  use unowned_buf::UnownedReadBuffer;

  /// Wraps a boxed reader and writer pair as a [`ConnectionStream`].
  pub fn new(read: Box<dyn Read + Send>, write: Box<dyn Write + Send>) -> Box<dyn ConnectionStream> {
    Box::new(BoxStreamOuter(Arc::new(BoxStreamInner {
      read_mutex: Mutex::new((UnownedReadBuffer::default(), read)),
      write_mutex: Mutex::new(BufWriter::new(write)),
    }))) as Box<dyn ConnectionStream>
  }

  #[derive(Clone)]
  struct BoxStreamOuter(Arc<BoxStreamInner>);

  struct BoxStreamInner {
    read_mutex: Mutex<(UnownedReadBuffer<0x4000>, Box<dyn Read + Send>)>,
    write_mutex: Mutex<BufWriter<Box<dyn Write + Send>>>,
  }

  impl Debug for BoxStreamOuter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
      f.write_str("BoxStreamOuter")
    }
  }

  impl ConnectionStreamRead for BoxStreamOuter {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
      let mut guard = unwrap_poison(self.0.read_mutex.lock())?;
      let (buffer, stream) = guard.deref_mut();
      buffer.read(stream, buf)
    }

    fn read_until(&self, end: u8, limit: usize, buf: &mut Vec<u8>) -> io::Result<usize> {
      let mut guard = unwrap_poison(self.0.read_mutex.lock())?;
      let (buffer, stream) = guard.deref_mut();
      buffer.read_until_limit(stream, end, limit, buf)
    }

    fn read_exact(&self, buf: &mut [u8]) -> io::Result<()> {
      let mut guard = unwrap_poison(self.0.read_mutex.lock())?;
      let (buffer, stream) = guard.deref_mut();
      buffer.read_exact(stream, buf)
    }

    fn new_ref_read(&self) -> Box<dyn Read + Send + Sync> {
      Box::new(self.clone()) as Box<dyn Read + Send + Sync>
    }

    fn new_ref_stream_read(&self) -> Box<dyn ConnectionStreamRead> {
      Box::new(self.clone()) as Box<dyn ConnectionStreamRead>
    }

    fn set_read_timeout(&self, _dur: Option<Duration>) -> io::Result<()> {
      Ok(())
    }
  }

  impl Read for BoxStreamOuter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      ConnectionStreamRead::read(self, buf)
    }
  }

  impl ConnectionStreamWrite for BoxStreamOuter {
    fn write(&self, buf: &[u8]) -> io::Result<usize> {
      unwrap_poison(self.0.write_mutex.lock())?.write(buf)
    }

    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
      unwrap_poison(self.0.write_mutex.lock())?.write_all(buf)
    }

    fn flush(&self) -> std::io::Result<()> {
      unwrap_poison(self.0.write_mutex.lock())?.flush()
    }

    fn set_write_timeout(&self, _dur: Option<Duration>) -> io::Result<()> {
      Ok(())
    }

    fn new_ref_write(&self) -> Box<dyn Write + Send + Sync> {
      Box::new(self.clone()) as Box<dyn Write + Send + Sync>
    }

    fn new_ref_stream_write(&self) -> Box<dyn ConnectionStreamWrite> {
      Box::new(self.clone()) as Box<dyn ConnectionStreamWrite>
    }
  }

  impl io::Write for BoxStreamOuter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      ConnectionStreamWrite::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
      ConnectionStreamWrite::flush(self)
    }
  }

  impl ConnectionStream for BoxStreamOuter {
    fn new_ref(&self) -> Box<dyn ConnectionStream> {
      Box::new(self.clone()) as Box<dyn ConnectionStream>
    }

    fn peer_addr(&self) -> io::Result<String> {
      Ok("box".to_string())
    }

    fn local_addr(&self) -> io::Result<String> {
      Ok("box".to_string())
    }
  }
}
