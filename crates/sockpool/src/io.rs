//! Timed exact-length transfers over a non-blocking duplex channel.
//!
//! These two primitives are the only synchronization and backpressure
//! mechanism in the system. There is no queue data structure anywhere:
//! the channel's kernel buffer *is* the queue, and [`write_exact_timed`]
//! timing out *is* the signal that the buffer is full and no worker is
//! draining it.
//!
//! Both directions share one contract: issue the non-blocking transfer
//! against the still-untransferred suffix, retry transient interruptions
//! immediately, and on a would-block result suspend on the endpoint's
//! readiness future for at most the supplied budget. A peer closing the
//! channel mid-transfer yields [`Transfer::Short`] with the byte count
//! moved so far; progress already made is never rolled back.

use crate::error::{Error, Result};
use core::time::Duration;
use std::io::ErrorKind;
use tokio::{net::UnixStream, time::timeout};

/// Outcome of an exact-length transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Every requested byte was moved.
    Complete,

    /// The peer closed its side after this many bytes had moved.
    ///
    /// A short transfer is a value, not an error: callers compare the
    /// count against the length they asked for.
    Short(usize),
}

/// Reads exactly `buf.len()` bytes from `endpoint`.
///
/// The budget bounds each individual readiness wait, not the cumulative
/// transfer, so a transfer that keeps making progress may take longer
/// overall. An empty `buf` completes without touching the channel.
///
/// # Errors
///
/// - [`Error::Timeout`] if a readiness wait expires before any further
///   bytes arrive.
/// - [`Error::Io`] on a non-transient read failure, or if the readiness
///   wait itself fails.
pub async fn read_exact_timed(
    endpoint: &UnixStream,
    buf: &mut [u8],
    budget: Duration,
) -> Result<Transfer> {
    let mut filled = 0;
    while filled < buf.len() {
        match endpoint.try_read(&mut buf[filled..]) {
            Ok(0) => return Ok(Transfer::Short(filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                // Readiness can be spurious; the next try_read decides.
                match timeout(budget, endpoint.readable()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(Error::Io(e)),
                    Err(_) => return Err(Error::Timeout { budget }),
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(Transfer::Complete)
}

/// Writes exactly `buf.len()` bytes to `endpoint`.
///
/// Symmetric to [`read_exact_timed`]: the budget bounds each readiness
/// wait, a closed peer yields [`Transfer::Short`], and partial progress
/// stays in the channel.
///
/// # Errors
///
/// - [`Error::Timeout`] if the channel stays full past a readiness wait.
/// - [`Error::Io`] on a non-transient write failure, or if the readiness
///   wait itself fails.
pub async fn write_exact_timed(
    endpoint: &UnixStream,
    buf: &[u8],
    budget: Duration,
) -> Result<Transfer> {
    let mut sent = 0;
    while sent < buf.len() {
        match endpoint.try_write(&buf[sent..]) {
            Ok(0) => return Ok(Transfer::Short(sent)),
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                match timeout(budget, endpoint.writable()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(Error::Io(e)),
                    Err(_) => return Err(Error::Timeout { budget }),
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(Transfer::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn transfers_the_exact_byte_count() {
        let (a, b) = UnixStream::pair().expect("socket pair");
        let payload = *b"sixteen bytes!!!";

        let wrote = write_exact_timed(&a, &payload, BUDGET).await.expect("write");
        assert_eq!(wrote, Transfer::Complete);

        let mut buf = [0u8; 16];
        let read = read_exact_timed(&b, &mut buf, BUDGET).await.expect("read");
        assert_eq!(read, Transfer::Complete);
        assert_eq!(buf, payload);
    }

    #[tokio::test]
    async fn empty_buffer_completes_without_io() {
        let (a, _b) = UnixStream::pair().expect("socket pair");
        let read = read_exact_timed(&a, &mut [], BUDGET).await.expect("read");
        assert_eq!(read, Transfer::Complete);
    }

    #[tokio::test]
    async fn silent_peer_times_out_the_read() {
        let (a, _b) = UnixStream::pair().expect("socket pair");
        let mut buf = [0u8; 8];
        match read_exact_timed(&a, &mut buf, Duration::from_millis(30)).await {
            Err(Error::Timeout { budget }) => assert_eq!(budget, Duration::from_millis(30)),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_peer_yields_a_short_read() {
        let (a, b) = UnixStream::pair().expect("socket pair");
        assert_eq!(a.try_write(&[7u8; 5]).expect("write"), 5);
        drop(a);

        let mut buf = [0u8; 16];
        match read_exact_timed(&b, &mut buf, BUDGET).await.expect("read") {
            Transfer::Short(n) => {
                assert_eq!(n, 5);
                assert_eq!(&buf[..5], &[7u8; 5]);
            }
            Transfer::Complete => panic!("expected a short transfer"),
        }
    }

    #[tokio::test]
    async fn full_buffer_times_out_the_write() {
        let (a, _b) = UnixStream::pair().expect("socket pair");

        // Saturate the kernel buffer while the peer never reads.
        let chunk = [0u8; 4096];
        loop {
            match a.try_write(&chunk) {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => panic!("unexpected write failure: {e}"),
            }
        }

        match write_exact_timed(&a, &[1u8; 16], Duration::from_millis(30)).await {
            Err(Error::Timeout { .. }) => {}
            other => panic!("expected Timeout, got {other:?}"),
        }
    }
}
