// util.rs

use std::io::Write;

/// Writes raw bytes, treating a closed reader on the other end as success.
pub fn write_ignore_broken_pipe<W: Write + ?Sized>(w: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    match w.write_all(bytes) {
        Err(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
