//! Line input from stdin shared by the shell and the confirmation prompt.
//!
//! Both readers go through the process-wide `Stdin` buffer so neither can
//! swallow a line meant for the other.

use std::io::{self, BufRead};

/// Read one line without blocking runtime workers. `Ok(None)` is end of input.
pub async fn read_line() -> io::Result<Option<String>> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    })
    .await
    .map_err(io::Error::other)?
}
