//! Shared plumbing used across areas and commands
//!
//! - `lockfile`: exclusive `.lock` sibling files guarding index and ref writes
//! - [`PagerWriter`]: `Write` adapter over the minus pager

pub mod lockfile;

use derive_new::new;
use minus::Pager;
use std::io::{self, Write};

/// Lets `log` and `diff` print into the minus pager as if it were stdout
///
/// Text is buffered by the pager and only shown once `minus::page_all` runs,
/// after the command has finished.
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pager
            .push_str(String::from_utf8_lossy(buf))
            .map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
