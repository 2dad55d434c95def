//! Common test utilities and helpers
#![allow(dead_code)]

pub mod git;

pub use self::git::{create_source_repo, is_git_available};

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Writer backed by a shared buffer so tests can inspect sink emissions
#[derive(Clone, Default)]
pub struct CaptureWriter(pub Arc<Mutex<Vec<u8>>>);

impl CaptureWriter {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
