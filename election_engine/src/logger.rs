use log::{debug, info};
use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Sink for the audit trail and the media report of one election.
///
/// Every write is appended and flushed before returning.
pub trait ElectionLogger {
    fn write_to_audit_file(&mut self, content: &str) -> io::Result<()>;
    fn write_to_media_report(&mut self, content: &str) -> io::Result<()>;
}

/// Writes the audit file and the media report to a directory.
///
/// Both files are named after the time the logger was created. They are closed when the
/// logger is dropped.
#[derive(Debug)]
pub struct FileLogger {
    audit_path: PathBuf,
    media_path: PathBuf,
    audit_file: File,
    media_report: File,
}

impl FileLogger {
    pub fn create(output_dir: &Path) -> io::Result<FileLogger> {
        let current_time = chrono::Local::now()
            .format("%Y-%m-%d_%H%M%S_%6f")
            .to_string();
        let audit_path = output_dir.join(format!("VotingSystem_AuditFile_{}.txt", current_time));
        let media_path =
            output_dir.join(format!("VotingSystem_MediaReport_{}.txt", current_time));
        info!("Audit file: {:?}", audit_path);
        info!("Media report: {:?}", media_path);
        let audit_file = File::create(&audit_path)?;
        let media_report = File::create(&media_path)?;
        Ok(FileLogger {
            audit_path,
            media_path,
            audit_file,
            media_report,
        })
    }

    pub fn audit_path(&self) -> &Path {
        &self.audit_path
    }

    pub fn media_path(&self) -> &Path {
        &self.media_path
    }
}

impl ElectionLogger for FileLogger {
    fn write_to_audit_file(&mut self, content: &str) -> io::Result<()> {
        self.audit_file.write_all(content.as_bytes())?;
        self.audit_file.flush()
    }

    fn write_to_media_report(&mut self, content: &str) -> io::Result<()> {
        self.media_report.write_all(content.as_bytes())?;
        self.media_report.flush()
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        debug!("Closing {:?} and {:?}", self.audit_path, self.media_path);
    }
}

/// Keeps both streams in memory. Clones share the same buffers, so a test can keep one
/// handle and give the other to an election.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    audit: Rc<RefCell<String>>,
    media: Rc<RefCell<String>>,
}

impl MemoryLogger {
    pub fn audit(&self) -> String {
        self.audit.borrow().clone()
    }

    pub fn media(&self) -> String {
        self.media.borrow().clone()
    }
}

impl ElectionLogger for MemoryLogger {
    fn write_to_audit_file(&mut self, content: &str) -> io::Result<()> {
        self.audit.borrow_mut().push_str(content);
        Ok(())
    }

    fn write_to_media_report(&mut self, content: &str) -> io::Result<()> {
        self.media.borrow_mut().push_str(content);
        Ok(())
    }
}
