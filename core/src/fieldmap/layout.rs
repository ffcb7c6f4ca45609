use crate::types::{PhaseDirection, BOLD_DIRECTION};
use std::path::{Path, PathBuf};

/// File naming for one subject's fieldmap and BOLD files
#[derive(Debug, Clone)]
pub struct BidsLayout<'a> {
    pub bids_dir: &'a Path,
    pub subject: &'a str,
    pub task: &'a str,
}

impl<'a> BidsLayout<'a> {
    pub fn new(bids_dir: &'a Path, subject: &'a str, task: &'a str) -> Self {
        Self {
            bids_dir,
            subject,
            task,
        }
    }

    pub fn subject_dir(&self) -> PathBuf {
        self.bids_dir.join(format!("sub-{}", self.subject))
    }

    /// File name stem of a BOLD run, without extension
    pub fn bold_stem(&self, run: &str) -> String {
        format!(
            "sub-{}_task-{}_run-{}_dir-{}_bold",
            self.subject,
            self.task,
            run,
            BOLD_DIRECTION.label()
        )
    }

    pub fn bold_sidecar(&self, run: &str) -> PathBuf {
        self.subject_dir()
            .join("func")
            .join(format!("{}.json", self.bold_stem(run)))
    }

    /// Dataset-relative `bids::` URI used in `IntendedFor`
    pub fn bold_uri(&self, run: &str) -> String {
        format!(
            "bids::sub-{}/func/{}.nii.gz",
            self.subject,
            self.bold_stem(run)
        )
    }

    pub fn fieldmap_sidecar(&self, fieldmap_id: &str, direction: PhaseDirection) -> PathBuf {
        self.subject_dir().join("fmap").join(format!(
            "sub-{}_acq-{}_run-{}_dir-{}_epi.json",
            self.subject,
            self.task,
            fieldmap_id,
            direction.label()
        ))
    }
}
