use crate::models::FileMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartGeneration {
        request_id: u64,
        prompt: String,
    },
    ExportArchive {
        files: FileMap,
        project_name: String,
    },
    /// Transient user-facing notice; never recorded in the console.
    Notify {
        level: NotifyLevel,
        message: String,
    },
}

impl Effect {
    pub fn notify(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self::Notify {
            level,
            message: message.into(),
        }
    }
}
