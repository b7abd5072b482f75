use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// 單一附件大小上限（10 MiB）。 / Largest accepted attachment (10 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;
/// 每張工單最多附件數。 / Maximum attachments carried by one ticket.
pub const MAX_ATTACHMENTS: usize = 10;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 附件的中繼資料；檔案內容從不保存。 / Attachment metadata. The file body is never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl AttachmentMeta {
    pub fn new(name: impl Into<String>, size: u64, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
        }
    }

    /// 由磁碟檔案擷取名稱、大小與類型，不讀取內容。 / Captures name, size and declared type of a file without reading it.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, metadata.len(), guess_content_type(path)))
    }

    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") | Some("log") => "text/plain",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooLarge,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::TooLarge => f.write_str("too large"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRejection {
    pub name: String,
    pub reason: RejectReason,
}

/// 驗證結果。 / Outcome of validating a batch of candidate files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Newly accepted entries, in arrival order, already capped to the free slots.
    pub accepted: Vec<AttachmentMeta>,
    pub rejected: Vec<AttachmentRejection>,
    /// Valid candidates silently dropped because the list was full.
    pub truncated: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AttachmentValidator {
    max_bytes: u64,
    max_count: usize,
}

impl Default for AttachmentValidator {
    fn default() -> Self {
        Self {
            max_bytes: MAX_ATTACHMENT_BYTES,
            max_count: MAX_ATTACHMENTS,
        }
    }
}

impl AttachmentValidator {
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// 逐一檢查候選檔案；超過大小者被拒，超出數量者被靜默捨棄。
    /// / Checks each candidate on its own: oversized files are rejected, valid
    /// files beyond the count limit are dropped without a rejection entry.
    pub fn validate<I>(&self, candidates: I, already_attached: &[AttachmentMeta]) -> ValidationReport
    where
        I: IntoIterator<Item = AttachmentMeta>,
    {
        let room = self.max_count.saturating_sub(already_attached.len());
        let mut report = ValidationReport::default();
        for candidate in candidates {
            if candidate.size > self.max_bytes {
                report.rejected.push(AttachmentRejection {
                    name: candidate.name,
                    reason: RejectReason::TooLarge,
                });
            } else if report.accepted.len() < room {
                report.accepted.push(candidate);
            } else {
                report.truncated += 1;
            }
        }
        report
    }
}

/// 目前已附加的檔案清單，依附加順序排列。 / Currently attached files in attach order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentList {
    entries: Vec<AttachmentMeta>,
}

impl AttachmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the candidates against the current list and appends the accepted ones.
    pub fn attach<I>(&mut self, validator: &AttachmentValidator, candidates: I) -> ValidationReport
    where
        I: IntoIterator<Item = AttachmentMeta>,
    {
        let report = validator.validate(candidates, &self.entries);
        self.entries.extend(report.accepted.iter().cloned());
        report
    }

    /// 依位置移除一筆；超出範圍時不做任何事。 / Removes one entry by position; out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<AttachmentMeta> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[AttachmentMeta] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttachmentMeta> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<AttachmentMeta> {
        self.entries.clone()
    }
}
