use std::fmt;

/// Every WARC record starts with a version line such as `WARC/1.0`.
pub const WARC_PREFIX: &[u8] = b"WARC/";

/// Leading bytes of a gzip member (RFC 1952).
pub const GZIP_MAGIC: &[u8] = b"\x1f\x8b";

/// URL scheme of the version block that opens an ARC file.
pub const ARC_FILEDESC: &str = "filedesc:";

/// WARC record types (WARC 1.1, section 6)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordType {
    WarcInfo,
    Response,
    Resource,
    Request,
    Metadata,
    Revisit,
    Conversion,
    Continuation,
    Other(String),
}

impl RecordType {
    /// Record types compare case-insensitively.
    pub fn from_name(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "warcinfo" => RecordType::WarcInfo,
            "response" => RecordType::Response,
            "resource" => RecordType::Resource,
            "request" => RecordType::Request,
            "metadata" => RecordType::Metadata,
            "revisit" => RecordType::Revisit,
            "conversion" => RecordType::Conversion,
            "continuation" => RecordType::Continuation,
            _ => RecordType::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordType::WarcInfo => "warcinfo",
            RecordType::Response => "response",
            RecordType::Resource => "resource",
            RecordType::Request => "request",
            RecordType::Metadata => "metadata",
            RecordType::Revisit => "revisit",
            RecordType::Conversion => "conversion",
            RecordType::Continuation => "continuation",
            RecordType::Other(v) => v,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container layout a record was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Warc,
    /// Internet Archive ARC, the predecessor of WARC
    Arc,
}

/// One archive record with its content block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub format: RecordFormat,
    pub record_type: RecordType,
    pub target_uri: Option<String>,
    pub block: Vec<u8>,
}

impl Record {
    pub fn from_warc(record: rust_warc::WarcRecord) -> Self {
        // header names are case insensitive
        let record_type = record
            .header
            .get(&"WARC-Type".into())
            .map(|name| RecordType::from_name(name))
            .unwrap_or_else(|| RecordType::Other(String::new()));
        let target_uri = record.header.get(&"WARC-Target-URI".into()).cloned();

        Record {
            format: RecordFormat::Warc,
            record_type,
            target_uri,
            block: record.content,
        }
    }

    /// ARC files carry a single kind of capture record; only the leading
    /// `filedesc://` block describes the file itself.
    pub fn from_arc(url: &str, block: Vec<u8>) -> Self {
        let record_type = if url.starts_with(ARC_FILEDESC) {
            RecordType::WarcInfo
        } else {
            RecordType::Response
        };

        Record {
            format: RecordFormat::Arc,
            record_type,
            target_uri: Some(url.to_string()),
            block,
        }
    }
}
