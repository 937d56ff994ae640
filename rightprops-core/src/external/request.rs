//! A single ffprobe invocation: which streams, which entries, which output
//! writer. Each reconciliation pass builds its own request and parses the
//! corresponding output itself.

use crate::properties::StreamKind;

/// Output writer selected with `-print_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintFormat {
    /// `json=compact=1`
    JsonCompact,
    /// `csv`, optionally without the leading section name column.
    Csv { print_section: bool },
    /// `default=nokey=1:noprint_wrappers=1`, one bare value per line.
    DefaultNoKey,
}

impl PrintFormat {
    pub fn as_arg(self) -> &'static str {
        match self {
            PrintFormat::JsonCompact => "json=compact=1",
            PrintFormat::Csv { print_section: true } => "csv",
            PrintFormat::Csv { print_section: false } => "csv=print_section=0",
            PrintFormat::DefaultNoKey => "default=nokey=1:noprint_wrappers=1",
        }
    }
}

/// Arguments of one ffprobe call, excluding the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub select_streams: Option<StreamKind>,
    pub count_packets: bool,
    pub show_entries: String,
    pub print_format: PrintFormat,
}

impl ProbeRequest {
    pub fn new(show_entries: impl Into<String>, print_format: PrintFormat) -> Self {
        Self {
            select_streams: None,
            count_packets: false,
            show_entries: show_entries.into(),
            print_format,
        }
    }

    pub fn select_streams(mut self, kind: StreamKind) -> Self {
        self.select_streams = Some(kind);
        self
    }

    pub fn count_packets(mut self) -> Self {
        self.count_packets = true;
        self
    }

    /// Command line arguments. The input path is appended by the executor.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "warning".to_string(),
        ];
        if let Some(kind) = self.select_streams {
            args.push("-select_streams".to_string());
            args.push(kind.specifier().to_string());
        }
        if self.count_packets {
            args.push("-count_packets".to_string());
        }
        args.push("-show_entries".to_string());
        args.push(self.show_entries.clone());
        args.push("-print_format".to_string());
        args.push(self.print_format.as_arg().to_string());
        args
    }
}
