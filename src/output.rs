use std::io::{self, Write};

use serde::Serialize;

use crate::app::MigrationReport;
use crate::domain::ProductTypeMetadata;
use crate::vocabulary::VocabularyMap;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_report(report: &MigrationReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_metadata(metadata: &ProductTypeMetadata) -> io::Result<()> {
        Self::print_json(metadata)
    }

    pub fn print_vocabulary(vocabulary: &VocabularyMap) -> io::Result<()> {
        Self::print_json(vocabulary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
