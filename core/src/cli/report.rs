use crate::cohort::CohortIndex;
use crate::ingest::IngestSummary;
use crate::label::LabelSummary;
use crate::split::SplitAssignment;
use crate::types::ImageRecord;
use std::fmt;

/// Text report formatter for pipeline stage results
pub enum TextReport<'a> {
    Ingest(&'a IngestSummary),
    Label(&'a LabelSummary),
    Split(&'a SplitAssignment),
    Records(&'a [ImageRecord]),
    Cohort(&'a CohortIndex),
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextReport::Ingest(summary) => {
                writeln!(f, "Ingestion")?;
                writeln!(f, "=========")?;
                writeln!(f, "Scanned:     {}", summary.scanned)?;
                writeln!(f, "Written:     {}", summary.written)?;
                writeln!(f, "Inserted:    {}", summary.inserted)?;
                writeln!(f, "Duplicates:  {}", summary.duplicates)?;
                write!(f, "Failed:      {}", summary.failed)
            }
            TextReport::Label(summary) => {
                writeln!(f, "Labeling")?;
                writeln!(f, "========")?;
                writeln!(f, "Series:      {}", summary.series)?;
                writeln!(f, "Records:     {}", summary.records)?;
                writeln!(f, "Updated:     {}", summary.updated)?;
                writeln!(f, "Unmatched:   {}", summary.unmatched)?;
                write!(f, "Ambiguous:   {}", summary.ambiguous)
            }
            TextReport::Split(split) => {
                writeln!(f, "Split")?;
                writeln!(f, "=====")?;
                writeln!(f, "Train ({}): {}", split.train.len(), split.train.join(", "))?;
                write!(f, "Test ({}):  {}", split.test.len(), split.test.join(", "))
            }
            TextReport::Records(records) => {
                writeln!(f, "{} records", records.len())?;
                for record in records.iter() {
                    writeln!(f)?;
                    writeln!(
                        f,
                        "[{}] {} / {}",
                        record.id, record.patient_id, record.graphic_id
                    )?;
                    writeln!(f, "  Series:    {}", record.series_id)?;
                    writeln!(f, "  Storage:   {}", record.storage_key)?;
                    writeln!(
                        f,
                        "  Modality:  {}",
                        record
                            .modality
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "unlabeled".to_string())
                    )?;
                    writeln!(f, "  Caption:   {}", record.caption)?;
                    write!(f, "  Collected: {}", record.collected_at.to_rfc3339())?;
                }
                Ok(())
            }
            TextReport::Cohort(cohort) => {
                writeln!(f, "Cohort: {} ({} images)", cohort.partition, cohort.len())?;
                let counts = cohort.class_counts();
                let mut classes: Vec<_> = cohort.class_to_index.iter().collect();
                classes.sort_by_key(|(_, index)| **index);
                for (name, index) in classes {
                    writeln!(f, "  {} {}: {}", index, name, counts[*index])?;
                }
                for entry in &cohort.entries {
                    write!(f, "\n{}\t{}\t{}", entry.class_index, entry.label, entry.storage_key)?;
                }
                Ok(())
            }
        }
    }
}
