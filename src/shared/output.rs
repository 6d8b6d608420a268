//! Writers for the generated sequences (FASTA) and their CDR3 boundaries (CSV)
use crate::shared::sequence::Dna;
use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const REFERENCE_HEADER: [&str; 3] = ["Genes", "CDR3.start", "CDR3.end"];

/// Buffered output file, the error names the path
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Error creating the output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// One `>index` record per sequence
pub struct FastaWriter<W: Write> {
    writer: W,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(writer: W) -> FastaWriter<W> {
        FastaWriter { writer }
    }

    pub fn write_record(&mut self, index: usize, seq: &Dna) -> Result<()> {
        writeln!(self.writer, ">{}", index)?;
        self.writer.write_all(&seq.seq)?;
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// CSV file with the genes and CDR3 boundaries of each sequence. The
/// header is written with the first record, once.
pub struct ReferenceWriter<W: Write> {
    writer: Writer<W>,
    header_written: bool,
}

impl ReferenceWriter<File> {
    pub fn create(path: &Path) -> Result<ReferenceWriter<File>> {
        let file = File::create(path)
            .with_context(|| format!("Error creating the reference file {}", path.display()))?;
        Ok(ReferenceWriter::new(file))
    }
}

impl<W: Write> ReferenceWriter<W> {
    pub fn new(writer: W) -> ReferenceWriter<W> {
        ReferenceWriter {
            writer: Writer::from_writer(writer),
            header_written: false,
        }
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// `cdr3_start` is 1-indexed, `cdr3_end` is the offset of the J anchor
    pub fn write_record(&mut self, genes: &str, cdr3_start: usize, cdr3_end: usize) -> Result<()> {
        if !self.header_written {
            self.writer.write_record(REFERENCE_HEADER)?;
            self.header_written = true;
        }
        self.writer.write_record(&[
            genes.to_string(),
            cdr3_start.to_string(),
            cdr3_end.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Error flushing the reference file: {}", e.error()))
    }
}
