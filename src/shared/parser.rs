// Parsers for the germline databases and the gene usage files

use crate::shared::gene::GermlineSequence;
use crate::shared::sequence::Dna;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use log::warn;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read a germline database. A missing file is an error, malformed records
/// are skipped.
pub fn read_germline_fasta(path: &Path) -> Result<Vec<GermlineSequence>> {
    let file = File::open(path)
        .with_context(|| format!("Error opening the germline file {}", path.display()))?;
    parse_germline_fasta(BufReader::new(file))
}

/// Parse FASTA-like records:
/// ```text
/// >accession|gene_name|anything else
/// ACGT...
/// ACGT...
/// ```
/// Only the first two `|` fields of the header are used; the body lines are
/// concatenated, whitespace ignored.
pub fn parse_germline_fasta<R: BufRead>(reader: R) -> Result<Vec<GermlineSequence>> {
    let mut genes = Vec::new();
    let mut header: Option<String> = None;
    let mut body = String::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if let Some(h) = line.strip_prefix('>') {
            if let Some(previous) = header.take() {
                push_record(&mut genes, &previous, &body);
            }
            header = Some(h.to_string());
            body.clear();
        } else if header.is_some() {
            body.extend(line.chars().filter(|c| !c.is_whitespace()));
        } else if !line.is_empty() {
            warn!("Line outside of any FASTA record ignored: {}", line);
        }
    }
    if let Some(previous) = header {
        push_record(&mut genes, &previous, &body);
    }
    Ok(genes)
}

fn push_record(genes: &mut Vec<GermlineSequence>, header: &str, body: &str) {
    let mut fields = header.split('|');
    let accession = fields.next().unwrap_or("").trim();
    let name = match fields.next().map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => {
            warn!("Record \">{}\" has no gene name, skipped", header);
            return;
        }
    };
    match Dna::from_string(body) {
        Ok(seq) if !seq.is_empty() => {
            if seq.is_ambiguous() {
                warn!(
                    "Gene {} has ambiguous bases, the codons holding them are never translated",
                    name
                );
            }
            genes.push(GermlineSequence::new(name, accession, seq))
        }
        Ok(_) => warn!("Gene {} has an empty sequence, skipped", name),
        Err(e) => warn!("Gene {} skipped: {}", name, e),
    }
}

/// Read a gene usage file (`gene_name,weight` per line). A missing file is
/// an error, malformed lines are skipped.
pub fn read_distribution(path: &Path) -> Result<Vec<(String, f64)>> {
    let file = File::open(path)
        .with_context(|| format!("Error opening the distribution file {}", path.display()))?;
    parse_distribution(file)
}

pub fn parse_distribution<R: Read>(reader: R) -> Result<Vec<(String, f64)>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Distribution line {} unreadable: {}", line + 1, e);
                continue;
            }
        };
        let (name, weight) = match (record.get(0), record.get(1)) {
            (Some(n), Some(w)) if !n.is_empty() => (n, w),
            _ => {
                if record.iter().any(|f| !f.is_empty()) {
                    warn!("Distribution line {} malformed, skipped", line + 1);
                }
                continue;
            }
        };
        match weight.parse::<f64>() {
            Ok(w) if w.is_finite() => rows.push((name.to_string(), w)),
            _ => warn!(
                "Distribution line {}: invalid weight \"{}\" for {}, skipped",
                line + 1,
                weight,
                name
            ),
        }
    }
    Ok(rows)
}
