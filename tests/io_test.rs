mod common;
use anyhow::Result;
use common::*;
use igsynth::shared::output::{create_output, FastaWriter, ReferenceWriter};
use igsynth::shared::parser::{parse_distribution, parse_germline_fasta, read_germline_fasta};
use igsynth::vdj::load_locus;
use igsynth::{Dna, GeneratorConfiguration, Generator, RecombinationParameters};
use std::fs;
use std::io::Cursor;
use std::path::Path;

#[test]
fn test_parse_germline_fasta() -> Result<()> {
    let content = "\
>M99641|IGHV1-18*01|Homo sapiens|F|V-REGION|
caggttcagc tggtgcagtc
TGGAGCTGAG

>X62106|IGHV1-2*02|Homo sapiens|F|
CAGGTGCAGCTG
>no_name
ACGT
>Z00001|IGHV9-9*01|
ACGTUU
>Z00002|IGHV9-9*02|
";
    let genes = parse_germline_fasta(Cursor::new(content))?;
    assert_eq!(genes.len(), 2);
    assert_eq!(genes[0].name, "IGHV1-18*01");
    assert_eq!(genes[0].accession, "M99641");
    assert_eq!(genes[0].seq.get_string(), "CAGGTTCAGCTGGTGCAGTCTGGAGCTGAG");
    assert_eq!(genes[1].name, "IGHV1-2*02");
    assert_eq!(genes[1].seq.get_string(), "CAGGTGCAGCTG");
    Ok(())
}

#[test]
fn test_missing_files() -> Result<()> {
    assert!(read_germline_fasta(Path::new("does/not/exist.fasta")).is_err());
    assert!(load_locus("V", Path::new("does/not/exist.fasta"), None, false).is_err());
    Ok(())
}

#[test]
fn test_parse_distribution() -> Result<()> {
    let content = "IGHV1-2*02, 0.25\nIGHV3-23 ,0.5\n\nmalformed\nIGHV4,abc\nIGHV5,0.1,extra\n";
    let rows = parse_distribution(content.as_bytes())?;
    assert_eq!(
        rows,
        vec![
            ("IGHV1-2*02".to_string(), 0.25),
            ("IGHV3-23".to_string(), 0.5),
            ("IGHV5".to_string(), 0.1),
        ]
    );
    Ok(())
}

#[test]
fn test_fasta_writer() -> Result<()> {
    let mut writer = FastaWriter::new(Vec::new());
    writer.write_record(1, &Dna::from_string("ACGT")?)?;
    writer.write_record(2, &Dna::from_string("TTGA")?)?;
    let out = String::from_utf8(writer.into_inner())?;
    assert_eq!(out, ">1\nACGT\n>2\nTTGA\n");
    Ok(())
}

#[test]
fn test_reference_writer_header_once() -> Result<()> {
    let mut writer = ReferenceWriter::new(Vec::new());
    assert!(!writer.header_written());
    writer.write_record("IGHV1-2*02,IGHD3-10*01,IGHJ4*02", 223, 262)?;
    writer.write_record("IGHV1-2*02,IGHD3-10*01,IGHJ4*02", 223, 250)?;
    assert!(writer.header_written());
    let out = String::from_utf8(writer.into_inner()?)?;
    assert_eq!(
        out,
        "Genes,CDR3.start,CDR3.end\n\
         \"IGHV1-2*02,IGHD3-10*01,IGHJ4*02\",223,262\n\
         \"IGHV1-2*02,IGHD3-10*01,IGHJ4*02\",223,250\n"
    );
    Ok(())
}

#[test]
fn test_parameters_json() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("params.json");
    let params = RecombinationParameters {
        max_random_insertion: 12,
        whole_codon: true,
        ..Default::default()
    };
    params.save_json(&path)?;
    assert_eq!(RecombinationParameters::load_json(&path)?, params);

    // missing fields take their default value
    fs::write(&path, "{\"max_palindrome_length\": 2}")?;
    let partial = RecombinationParameters::load_json(&path)?;
    assert_eq!(partial.max_palindrome_length, 2);
    assert_eq!(partial.j_motif, "[FW]G.G");

    fs::write(&path, "{\"d_cut_fraction\": 1.5}")?;
    assert!(RecombinationParameters::load_json(&path).is_err());
    Ok(())
}

#[test]
fn test_generate_to_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (v_path, d_path, j_path) = write_toy_databases(dir.path())?;
    let usage = dir.path().join("v_usage.csv");
    fs::write(&usage, "IGHV1-2,100\n")?;

    let v = load_locus("V", &v_path, Some(usage.as_path()), true)?;
    assert_eq!(v.genes()[0].seq.get_string(), toy_v_seq());
    let d = load_locus("D", &d_path, None, false)?;
    let j = load_locus("J", &j_path, None, false)?;

    let config = GeneratorConfiguration {
        number_sequences: 5,
        productive_fraction: 1.,
        seed: Some(17),
    };
    let mut generator = Generator::new(v, d, j, &RecombinationParameters::default(), &config)?;

    let reference_path = dir.path().join("reference.csv");
    let mut fasta = FastaWriter::new(Vec::new());
    let mut reference = ReferenceWriter::create(&reference_path)?;
    let mut seen = 0;
    generator.generate_to(
        config.number_sequences,
        &mut fasta,
        Some(&mut reference),
        |_| seen += 1,
    )?;
    assert_eq!(seen, 5);

    let out = String::from_utf8(fasta.into_inner())?;
    let headers: Vec<&str> = out.lines().filter(|l| l.starts_with('>')).collect();
    assert_eq!(headers, vec![">1", ">2", ">3", ">4", ">5"]);

    let mut rdr = csv::Reader::from_path(&reference_path)?;
    assert_eq!(
        rdr.headers()?.iter().collect::<Vec<_>>(),
        vec!["Genes", "CDR3.start", "CDR3.end"]
    );
    let mut rows = 0;
    for record in rdr.records() {
        let record = record?;
        assert_eq!(&record[0], "IGHV1-2*02,IGHD3-10*01,IGHJ4*02");
        assert_eq!(&record[1], (V_ANCHOR_OFFSET + 4).to_string());
        rows += 1;
    }
    assert_eq!(rows, 5);
    Ok(())
}

#[test]
fn test_ambiguous_germline_kept() -> Result<()> {
    let content = ">X1|IGHV1-2*02|\nCAGNNNTGG\n";
    let genes = parse_germline_fasta(Cursor::new(content))?;
    assert_eq!(genes.len(), 1);
    assert!(genes[0].seq.is_ambiguous());
    // the ambiguous codon is dropped from every translation
    assert_eq!(genes[0].seq.translate().to_string(), "QW");
    assert!(!Dna::from_string("CAGTGG")?.is_ambiguous());
    Ok(())
}

#[test]
fn test_output_file_errors_name_the_path() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("missing").join("out.fasta");
    let err = create_output(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("out.fasta"));

    let path = dir.path().join("out.fasta");
    let mut fasta = FastaWriter::new(create_output(&path)?);
    fasta.write_record(1, &Dna::from_string("ACGT")?)?;
    fasta.flush()?;
    assert_eq!(fs::read_to_string(&path)?, ">1\nACGT\n");
    Ok(())
}
