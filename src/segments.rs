use anyhow::{anyhow, bail, Context, Result};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

/// One ancestry interval on a chromosome, as inferred by local-ancestry
/// deconvolution. Coordinates are base pairs, half-open is not assumed;
/// the only invariant enforced on load is `end > start`. Frequency is
/// carried when the table has such a column (the frequency painting needs
/// it; the plain painting ignores it).
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub ancestry: String,
    pub frequency: Option<f64>,
}

/// Sort key implementing the usual karyotype order: numbered chromosomes
/// ascending, then X/Y, then mitochondrial, then anything else lexically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChromKey {
    rank: u8,
    tag: String,
}

pub fn natural_chrom_key(name: &str) -> ChromKey {
    let s = name.to_ascii_lowercase().replace("chromosome", "chr");
    if let Some(num) = s.strip_prefix("chr").and_then(|r| r.parse::<u32>().ok()) {
        return ChromKey {
            rank: 0,
            tag: format!("{num:010}"),
        };
    }
    match s.as_str() {
        "chrx" => ChromKey {
            rank: 1,
            tag: "x".to_string(),
        },
        "chry" => ChromKey {
            rank: 1,
            tag: "y".to_string(),
        },
        "chrm" | "chrmt" | "chrmito" => ChromKey {
            rank: 2,
            tag: "m".to_string(),
        },
        _ => ChromKey { rank: 3, tag: s },
    }
}

pub fn compare_chroms(a: &str, b: &str) -> Ordering {
    natural_chrom_key(a).cmp(&natural_chrom_key(b))
}

fn normalize_chrom_name(raw: &str) -> String {
    let s = raw.trim();
    if s.to_ascii_lowercase().starts_with("chr") {
        s.to_string()
    } else {
        format!("chr{s}")
    }
}

/// Parses a coordinate that may carry thousands separators ("1,234,567")
/// or a float-ish rendering ("1000.0").
fn parse_coordinate(raw: &str, field: &str, line: usize) -> Result<u64> {
    let cleaned = raw.trim().replace(',', "");
    let value: f64 = cleaned.parse().map_err(|_| {
        anyhow!("Row {line}: could not parse {field} value '{raw}' as a number")
    })?;
    if !value.is_finite() || value < 0.0 {
        bail!("Row {line}: {field} value '{raw}' is not a valid coordinate");
    }
    Ok(value.round() as u64)
}

/// An absent or blank frequency cell is `None`; a present but
/// unparseable one is an error.
fn parse_frequency(raw: Option<&str>, line: usize) -> Result<Option<f64>> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r.trim(),
        _ => return Ok(None),
    };
    let value: f64 = raw
        .parse()
        .map_err(|_| anyhow!("Row {line}: could not parse frequency value '{raw}' as a number"))?;
    if !value.is_finite() {
        bail!("Row {line}: frequency value '{raw}' is not finite");
    }
    Ok(Some(value))
}

struct Columns {
    chrom: usize,
    start: usize,
    end: usize,
    ancestry: usize,
    frequency: Option<usize>,
}

fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn resolve_columns(headers: &[String]) -> Result<Columns> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let pick = |candidates: &[&str]| -> Option<usize> {
        candidates
            .iter()
            .find_map(|c| normalized.iter().position(|h| h == c))
    };

    let chrom = pick(&["chr", "chrom", "chromosome"]);
    let start = pick(&["start", "begin", "from"]);
    let end = pick(&["end", "stop", "to"]);
    let ancestry = pick(&["ancestry", "anc", "source", "pop", "label"]);
    let frequency = pick(&["frequency", "freq"]);

    match (chrom, start, end, ancestry) {
        (Some(chrom), Some(start), Some(end), Some(ancestry)) => Ok(Columns {
            chrom,
            start,
            end,
            ancestry,
            frequency,
        }),
        _ => bail!(
            "Could not resolve chr/start/end/ancestry columns in header: {:?}",
            headers
        ),
    }
}

/// Splits the raw text into a header row and data rows. Tab-separated is
/// tried first; if that yields fewer than 3 columns the table is re-split
/// on runs of whitespace instead.
fn parse_table(raw: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(raw.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("Could not read table header")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.len() >= 3 {
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Could not read table row")?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }
        return Ok((headers, rows));
    }

    // Whitespace-run fallback for space-aligned tables.
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let headers: Vec<String> = lines
        .next()
        .map(|l| l.split_whitespace().map(|f| f.to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = lines
        .map(|l| l.split_whitespace().map(|f| f.to_string()).collect())
        .collect();
    Ok((headers, rows))
}

/// Reads a local-ancestry segment table and returns the normalized,
/// sorted segment collection. Rows with `end <= start` are dropped; if
/// nothing survives the filter this is an error, not an empty result.
pub fn read_segments(path: &Path) -> Result<Vec<Segment>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Could not read segment file '{}'", path.display()))?;
    if raw.trim().is_empty() {
        bail!("Segment file '{}' is empty", path.display());
    }

    let (headers, rows) = parse_table(&raw)?;
    let columns = resolve_columns(&headers)?;

    if rows.is_empty() {
        bail!(
            "Segment file '{}' contains a header but no data rows",
            path.display()
        );
    }

    let mut segments = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let line = i + 2; // 1-based, after the header
        let field = |idx: usize, name: &str| -> Result<&String> {
            row.get(idx)
                .ok_or_else(|| anyhow!("Row {line}: missing {name} column"))
        };
        let chrom = normalize_chrom_name(field(columns.chrom, "chromosome")?);
        let start = parse_coordinate(field(columns.start, "start")?, "start", line)?;
        let end = parse_coordinate(field(columns.end, "end")?, "end", line)?;
        let ancestry = field(columns.ancestry, "ancestry")?.trim().to_string();
        let frequency = match columns.frequency {
            Some(idx) => parse_frequency(row.get(idx).map(|s| s.as_str()), line)?,
            None => None,
        };
        if end <= start {
            continue;
        }
        segments.push(Segment {
            chrom,
            start,
            end,
            ancestry,
            frequency,
        });
    }

    if segments.is_empty() {
        bail!(
            "No valid segments left after filtering '{}' (all rows had end <= start)",
            path.display()
        );
    }

    segments.sort_by(|a, b| {
        compare_chroms(&a.chrom, &b.chrom)
            .then(a.start.cmp(&b.start))
            .then(a.end.cmp(&b.end))
    });
    Ok(segments)
}

/// Distinct chromosome names in natural order.
pub fn chromosomes(segments: &[Segment]) -> Vec<String> {
    let mut names: Vec<String> = segments.iter().map(|s| s.chrom.clone()).collect();
    names.sort_by(|a, b| compare_chroms(a, b));
    names.dedup();
    names
}

/// Distinct ancestry labels, lexically sorted.
pub fn ancestry_labels(segments: &[Segment]) -> Vec<String> {
    let mut labels: Vec<String> = segments.iter().map(|s| s.ancestry.clone()).collect();
    labels.sort();
    labels.dedup();
    labels
}

/// Maximum end coordinate per chromosome; defines each bar's rendered span.
pub fn chromosome_extent(segments: &[Segment], chrom: &str) -> u64 {
    segments
        .iter()
        .filter(|s| s.chrom == chrom)
        .map(|s| s.end)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_tab_separated_table() {
        let file = write_temp("Chr\tStart\tEnd\tAncestry\nchr1\t0\t500\tA\n1\t500\t1000\tB\n");
        let segments = read_segments(file.path()).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].chrom, "chr1");
        assert_eq!(segments[1].chrom, "chr1");
        assert_eq!(segments[1].start, 500);
        assert_eq!(segments[1].ancestry, "B");
    }

    #[test]
    fn falls_back_to_whitespace_runs() {
        let file = write_temp("chrom  start   end  source\nchr2   10   20   Mo-OD\n");
        let segments = read_segments(file.path()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].chrom, "chr2");
        assert_eq!(segments[0].ancestry, "Mo-OD");
    }

    #[test]
    fn strips_thousands_separators() {
        let file = write_temp("chr\tstart\tend\tanc\nchr1\t1,000\t2,500,000\tA\n");
        let segments = read_segments(file.path()).unwrap();
        assert_eq!(segments[0].start, 1000);
        assert_eq!(segments[0].end, 2_500_000);
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        let file = write_temp("chr\tstart\tend\tanc\nchr1\tabc\t100\tA\n");
        let err = read_segments(file.path()).unwrap_err().to_string();
        assert!(err.contains("start"), "{err}");
    }

    #[test]
    fn drops_inverted_rows_but_keeps_the_rest() {
        let file = write_temp(
            "chr\tstart\tend\tancestry\nchr1\t0\t500\tA\nchr1\t500\t1000\tB\nchr2\t0\t800\tA\nchr2\t800\t800\tB\n",
        );
        let segments = read_segments(file.path()).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(chromosomes(&segments), vec!["chr1", "chr2"]);
        assert_eq!(ancestry_labels(&segments), vec!["A", "B"]);
    }

    #[test]
    fn fails_when_filter_leaves_nothing() {
        let file = write_temp("chr\tstart\tend\tanc\nchr1\t500\t500\tA\n");
        let err = read_segments(file.path()).unwrap_err().to_string();
        assert!(err.contains("No valid segments"), "{err}");
    }

    #[test]
    fn fails_on_header_only_input() {
        let file = write_temp("chr\tstart\tend\tancestry\n");
        let err = read_segments(file.path()).unwrap_err().to_string();
        assert!(err.contains("no data rows"), "{err}");
    }

    #[test]
    fn fails_on_empty_file() {
        let file = write_temp("");
        assert!(read_segments(file.path()).is_err());
    }

    #[test]
    fn fails_on_unresolvable_columns() {
        let file = write_temp("alpha\tbeta\tgamma\tdelta\n1\t2\t3\t4\n");
        let err = read_segments(file.path()).unwrap_err().to_string();
        assert!(err.contains("chr/start/end/ancestry"), "{err}");
    }

    #[test]
    fn reads_optional_frequency_column() {
        let file = write_temp(
            "Chr\tStart\tEnd\tAncestry\tFrequency\nchr1\t0\t500\tA\t0.85\nchr1\t500\t1000\tB\t\n",
        );
        let segments = read_segments(file.path()).unwrap();
        assert_eq!(segments[0].frequency, Some(0.85));
        assert_eq!(segments[1].frequency, None);

        let plain = write_temp("chr\tstart\tend\tanc\nchr1\t0\t500\tA\n");
        let segments = read_segments(plain.path()).unwrap();
        assert_eq!(segments[0].frequency, None);
    }

    #[test]
    fn rejects_non_numeric_frequency() {
        let file = write_temp("chr\tstart\tend\tanc\tfreq\nchr1\t0\t500\tA\thigh\n");
        let err = read_segments(file.path()).unwrap_err().to_string();
        assert!(err.contains("frequency"), "{err}");
    }

    #[test]
    fn natural_order_puts_numbers_before_sex_and_mito() {
        let mut names = vec![
            "chrM".to_string(),
            "chrX".to_string(),
            "chr10".to_string(),
            "chr2".to_string(),
            "chrUn_scaffold".to_string(),
            "chr1".to_string(),
        ];
        names.sort_by(|a, b| compare_chroms(a, b));
        assert_eq!(
            names,
            vec!["chr1", "chr2", "chr10", "chrX", "chrM", "chrUn_scaffold"]
        );
    }

    #[test]
    fn extent_is_max_end_per_chromosome() {
        let file = write_temp("chr\tstart\tend\tanc\nchr1\t0\t500\tA\nchr1\t500\t900\tB\n");
        let segments = read_segments(file.path()).unwrap();
        assert_eq!(chromosome_extent(&segments, "chr1"), 900);
        assert_eq!(chromosome_extent(&segments, "chr2"), 0);
    }
}
