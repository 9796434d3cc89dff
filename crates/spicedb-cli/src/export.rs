//! CSV export of normalized rows.

use std::io::Write;
use std::path::Path;

use spicedb_core::NormalizedRow;

/// Column order of the exported table.
pub(crate) const CSV_COLUMNS: [&str; 8] = [
    "name",
    "form",
    "size_label",
    "net_weight_g",
    "price_usd",
    "in_stock",
    "url",
    "vendor",
];

/// Writes `rows` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn write_csv(path: &Path, rows: &[NormalizedRow]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| anyhow::anyhow!("failed to create {}: {e}", path.display()))?;
    write_rows(file, rows)
}

/// Writes a header line and one record per row. The header is written even
/// when `rows` is empty.
///
/// # Errors
///
/// Returns an error if serialization or the underlying writer fails.
pub(crate) fn write_rows<W: Write>(writer: W, rows: &[NormalizedRow]) -> anyhow::Result<()> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(CSV_COLUMNS)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str) -> NormalizedRow {
        NormalizedRow {
            name: name.to_owned(),
            form: Some("Ground".to_owned()),
            size_label: None,
            net_weight_g: Some(56.699),
            price_usd: Some(5.49),
            in_stock: true,
            url: "https://worldspice.com/products/cumin".to_owned(),
            vendor: Some("worldspice".to_owned()),
            weight_source: None,
        }
    }

    fn render(rows: &[NormalizedRow]) -> String {
        let mut buf = Vec::new();
        write_rows(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_export_still_has_header() {
        assert_eq!(
            render(&[]),
            "name,form,size_label,net_weight_g,price_usd,in_stock,url,vendor\n"
        );
    }

    #[test]
    fn absent_fields_are_empty_cells() {
        let out = render(&[row("Cumin")]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Cumin,Ground,,56.699,5.49,true,https://worldspice.com/products/cumin,worldspice"
        );
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let mut r = row("Pepper, Black");
        r.net_weight_g = None;
        r.price_usd = None;
        r.vendor = None;
        let out = render(&[r]);
        assert_eq!(
            out.lines().nth(1).unwrap(),
            r#""Pepper, Black",Ground,,,,true,https://worldspice.com/products/cumin,"#
        );
    }

    #[test]
    fn write_csv_creates_file() {
        let path = std::env::temp_dir().join(format!("spicedb-export-{}.csv", std::process::id()));
        write_csv(&path, &[row("Cumin"), row("Nutmeg")]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(written.lines().count(), 3);
    }
}
