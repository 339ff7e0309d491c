//! End-to-end JSON → XLSX transcript export.

use gradekit_io_xlsx::{SpecXlsxSheetWriteOptions, XlsxWriter};

use crate::extract::{load_document, select_content};
use crate::spec::{ConvertError, SpecConvertOptions, SpecConvertReport};
use crate::table::TranscriptTable;

/// Convert the records at `data.content` of `path_file_in` into a one-sheet workbook.
///
/// The destination is only written once the whole table is built, so read,
/// parse and lookup failures leave no output file behind. An existing
/// destination is overwritten.
pub fn convert(options: &SpecConvertOptions) -> Result<SpecConvertReport, ConvertError> {
    let document = load_document(&options.path_file_in)?;
    let table = TranscriptTable::from_content(select_content(&document)?)?;
    log::info!(
        "Read {} records from {}",
        table.height(),
        options.path_file_in.display()
    );

    let mut writer = XlsxWriter::with_defaults(&options.path_file_out);
    writer
        .write_sheet_from_columns(
            &table.to_sheet_columns(),
            &options.sheet_name,
            &SpecXlsxSheetWriteOptions {
                if_keep_missing_values: Some(options.if_keep_missing_values),
                ..Default::default()
            },
        )
        .map_err(ConvertError::Xlsx)?;
    writer.close().map_err(ConvertError::Xlsx)?;

    let mut report = SpecConvertReport {
        path_file_out: writer.file_out().to_path_buf(),
        cnt_records: table.height(),
        sheet_names: vec![],
        warnings: vec![],
    };
    for report_xlsx in writer.report() {
        report
            .sheet_names
            .extend(report_xlsx.sheets.into_iter().map(|s| s.sheet_name));
        report.warnings.extend(report_xlsx.warnings);
    }
    for c_warning in &report.warnings {
        log::warn!("{c_warning}");
    }
    log::info!(
        "Wrote {} rows to {} ({})",
        report.cnt_records,
        report.path_file_out.display(),
        report.sheet_names.join(", ")
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use calamine::{Data, Range, Reader, Xlsx, open_workbook};
    use pretty_assertions::assert_eq;
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::conf::derive_column_labels;

    fn create_options(dir: &TempDir, c_json: &str) -> SpecConvertOptions {
        let path_file_in = dir.path().join("response.json");
        fs::write(&path_file_in, c_json).unwrap();
        SpecConvertOptions {
            path_file_in,
            path_file_out: dir.path().join("ket_qua_hoc_tap.xlsx"),
            ..Default::default()
        }
    }

    fn read_sheet(path: &Path) -> Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        workbook.worksheet_range("Sheet1").unwrap()
    }

    fn read_row(range: &Range<Data>, n_row: usize) -> Vec<Data> {
        (0..derive_column_labels().len())
            .map(|n_col| match range.get((n_row, n_col)) {
                None => Data::Empty,
                Some(value) => value.clone(),
            })
            .collect()
    }

    fn derive_header_row() -> Vec<Data> {
        derive_column_labels()
            .iter()
            .map(|c_label| Data::String(c_label.to_string()))
            .collect()
    }

    #[test]
    fn test_convert_full_record() {
        let dir = tempdir().unwrap();
        let options = create_options(
            &dir,
            r#"{"data":{"content":[{"semester":"2023A","subjectCode":"CS101","subjectName":"Intro","credit":3,"point10":8.5,"pointChar":"B","point4":3.0}]}}"#,
        );

        let report = convert(&options).unwrap();
        assert_eq!(report.cnt_records, 1);
        assert_eq!(report.sheet_names, vec!["Sheet1".to_string()]);
        assert!(report.warnings.is_empty());

        let range = read_sheet(&options.path_file_out);
        assert_eq!(range.height(), 2);
        assert_eq!(read_row(&range, 0), derive_header_row());
        assert_eq!(
            read_row(&range, 1),
            vec![
                Data::String("2023A".to_string()),
                Data::String("CS101".to_string()),
                Data::String("Intro".to_string()),
                Data::Float(3.0),
                Data::Float(8.5),
                Data::String("B".to_string()),
                Data::Float(3.0),
            ]
        );
    }

    #[test]
    fn test_convert_missing_fields_are_blank() {
        let dir = tempdir().unwrap();
        let options = create_options(&dir, r#"{"data":{"content":[{"semester":"2023A"}]}}"#);

        convert(&options).unwrap();

        let range = read_sheet(&options.path_file_out);
        let l_row = read_row(&range, 1);
        assert_eq!(l_row[0], Data::String("2023A".to_string()));
        assert!(l_row[1..].iter().all(|value| *value == Data::Empty));
    }

    #[test]
    fn test_convert_empty_content_writes_header_only() {
        let dir = tempdir().unwrap();
        let options = create_options(&dir, r#"{"data":{"content":[]}}"#);

        let report = convert(&options).unwrap();
        assert_eq!(report.cnt_records, 0);

        let range = read_sheet(&options.path_file_out);
        assert_eq!(range.height(), 1);
        assert_eq!(read_row(&range, 0), derive_header_row());
    }

    #[test]
    fn test_convert_preserves_record_order() {
        let dir = tempdir().unwrap();
        let c_records = (0..25)
            .map(|n| format!(r#"{{"subjectCode":"MH{:03}","credit":{}}}"#, 25 - n, n % 4))
            .collect::<Vec<_>>()
            .join(",");
        let options = create_options(&dir, &format!(r#"{{"data":{{"content":[{c_records}]}}}}"#));

        let report = convert(&options).unwrap();
        assert_eq!(report.cnt_records, 25);

        let range = read_sheet(&options.path_file_out);
        assert_eq!(range.height(), 26);
        for n in 0..25 {
            let l_row = read_row(&range, n + 1);
            assert_eq!(l_row[1], Data::String(format!("MH{:03}", 25 - n)));
            assert_eq!(l_row[3], Data::Float((n % 4) as f64));
        }
    }

    #[test]
    fn test_convert_mixed_columns_keep_native_cell_types() {
        let dir = tempdir().unwrap();
        let options = create_options(
            &dir,
            r#"{"data":{"content":[{"credit":3,"point10":true},{"credit":"ba","point10":8.5},{"credit":[1,2],"point10":8.125}]}}"#,
        );

        convert(&options).unwrap();

        let range = read_sheet(&options.path_file_out);
        assert_eq!(range.get((1, 3)), Some(&Data::Float(3.0)));
        assert_eq!(range.get((2, 3)), Some(&Data::String("ba".to_string())));
        assert_eq!(range.get((3, 3)), Some(&Data::String("[1,2]".to_string())));
        assert_eq!(range.get((1, 4)), Some(&Data::Bool(true)));
        assert_eq!(range.get((2, 4)), Some(&Data::Float(8.5)));
        assert_eq!(range.get((3, 4)), Some(&Data::Float(8.125)));
    }

    #[test]
    fn test_convert_missing_content_leaves_no_output() {
        let dir = tempdir().unwrap();
        let options = create_options(&dir, r#"{"data":{"items":[]}}"#);

        let err = convert(&options).unwrap_err();
        assert!(matches!(err, ConvertError::MissingKey { .. }));
        assert!(!options.path_file_out.exists());
    }

    #[test]
    fn test_convert_malformed_json_leaves_no_output() {
        let dir = tempdir().unwrap();
        let options = create_options(&dir, r#"{"data":{"content":[{"semester":}]}}"#);

        let err = convert(&options).unwrap_err();
        assert!(matches!(err, ConvertError::Parse { .. }));
        assert!(!options.path_file_out.exists());
    }

    #[test]
    fn test_convert_overwrites_existing_output() {
        let dir = tempdir().unwrap();
        let options = create_options(&dir, r#"{"data":{"content":[{"semester":"2024B"}]}}"#);
        fs::write(&options.path_file_out, b"stale bytes").unwrap();

        convert(&options).unwrap();

        let range = read_sheet(&options.path_file_out);
        assert_eq!(read_row(&range, 1)[0], Data::String("2024B".to_string()));
    }

    #[test]
    fn test_convert_unwritable_output_is_xlsx_error() {
        let dir = tempdir().unwrap();
        let mut options = create_options(&dir, r#"{"data":{"content":[]}}"#);
        options.path_file_out = dir.path().join("no_such_dir").join("out.xlsx");

        let err = convert(&options).unwrap_err();
        assert!(matches!(err, ConvertError::Xlsx(_)));
    }

    #[test]
    fn test_convert_missing_input_is_io_error() {
        let dir = tempdir().unwrap();
        let options = SpecConvertOptions {
            path_file_in: dir.path().join("response.json"),
            path_file_out: dir.path().join("out.xlsx"),
            ..Default::default()
        };

        let err = convert(&options).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
        assert!(!options.path_file_out.exists());
    }

    #[test]
    fn test_confirmation_names_output_file() {
        let report = SpecConvertReport {
            path_file_out: "ket_qua_hoc_tap.xlsx".into(),
            cnt_records: 0,
            sheet_names: vec![],
            warnings: vec![],
        };
        assert_eq!(
            report.format_confirmation(),
            "✅ Đã xuất file ket_qua_hoc_tap.xlsx"
        );
    }
}
