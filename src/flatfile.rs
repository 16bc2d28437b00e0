//! Line oriented text format for records.
//!
//! One record per line, `id,full_name,age,weight,steps_today,calories_burned`,
//! no header and no quoting. A name containing a comma does not survive a
//! reload.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::record::{HalfUp, Record};
use crate::result::{DbResult, FitBaseError};

const FIELD_COUNT: usize = 6;

/// Load every record from the file at `path`, in file order.
///
/// Lines that do not split into exactly six fields are skipped. A field that
/// fails to parse as a number aborts the whole load. Duplicate ids are
/// returned as they appear.
pub fn load(path: impl AsRef<Path>) -> DbResult<Vec<Record>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        let mut fields: Vec<&str> = line.split(',').collect();
        while fields.last().is_some_and(|field| field.is_empty()) {
            fields.pop();
        }

        if fields.len() != FIELD_COUNT {
            log::warn!(
                "Skipping line {} of {}: expected {} fields, found {}",
                line_number,
                path.as_ref().display(),
                FIELD_COUNT,
                fields.len()
            );
            continue;
        }

        records.push(Record {
            id: parse_field(fields[0], "id", line_number)?,
            full_name: fields[1].trim().to_owned(),
            age: parse_field(fields[2], "age", line_number)?,
            weight: parse_field(fields[3], "weight", line_number)?,
            steps_today: parse_field(fields[4], "steps_today", line_number)?,
            calories_burned: parse_field(fields[5], "calories_burned", line_number)?,
        });
    }

    log::debug!(
        "Loaded {} records from {}",
        records.len(),
        path.as_ref().display()
    );

    Ok(records)
}

/// Overwrite the file at `path` with `records`, one line each, in the given order.
///
/// The write is not atomic; a failure part way through can leave a truncated file.
pub fn save(path: impl AsRef<Path>, records: &[Record]) -> DbResult<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);

    for record in records {
        writeln!(writer, "{}", encode_line(record))?;
    }
    writer.flush()?;

    log::debug!(
        "Saved {} records to {}",
        records.len(),
        path.as_ref().display()
    );

    Ok(())
}

fn encode_line(record: &Record) -> String {
    format!(
        "{},{},{},{},{},{}",
        record.id,
        record.full_name,
        record.age,
        HalfUp(record.weight, 1),
        record.steps_today,
        HalfUp(record.calories_burned, 2)
    )
}

fn parse_field<T: FromStr>(raw: &str, field: &'static str, line: usize) -> DbResult<T> {
    raw.trim().parse().map_err(|_| FitBaseError::Parse {
        line,
        field,
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_lines(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("records.txt");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");

        let records = vec![
            Record::new(3, "Sample User", 25, 150.5, 8000, 300.25),
            Record::new(1, "Jane Doe", 41, 130.0, 6000, 210.5),
            Record::new(-2, "Sam Lee", 19, 180.2, 0, 0.0),
        ];
        save(&path, &records).unwrap();

        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn save_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");

        save(&path, &[Record::new(1, "A", 30, 150.0, 1000, 200.0)]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1,A,30,150.0,1000,200.00\n"
        );
    }

    #[test]
    fn save_rounds_ties_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");

        save(
            &path,
            &[
                Record::new(1, "A", 30, 150.25, 1000, 0.125),
                Record::new(2, "B", 30, 150.15, 1000, 310.455),
            ],
        )
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1,A,30,150.3,1000,0.13\n2,B,30,150.2,1000,310.46\n"
        );
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(&dir, "9,Old Entry,50,200.0,10,1.00\n8,Older,51,201.0,11,2.00\n");

        let records = vec![Record::new(1, "New Entry", 20, 120.0, 500, 50.0)];
        save(&path, &records).unwrap();

        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn save_empty_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(&dir, "1,A,30,150.0,1000,200.00\n");

        save(&path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_skips_wrong_field_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(&dir, "1,A,30,150.0,1000,200.0\nbad,line\n");

        let records = load(&path).unwrap();

        assert_eq!(records, vec![Record::new(1, "A", 30, 150.0, 1000, 200.0)]);
    }

    #[test]
    fn load_skips_blank_and_trailing_comma_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(
            &dir,
            "\n1,A,30,150.0,1000,\n2,B,31,151.0,1001,201.0,extra\n3,C,32,152.0,1002,202.0\n",
        );

        let ids: Vec<i32> = load(&path).unwrap().iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn load_trims_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(&dir, " 4 , Sample User , 25 , 150.5 , 8000 , 300.25 \r\n");

        assert_eq!(
            load(&path).unwrap(),
            vec![Record::new(4, "Sample User", 25, 150.5, 8000, 300.25)]
        );
    }

    #[test]
    fn load_aborts_on_bad_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(&dir, "1,A,30,150.0,1000,200.0\n2,B,thirty,150.0,1000,200.0\n");

        assert!(matches!(
            load(&path),
            Err(FitBaseError::Parse {
                line: 2,
                field: "age",
                ..
            })
        ));
    }

    #[test]
    fn load_keeps_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(&dir, "1,A,30,150.0,1000,200.0\n1,B,31,151.0,1001,201.0\n");

        let names: Vec<String> = load(&path)
            .unwrap()
            .into_iter()
            .map(|r| r.full_name)
            .collect();

        assert_eq!(names, vec!["A".to_owned(), "B".to_owned()]);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = load(dir.path().join("missing.txt"));

        assert!(matches!(result, Err(FitBaseError::Io(_))));
    }

    #[test]
    fn save_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = save(dir.path(), &[Record::new(1, "A", 30, 150.0, 1000, 200.0)]);

        assert!(matches!(result, Err(ref err) if err.is_io()));
    }
}
