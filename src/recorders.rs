use std::{fs::File, io, path::Path};

use super::evaluation::EvaluationReport;

// Trait for saving/loading evaluation reports into/from files
pub trait Recorder {
    fn save(report: &EvaluationReport, file_path: &Path) -> io::Result<()>;

    fn load(file_path: &Path) -> io::Result<EvaluationReport>;
}

pub struct JSONRecorder;

impl Recorder for JSONRecorder {
    fn save(report: &EvaluationReport, file_path: &Path) -> io::Result<()> {
        let file = File::create(file_path)?;
        serde_json::to_writer_pretty(file, report)?;
        Ok(())
    }

    fn load(file_path: &Path) -> io::Result<EvaluationReport> {
        let file = File::open(file_path)?;
        let report = serde_json::from_reader(file)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataSet;

    #[test]
    fn json_report_survives_a_file() {
        let data = DataSet::assemble(vec![vec![0; 1], vec![255; 1]], vec![0, 1], 1, 1).unwrap();
        let report = EvaluationReport::evaluate(&data, &|x: &[f32]| (x[0] > 0.5) as usize);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        JSONRecorder::save(&report, &path).unwrap();

        let json: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(json["correct"], 2);
        assert_eq!(json["histogram"]["total"][1], 1);

        assert_eq!(JSONRecorder::load(&path).unwrap(), report);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JSONRecorder::load(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
