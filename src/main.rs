use std::{env, error::Error, path::PathBuf, time::Instant};

use ndarray::{Array2, Axis};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mnist_idx::{
    data_loader,
    grid,
    recorders::{JSONRecorder, Recorder},
    DataSet, EvaluationReport,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

// Mean image of every digit, one row per class.
fn class_centroids(data: &DataSet) -> Array2<f32> {
    let x = data.intensity_matrix();
    let y = data.label_matrix();
    let counts = y.sum_axis(Axis(0)).mapv(|c| c.max(1.0));
    y.t().dot(&x) / counts.insert_axis(Axis(1))
}

fn nearest(centroids: &Array2<f32>, x: &[f32]) -> usize {
    centroids
        .outer_iter()
        .map(|c| c.iter().zip(x).map(|(a, b)| (a - b) * (a - b)).sum::<f32>())
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let mut args = env::args().skip(1);
    let data_dir = args.next().unwrap_or_else(|| "tmp/mnist".into());
    let grid_path = PathBuf::from(args.next().unwrap_or_else(|| "tmp/reconstructions.png".into()));

    let start_time = Instant::now();
    let (trn_data, tst_data) = data_loader::load_mnist(&data_dir)?;
    info!(elapsed = ?start_time.elapsed(), "loaded both splits");

    let centroids = class_centroids(&trn_data);
    let classify = |x: &[f32]| nearest(&centroids, x);
    let report = EvaluationReport::evaluate(&tst_data, &classify);
    println!("Nearest centroid: {}", report);
    JSONRecorder::save(&report, &grid_path.with_extension("json"))?;

    // Each digit is "reconstructed" as the centroid of the class it is closest to.
    let reconstruct = |x: &[f32]| centroids.row(nearest(&centroids, x)).to_vec();
    grid::save_reconstruction_grid(&grid_path, &reconstruct, &tst_data, 8, 6)?;

    println!("Done: time({:?})", start_time.elapsed());
    Ok(())
}
