use gs_engine::Engine;
use gs_grid::GridSpace;
use gs_report::{ConsoleSink, MemorySink};
use gs_types::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("GridScape surface scan example");

    // The parameter state: one scalar rate parameter and one shape parameter.
    let store = MemoryStore::new()
        .with_parameter("kappa", vec![2.0])?
        .with_parameter("gammaShape", vec![1.0])?;

    // A 5 x 3 grid: kappa stepped over a range, gammaShape over explicit
    // values. kappa is the outer (slowest) axis.
    let specs = vec![
        AxisSpec::with_range("kappa", 0.5, 2.5, 0.5),
        AxisSpec::with_values("gammaShape", vec![0.5, 1.0, 2.0]),
    ];
    let space = GridSpace::from_specs(&specs)?;
    println!("Grid has {} points", space.grid_size()?);

    // A toy log-density with its optimum at kappa = 2, gammaShape = 1.
    let objective = Box::new(|state: &dyn ParameterStore| -> GsResult<f64> {
        let kappa = state.value("kappa", 0)?;
        let shape = state.value("gammaShape", 0)?;
        Ok(-(kappa - 2.0) * (kappa - 2.0) - (shape - 1.0) * (shape - 1.0))
    });

    let config = ScanConfig::new("example_surface");
    let mut engine = Engine::new(config, store, space, objective)?;

    let sink = MemorySink::new();
    let rows = sink.rows();
    engine.add_sink(Box::new(sink));
    engine.add_sink(Box::new(ConsoleSink::new()));

    let report = engine.run()?;
    println!(
        "Evaluated {} grid points in {:.3}s, final log-density {}",
        report.total_samples, report.elapsed_seconds, report.final_log_density
    );

    // Find the best grid point among the captured rows.
    let rows = rows.borrow();
    let best = rows
        .iter()
        .max_by(|a, b| a.log_density.total_cmp(&b.log_density))
        .expect("grid is never empty");
    println!(
        "Best point: sample {} at {:?} with log-density {}",
        best.sample, best.point, best.log_density
    );

    Ok(())
}
