use std::io;

use fdtd_materials::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 2 mm cells at 99% of the Courant limit
    let grid = GridContext::with_courant(2e-3, 2e-3, 2e-3, 0.99)?;

    let mut materials = MaterialCollection::with_builtins();
    materials.push(Material::water())?;
    materials.push(Material::grass())?;
    let drude = Dispersion::Drude(vec![DrudePole { frequency: 1.0e10, inverse_relaxation: 1.0e9 }]);
    materials.push(Material::new("metal_film", 1.0, 0.0, 1.0, 0.0)?.with_dispersion(drude)?)?;

    let loam = PeplinskiSoil::new("loam", 0.5, 0.5, 2.0, 2.66, (0.001, 0.25))?;
    loam.calculate_debye_properties(5, "earth", &mut materials)?;

    let highland = BruggemanSoil::new(
        "highland",
        [(4.0, 6.0), (0.5, 1.0), (20.0, 28.0), (5.0, 9.0), (44.0, 46.0), (12.0, 16.0)],
        100e6,
    )?;
    let mut rng = StdRng::seed_from_u64(2024);
    highland.calculate_debye_properties(3, "moon", &mut materials, &mut rng)?;

    let catalog = process_materials(&materials, &grid)?;
    println!(
        "dt = {:.6e} s, {} materials, {} pole slots",
        grid.dt(),
        catalog.len(),
        catalog.max_poles()
    );
    println!("{}", catalog.summary);

    // Water permittivity from 10 MHz to 100 GHz
    let freqs = logspace_hz(1e7, 1e11, 17)?;
    let points = permittivity_sweep(&Material::water(), freqs)?;
    write_permittivity_csv(io::stdout().lock(), &points)?;
    Ok(())
}
