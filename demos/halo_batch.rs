use halo_corrector::correction::batch::{correct_all, CorrectionJob};
use halo_corrector::{CorrectionMode, CorrectorConfig, Cr3bpSystem, SynodicState, Tolerances};

/// Corrects a fan of L2 halo orbits with different out-of-plane amplitudes
/// in parallel, each starting from the same in-plane guess.
fn main() -> anyhow::Result<()> {
    let system = Cr3bpSystem::lookup("earth-moon")?;
    let config = CorrectorConfig::with_mode(CorrectionMode::FixZ);

    let jobs: Vec<CorrectionJob> = (0..8)
        .map(|i| {
            let z0 = -0.125 - 0.004 * i as f64;
            CorrectionJob {
                name: format!("z0 = {:.3}", z0),
                mu: system.mu,
                state: SynodicState::new(1.154, 0.0, z0, 0.0, -0.2149, 0.0),
                period: 3.3731,
                config,
                tolerances: Tolerances::default(),
            }
        })
        .collect();

    let outcomes = correct_all(&jobs);

    println!("{:<14} {:>5} {:>18} {:>18} {:>10}", "job", "iter", "x0", "vy0", "T [days]");
    for out in &outcomes {
        match &out.result {
            Ok(r) if r.converged => println!(
                "{:<14} {:>5} {:>18.12} {:>18.12} {:>10.4}",
                out.name,
                r.iterations,
                r.state.pos.x,
                r.state.vel.y,
                system.period_to_days(r.period)
            ),
            Ok(r) => println!("{:<14} not converged after {} iterations", out.name, r.iterations),
            Err(e) => println!("{:<14} failed: {}", out.name, e),
        }
    }
    Ok(())
}
