use halo_corrector::correction::{IterationObserver, IterationState};
use halo_corrector::system::{jacobi_constant, monodromy, stability_index};
use halo_corrector::{
    ssdc_periodic_xzplane, CorrectionMode, Corrector, CorrectorConfig, Cr3bpSystem, SynodicState,
};

/// Prints the residual and how much it shrank since the last iteration.
struct ContractionPrinter {
    last: Option<f64>,
}

impl IterationObserver for ContractionPrinter {
    fn on_iteration(&mut self, record: &IterationState) {
        match self.last {
            Some(prev) => println!(
                "  iter {:>2}  |f| = {:>10.3e}  ratio = {:>9.2e}",
                record.iteration,
                record.residual_norm,
                record.residual_norm / prev
            ),
            None => println!("  iter {:>2}  |f| = {:>10.3e}", record.iteration, record.residual_norm),
        }
        self.last = Some(record.residual_norm);
    }
}

fn main() -> anyhow::Result<()> {
    let system = Cr3bpSystem::lookup("earth-moon")?;
    let guess = SynodicState::new(1.154, 0.0, -0.1384, 0.0, -0.2149, 0.0);
    let period_guess = 3.3731;

    println!("{}", system);
    println!("Fixing z0 = {} and correcting x0, vy0, T:", guess.pos.z);
    let mut printer = ContractionPrinter { last: None };
    let fix_z = Corrector::rkf78().correct_with(
        system.mu,
        &guess,
        period_guess,
        &CorrectorConfig::with_mode(CorrectionMode::FixZ),
        &mut printer,
    )?;
    println!(
        "  converged = {}, T = {:.12} ({:.3} days), C = {:.12}",
        fix_z.converged,
        fix_z.period,
        system.period_to_days(fix_z.period),
        jacobi_constant(system.mu, &fix_z.state)
    );

    // Perturb the converged orbit and recover it with the period held fixed
    let mut perturbed = fix_z.state;
    perturbed.pos.x += 1e-4;
    perturbed.vel.y += 1e-4;
    let fix_period = ssdc_periodic_xzplane(
        system.mu,
        &perturbed,
        fix_z.period,
        &CorrectorConfig::with_mode(CorrectionMode::FixPeriod),
    )?;
    let gap = (fix_period.state.to_vector() - fix_z.state.to_vector()).norm();
    println!(
        "Fixed-period recovery: {} iterations, |dx| to fix-z solution = {:.2e}",
        fix_period.iterations, gap
    );

    let m = monodromy(system.mu, &fix_z.state, fix_z.period)?;
    println!(
        "Stability index {:.3}, det(M) - 1 = {:.2e}",
        stability_index(&m),
        m.determinant() - 1.0
    );
    Ok(())
}
