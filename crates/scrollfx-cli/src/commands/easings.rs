use anyhow::{bail, Result};
use scrollfx_core::Easing;

pub fn run(samples: usize) -> Result<()> {
    if samples < 2 {
        bail!("Need at least 2 samples, got {}", samples);
    }

    let steps: Vec<f64> = (0..samples)
        .map(|i| i as f64 / (samples - 1) as f64)
        .collect();

    print!("{:<18}", "easing");
    for t in &steps {
        print!("{:>8.2}", t);
    }
    println!();

    for easing in Easing::ALL {
        print!("{:<18}", easing.name());
        for t in &steps {
            print!("{:>8.3}", easing.apply(*t));
        }
        println!();
    }
    Ok(())
}
