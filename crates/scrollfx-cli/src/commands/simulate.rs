use std::path::Path;

use anyhow::Result;
use scrollfx_core::{AppConfig, FrameRecord};

pub fn run(config: &AppConfig, path: &Path, offsets: Option<Vec<f64>>, json: bool) -> Result<()> {
    let mut runtime = super::load_runtime(config, path)?;
    if let Some(offsets) = offsets {
        runtime.script.offsets = offsets;
    }

    if runtime.script.offsets.is_empty() {
        println!("Scenario `{}` has no scripted offsets.", runtime.name);
        println!("\nAdd a script to the scenario or pass offsets:");
        println!("  scrollfx simulate {} --offsets 0,200,400", path.display());
        return Ok(());
    }

    let frames = runtime.run_script();

    if json {
        for frame in &frames {
            println!("{}", serde_json::to_string(frame)?);
        }
        return Ok(());
    }

    println!("Scenario `{}` ({} frames):\n", runtime.name, frames.len());
    for frame in &frames {
        print_frame(frame);
    }

    let faults: usize = frames.iter().map(|f| f.faults.len()).sum();
    if faults > 0 {
        println!("{} callback faults", faults);
    }
    Ok(())
}

fn print_frame(frame: &FrameRecord) {
    println!(
        "  #{:<4} t={:>7.1}ms  y={:>7.1}  v={:>6.2}",
        frame.frame, frame.timestamp, frame.scroll_y, frame.velocity_y
    );
    for trigger in &frame.triggers {
        let state = if trigger.active { "*" } else { " " };
        println!(
            "    {} {:<24} {:>5.3}  [{:.0}, {:.0}]",
            state, trigger.name, trigger.progress, trigger.start, trigger.end
        );
    }
    for event in &frame.events {
        println!("    > {} {} at {:.3}", event.trigger, event.kind, event.progress);
    }
    for fault in &frame.faults {
        println!("    ! {}", fault);
    }
    println!();
}
