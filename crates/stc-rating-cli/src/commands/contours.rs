//! Reference contour table command.

use anyhow::{Result, bail};
use stc_rating::RatingEngine;

pub fn run(engine: &RatingEngine, index: Option<usize>) -> Result<()> {
    let table = engine.table();

    if let Some(index) = index {
        let Some(curve) = table.curve(index) else {
            bail!("Contour index {} out of range 0..{}", index, table.len());
        };
        println!("STC {}", index);
        println!("{:-<24}", "");
        for (frequency, value) in curve {
            println!("{:>10} Hz {:>8.0} dB", frequency, value);
        }
        return Ok(());
    }

    print!("{:>5}", "STC");
    for frequency in table.band().iter() {
        print!(" {:>5}", frequency);
    }
    println!();

    for (index, contour) in table.iter() {
        print!("{:>5}", index);
        for value in contour {
            print!(" {:>5.0}", value);
        }
        println!();
    }

    Ok(())
}
