//! Gnuplot map files of the scenario
//!
//! Diagnostic output only; nothing here is read back. One `set object` line
//! per obstacle footprint and one `set label` line per device.

use crate::geometry::Obstacle;
use crate::scenario::{Device, DeviceKind, ScenarioDescriptor};
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const BUILDINGS_FILE: &str = "buildings.txt";
pub const UES_FILE: &str = "ues.txt";
pub const ENBS_FILE: &str = "enbs.txt";

pub fn write_obstacles<W: Write>(out: &mut W, obstacles: &[Obstacle]) -> std::io::Result<()> {
    for (index, obstacle) in obstacles.iter().enumerate() {
        let b = &obstacle.bounds;
        writeln!(
            out,
            "set object {} rect from {},{} to {},{} front fs empty ",
            index + 1,
            b.x_min,
            b.y_min,
            b.x_max,
            b.y_max
        )?;
    }
    Ok(())
}

fn write_label<W: Write>(
    out: &mut W,
    device: &Device,
    colour: &str,
    point: u8,
) -> std::io::Result<()> {
    writeln!(
        out,
        "set label \"{id}\" at {x},{y} left font \"Helvetica,8\" textcolor rgb \"{colour}\" \
         front point pt {point} ps 0.3 lc rgb \"{colour}\" offset 0,0",
        id = device.id,
        x = device.position.x,
        y = device.position.y,
    )
}

pub fn write_ues<W: Write>(out: &mut W, devices: &[Device]) -> std::io::Result<()> {
    for device in devices.iter().filter(|d| d.kind == DeviceKind::UserEquipment) {
        write_label(out, device, "black", 1)?;
    }
    Ok(())
}

/// LTE cells in blue, mmWave cells in red
pub fn write_cells<W: Write>(out: &mut W, devices: &[Device]) -> std::io::Result<()> {
    for device in devices {
        match device.kind {
            DeviceKind::LteCell => write_label(out, device, "blue", 4)?,
            DeviceKind::MmWaveCell => write_label(out, device, "red", 4)?,
            DeviceKind::UserEquipment => {}
        }
    }
    Ok(())
}

fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut out = BufWriter::new(File::create(path)?);
    body(&mut out)?;
    out.flush()?;
    Ok(())
}

/// Write all three map files into `dir`, returning their paths
pub fn write_map_files(
    descriptor: &ScenarioDescriptor,
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let buildings = dir.join(BUILDINGS_FILE);
    let ues = dir.join(UES_FILE);
    let enbs = dir.join(ENBS_FILE);

    write_file(&buildings, |out| write_obstacles(out, descriptor.obstacles()))?;
    write_file(&ues, |out| write_ues(out, descriptor.devices()))?;
    write_file(&enbs, |out| write_cells(out, descriptor.devices()))?;

    info!("Wrote map files to {}", dir.display());
    Ok(vec![buildings, ues, enbs])
}
