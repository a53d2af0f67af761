//! Subcommand implementations.

use std::path::{Path, PathBuf};

use colored::Colorize;
use cubesight_hal::sim::{SharedCube, SimActuator, SimCamera, SimCube};
use cubesight_hal::{Actuator, FrameFileCamera, SerialLink};
use cubesight_perception::{ColorClassifier, PixelMaps};
use cubesight_runtime::{Assembler, AssemblerConfig, SolveReport, SolveSession};
use cubesight_types::{Algorithm, CubeError, Facelet, Orientation, Rgb, SOLVED_FACELETS};
use serde_json::json;

use crate::config::{self, Config};

/// Output mode shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn print_json(self, value: serde_json::Value) {
        println!("{value:#}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Calibration
// ─────────────────────────────────────────────────────────────────────────────

pub fn validate(cfg: &Config, out: Output) -> Result<(), CubeError> {
    let ac = cfg.assembler_config()?;
    ac.tables.validate(&ac.pixel_maps)?;

    let phases: Vec<_> = Orientation::ALL
        .iter()
        .map(|&o| {
            let mapping = ac.tables.for_orientation(o);
            (o.label(), mapping.len(), mapping.written().count())
        })
        .collect();

    if out.json {
        out.print_json(json!({
            "valid": true,
            "phases": phases
                .iter()
                .map(|(phase, samples, writes)| json!({
                    "phase": phase, "samples": samples, "writes": writes,
                }))
                .collect::<Vec<_>>(),
        }));
    } else {
        println!(
            "{} mapping tables write every non-center facelet exactly once",
            "✓".green().bold()
        );
        for (phase, samples, writes) in phases {
            println!("    {:<8} {samples:>2} samples, {writes:>2} writes", phase.bold());
        }
    }
    Ok(())
}

pub fn classify(cfg: &Config, r: u8, g: u8, b: u8, out: Output) -> Result<(), CubeError> {
    let face = ColorClassifier::new(cfg.palette.clone()).classify(Rgb::new(r, g, b));
    if out.json {
        out.print_json(json!({ "rgb": [r, g, b], "face": face }));
    } else {
        println!("rgb({r}, {g}, {b}) → {}", face.to_string().bold());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconstruction
// ─────────────────────────────────────────────────────────────────────────────

pub fn simulate(cfg: &Config, scramble: &str, solve: bool, out: Output) -> Result<(), CubeError> {
    let scramble: Algorithm = scramble.parse()?;
    let ac = cfg.assembler_config()?;
    let cube = SimCube::scrambled(&scramble).into_shared();
    let (width, height) = frame_size(&ac.pixel_maps);
    let camera = SimCamera::new(
        cube.clone(),
        sim_view(&ac),
        ac.palette.colors_by_face(),
        width,
        height,
    );
    let actuator = SimActuator::new(cube.clone());
    let mut assembler = Assembler::new(Box::new(camera), Box::new(actuator), ac)?;

    if solve {
        let solver = configured_solver(cfg)?;
        let report = SolveSession::run(&mut assembler, &solver)?;
        let solved = sim_facelets(&cube)? == SOLVED_FACELETS;
        if out.json {
            out.print_json(json!({ "report": report, "solved": solved }));
        } else {
            print_report(&report);
            print_check(solved, "simulator is solved", "simulator is NOT solved");
        }
    } else {
        let facelets = assembler.reconstruct_string()?;
        let matches = sim_facelets(&cube)? == facelets;
        if out.json {
            out.print_json(json!({ "facelets": facelets, "matches_simulator": matches }));
        } else {
            println!("  state     {}", facelets.bold());
            print_check(
                matches,
                "matches the simulator",
                "differs from the simulator",
            );
        }
    }
    Ok(())
}

pub fn reconstruct(
    cfg: &Config,
    frames: Vec<PathBuf>,
    port: Option<String>,
    solve: bool,
    out: Output,
) -> Result<(), CubeError> {
    let link = SerialLink::open(resolve_port(cfg, port)?)?;
    let camera = FrameFileCamera::new(frames);
    let mut assembler = Assembler::new(Box::new(camera), Box::new(link), cfg.assembler_config()?)?;

    if solve {
        let solver = configured_solver(cfg)?;
        let report = SolveSession::run(&mut assembler, &solver)?;
        if out.json {
            out.print_json(json!(report));
        } else {
            print_report(&report);
        }
    } else {
        let facelets = assembler.reconstruct_string()?;
        if out.json {
            out.print_json(json!({ "facelets": facelets }));
        } else {
            println!("  state     {}", facelets.bold());
        }
    }
    Ok(())
}

pub fn rotate(
    cfg: &Config,
    algorithm: &str,
    port: Option<String>,
    out: Output,
) -> Result<(), CubeError> {
    let algorithm: Algorithm = algorithm.parse()?;
    let mut link = SerialLink::open(resolve_port(cfg, port)?)?;
    link.rotate(&algorithm)?;
    if out.json {
        out.print_json(json!({ "sent": algorithm.to_string(), "confirmed": true }));
    } else {
        println!("{} {} confirmed", "✓".green().bold(), algorithm.to_string().bold());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

pub fn config_init(path: Option<&Path>, force: bool, out: Output) -> Result<(), CubeError> {
    let target = path.map_or_else(config::config_path, Path::to_path_buf);
    if target.exists() && !force {
        return Err(CubeError::Config(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }
    let cfg = Config::default();
    match path {
        Some(p) => config::save_to(&cfg, p)?,
        None => config::save(&cfg)?,
    }
    if out.json {
        out.print_json(json!({ "written": target.display().to_string() }));
    } else {
        println!("{} wrote {}", "✓".green().bold(), target.display().to_string().bold());
    }
    Ok(())
}

pub fn config_show(cfg: &Config, out: Output) -> Result<(), CubeError> {
    if out.json {
        let value = serde_json::to_value(cfg)
            .map_err(|e| CubeError::Config(format!("failed to serialize config: {e}")))?;
        out.print_json(value);
    } else {
        let raw = toml::to_string_pretty(cfg)
            .map_err(|e| CubeError::Config(format!("failed to serialize config: {e}")))?;
        print!("{raw}");
    }
    Ok(())
}

pub fn config_path(path: Option<&Path>, out: Output) -> Result<(), CubeError> {
    let target = path.map_or_else(config::config_path, Path::to_path_buf);
    if out.json {
        out.print_json(json!({ "path": target.display().to_string() }));
    } else {
        println!("{}", target.display());
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn resolve_port(cfg: &Config, port: Option<String>) -> Result<String, CubeError> {
    port.or_else(|| cfg.serial_port.clone()).ok_or_else(|| {
        CubeError::Config(
            "no serial port: pass --port or set serial_port / CUBESIGHT_SERIAL_PORT".to_string(),
        )
    })
}

fn configured_solver(cfg: &Config) -> Result<cubesight_runtime::ExternalSolver, CubeError> {
    cfg.solver.clone().ok_or_else(|| {
        CubeError::Config("no solver configured: set [solver] or CUBESIGHT_SOLVER".to_string())
    })
}

/// Facelets the simulated camera sees, at every pixel any orientation
/// samples them from.  The camera is fixed, so sample `i` of every phase
/// looks at the position the default mapping reads as sample `i`.
fn sim_view(ac: &AssemblerConfig) -> Vec<(Facelet, u32, u32)> {
    let mut view: Vec<(Facelet, u32, u32)> = Vec::new();
    for &o in &Orientation::ALL {
        let points = ac.pixel_maps.for_orientation(o).points();
        for (slot, &(x, y)) in ac.tables.default.slots().iter().zip(points) {
            if let Some(f) = slot.facelet()
                && !view.contains(&(f, x, y))
            {
                view.push((f, x, y));
            }
        }
    }
    view
}

/// Smallest frame, at least 640×480, that fits every configured point.
fn frame_size(maps: &PixelMaps) -> (u32, u32) {
    Orientation::ALL
        .iter()
        .flat_map(|&o| maps.for_orientation(o).points().iter().copied())
        .fold((640, 480), |(w, h), (x, y)| {
            (w.max(x.saturating_add(2)), h.max(y.saturating_add(2)))
        })
}

fn sim_facelets(cube: &SharedCube) -> Result<String, CubeError> {
    cube.lock()
        .map(|c| c.facelet_string())
        .map_err(|_| CubeError::Config("simulated cube lock poisoned".to_string()))
}

fn print_report(report: &SolveReport) {
    println!("  state     {}", report.facelets.bold());
    if report.solution.is_empty() {
        println!("  solution  {}", "(already solved)".dimmed());
    } else {
        println!(
            "  solution  {} {}",
            report.solution.to_string().bold(),
            format!("({} moves)", report.solution.len()).dimmed()
        );
    }
}

fn print_check(ok: bool, good: &str, bad: &str) {
    if ok {
        println!("{} {good}", "✓".green().bold());
    } else {
        println!("{} {bad}", "✗".red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubesight_kernel::MappingTables;

    #[test]
    fn sim_view_pairs_default_writes_with_points() {
        let view = sim_view(&AssemblerConfig::default());
        assert_eq!(view.len(), 24);
        assert_eq!(view[0], ("U1".parse().unwrap(), 260, 40));
        assert_eq!(view[23].0, "F9".parse::<Facelet>().unwrap());
    }

    #[test]
    fn sim_view_covers_points_of_every_orientation() {
        let mut ac = AssemblerConfig::default();
        let shifted: Vec<_> = ac.pixel_maps.fb.points().iter().map(|&(x, y)| (x + 5, y + 5)).collect();
        ac.pixel_maps.fb = cubesight_perception::PixelMap::new(shifted);
        let view = sim_view(&ac);
        assert_eq!(view.len(), 48);
        assert!(view.contains(&("U1".parse().unwrap(), 265, 45)));
    }

    #[test]
    fn simulate_reconstructs_with_distinct_phase_maps() {
        let mut cfg = Config::default();
        let shifted: Vec<_> = cfg.pixel_maps.lr.points().iter().map(|&(x, y)| (x + 4, y)).collect();
        cfg.pixel_maps.lr = cubesight_perception::PixelMap::new(shifted);
        assert!(simulate(&cfg, "R U R' F2", false, Output { json: true }).is_ok());
    }

    #[test]
    fn frame_size_grows_to_fit_points() {
        assert_eq!(frame_size(&PixelMaps::default()), (640, 480));
        let mut maps = PixelMaps::default();
        maps.ud = cubesight_perception::PixelMap::new(vec![(700, 10)]);
        assert_eq!(frame_size(&maps), (702, 480));
    }

    #[test]
    fn port_flag_wins_over_config() {
        let cfg = Config {
            serial_port: Some("/dev/ttyACM0".into()),
            ..Config::default()
        };
        assert_eq!(resolve_port(&cfg, Some("/dev/ttyUSB0".into())).unwrap(), "/dev/ttyUSB0");
        assert_eq!(resolve_port(&cfg, None).unwrap(), "/dev/ttyACM0");
        assert!(matches!(
            resolve_port(&Config::default(), None),
            Err(CubeError::Config(_))
        ));
    }

    #[test]
    fn simulate_without_solver_config_fails_cleanly() {
        let out = Output { json: true };
        assert!(matches!(
            simulate(&Config::default(), "R U", true, out),
            Err(CubeError::Config(_))
        ));
    }

    #[test]
    fn simulate_reconstructs_with_default_config() {
        assert!(simulate(&Config::default(), "R U R' F2", false, Output { json: true }).is_ok());
    }

    #[test]
    fn bad_scramble_is_rejected() {
        assert!(matches!(
            simulate(&Config::default(), "R Q", false, Output { json: false }),
            Err(CubeError::InvalidNotation(_))
        ));
    }

    #[test]
    fn validate_rejects_overlapping_override() {
        let t = MappingTables::standard();
        let cfg = Config {
            mappings: Some(config::MappingOverrides {
                default: t.default.to_string(),
                fb: t.fb.to_string(),
                lr: t.lr.to_string(),
                // UD re-reads the default view.
                ud: t.default.to_string(),
            }),
            ..Config::default()
        };
        assert!(matches!(
            validate(&cfg, Output { json: true }),
            Err(CubeError::MappingConsistency(_))
        ));
    }
}
