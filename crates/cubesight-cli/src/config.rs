//! Configuration vault – reads/writes `~/.cubesight/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use cubesight_kernel::MappingTables;
use cubesight_perception::{Palette, PixelMaps};
use cubesight_runtime::{AssemblerConfig, ExternalSolver, LogFormat};
use cubesight_types::CubeError;
use serde::{Deserialize, Serialize};

/// Token overrides for the four observation mappings, e.g.
/// `fb = "D9 D8 D7 - - D3 ..."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingOverrides {
    pub default: String,
    pub fb: String,
    pub lr: String,
    pub ud: String,
}

/// Persisted rig configuration.  Every field has a default, so an empty
/// file is a valid configuration for the standard rig.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Console log format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Serial device of the face-turning controller, e.g. `/dev/ttyACM0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_port: Option<String>,

    /// External solver invoked with the facelet string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<ExternalSolver>,

    /// Reference colors, one per face.
    #[serde(default)]
    pub palette: Palette,

    /// Pixel coordinates per orientation.
    #[serde(default)]
    pub pixel_maps: PixelMaps,

    /// Replaces the standard mapping tables when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<MappingOverrides>,
}

impl Config {
    /// Calibration for the assembler.
    ///
    /// # Errors
    ///
    /// [`CubeError::InvalidNotation`] for a bad mapping override token.
    pub fn assembler_config(&self) -> Result<AssemblerConfig, CubeError> {
        let tables = match &self.mappings {
            Some(m) => MappingTables::from_tokens(&m.default, &m.fb, &m.lr, &m.ud)?,
            None => MappingTables::standard(),
        };
        Ok(AssemblerConfig {
            palette: self.palette.clone(),
            pixel_maps: self.pixel_maps.clone(),
            tables,
        })
    }
}

/// Return the path to `~/.cubesight/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".cubesight").join("config.toml")
}

/// Load from `path`, or from [`config_path`] when `None`.  A missing
/// default file yields the default configuration; a missing explicit file
/// is an error.
pub fn load(path: Option<&Path>) -> Result<Config, CubeError> {
    match path {
        Some(p) => load_from(p)?
            .ok_or_else(|| CubeError::Config(format!("config file {} not found", p.display()))),
        None => Ok(load_from(&config_path())?.unwrap_or_else(|| {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            cfg
        })),
    }
}

/// Load the config from a specific path.  Returns `None` if the file does
/// not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, CubeError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        CubeError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| CubeError::Config(format!("failed to parse config: {e}")))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `CUBESIGHT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `CUBESIGHT_SERIAL_PORT` | `serial_port` |
/// | `CUBESIGHT_SOLVER` | `solver` (program followed by its arguments) |
/// | `CUBESIGHT_LOG_FORMAT` | `log_format` |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides_from(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides_from(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CUBESIGHT_SERIAL_PORT") {
        cfg.serial_port = Some(v);
    }
    if let Some(v) = lookup("CUBESIGHT_SOLVER") {
        let mut words = v.split_whitespace().map(str::to_string);
        if let Some(program) = words.next() {
            cfg.solver = Some(ExternalSolver::new(program, words.collect()));
        }
    }
    if let Some(v) = lookup("CUBESIGHT_LOG_FORMAT")
        && let Ok(format) = v.parse::<LogFormat>()
    {
        cfg.log_format = format;
    }
}

/// Save the config to [`config_path`], creating `~/.cubesight/` if
/// necessary.
pub fn save(cfg: &Config) -> Result<(), CubeError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), CubeError> {
    let io_err = |what: &str, e: std::io::Error| CubeError::Config(format!("{what}: {e}"));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err("failed to create config directory", e))?;
        // Owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| io_err("failed to set config directory permissions", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| CubeError::Config(format!("failed to serialize config: {e}")))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| io_err(&format!("failed to write config at {}", path.display()), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| io_err(&format!("failed to write config at {}", path.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubesight_types::{Face, Rgb};

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(path.parent().unwrap())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn roundtrip_full_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config {
            log_format: LogFormat::Json,
            solver: Some(ExternalSolver::new("kociemba", vec!["--quiet".into()])),
            mappings: Some(MappingOverrides {
                default: MappingTables::standard().default.to_string(),
                fb: MappingTables::standard().fb.to_string(),
                lr: MappingTables::standard().lr.to_string(),
                ud: MappingTables::standard().ud.to_string(),
            }),
            ..Config::default()
        };
        save_to(&cfg, &path).expect("save");

        let raw = std::fs::read_to_string(&path).unwrap();
        let loaded: Config = toml::from_str(&raw).unwrap();
        assert_eq!(loaded.palette, cfg.palette);
        assert_eq!(loaded.pixel_maps, cfg.pixel_maps);
        assert_eq!(loaded.mappings, cfg.mappings);
        assert_eq!(loaded.log_format, LogFormat::Json);
        assert_eq!(
            loaded.assembler_config().unwrap().tables,
            MappingTables::standard()
        );
    }

    #[test]
    fn empty_file_is_the_standard_rig() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.palette, Palette::standard());
        assert_eq!(cfg.pixel_maps, PixelMaps::default());
        assert!(cfg.serial_port.is_none());
        assert_eq!(cfg.assembler_config().unwrap().tables, MappingTables::standard());
    }

    #[test]
    fn partial_file_overrides_palette() {
        let cfg: Config = toml::from_str(
            r#"
            serial_port = "/dev/ttyACM0"

            [[palette]]
            face = "U"
            rgb = [250, 250, 250]
            [[palette]]
            face = "R"
            rgb = [200, 0, 0]
            [[palette]]
            face = "F"
            rgb = [0, 150, 0]
            [[palette]]
            face = "D"
            rgb = [250, 220, 0]
            [[palette]]
            face = "L"
            rgb = [250, 120, 0]
            [[palette]]
            face = "B"
            rgb = [0, 0, 200]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.serial_port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(cfg.palette.color_of(Face::B), Rgb::new(0, 0, 200));
    }

    #[test]
    fn palette_with_repeated_face_is_rejected() {
        let err = toml::from_str::<Config>(
            r#"palette = [
                { face = "U", rgb = [0, 0, 0] }, { face = "U", rgb = [1, 1, 1] },
                { face = "F", rgb = [2, 2, 2] }, { face = "D", rgb = [3, 3, 3] },
                { face = "L", rgb = [4, 4, 4] }, { face = "B", rgb = [5, 5, 5] },
            ]"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn bad_mapping_token_is_reported() {
        let cfg = Config {
            mappings: Some(MappingOverrides {
                default: "U1 x".into(),
                fb: String::new(),
                lr: String::new(),
                ud: String::new(),
            }),
            ..Config::default()
        };
        assert!(matches!(
            cfg.assembler_config(),
            Err(CubeError::InvalidNotation(_))
        ));
    }

    #[test]
    fn config_path_points_to_cubesight_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".cubesight"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("nope.toml");
        assert!(matches!(load(Some(&path)), Err(CubeError::Config(_))));
    }

    #[test]
    fn overrides_set_serial_port_and_solver() {
        let mut cfg = Config::default();
        apply_overrides_from(&mut cfg, |key| match key {
            "CUBESIGHT_SERIAL_PORT" => Some("/dev/ttyUSB1".into()),
            "CUBESIGHT_SOLVER" => Some("python3 -m kociemba".into()),
            _ => None,
        });
        assert_eq!(cfg.serial_port.as_deref(), Some("/dev/ttyUSB1"));
        let solver = cfg.solver.unwrap();
        assert_eq!(solver.program, "python3");
        assert_eq!(solver.args, ["-m", "kociemba"]);
    }

    #[test]
    fn overrides_ignore_invalid_log_format() {
        let mut cfg = Config::default();
        apply_overrides_from(&mut cfg, |key| {
            (key == "CUBESIGHT_LOG_FORMAT").then(|| "pretty".to_string())
        });
        assert_eq!(cfg.log_format, LogFormat::Compact);

        apply_overrides_from(&mut cfg, |key| {
            (key == "CUBESIGHT_LOG_FORMAT").then(|| "json".to_string())
        });
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn no_overrides_leave_config_untouched() {
        let mut cfg = Config::default();
        apply_overrides_from(&mut cfg, no_env);
        assert_eq!(cfg, Config::default());
    }
}
