//! Configuration for the lane autopilot
//!
//! Loads all construction-time parameters from a TOML file. Nothing here is
//! mutable at runtime.

use crate::core::geometry::CropBox;
use crate::core::source::HoughParams;
use crate::core::types::Point;
use crate::error::{Error, Result};
use crate::lane::classifier::DEFAULT_MIN_ABS_SLOPE;
use crate::lane::estimator::DEFAULT_LANE_WINDOW;
use crate::lane::offset::DEFAULT_SINGLE_LINE_OFFSET;
use crate::lane::steering::{DEFAULT_STEERING_SCALE, DEFAULT_STEERING_WINDOW};
use crate::link::constants::{
    DEFAULT_COMMAND_PORT, DEFAULT_RECEIVE_TIMEOUT_MS, DEFAULT_SEND_INTERVAL_MS,
    DEFAULT_TELEMETRY_PORT, PROTOCOL_ID,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub vision: VisionConfig,
    pub estimator: EstimatorConfig,
    pub steering: SteeringConfig,
    pub link: LinkConfig,
    pub logging: LoggingConfig,
}

/// Frame geometry and segment extraction parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Crop rectangle in full-frame pixels
    pub crop: CropBox,
    /// ROI quadrilateral as fractions of the cropped size:
    /// `[x1, y1, x2, y2, x3, y3, x4, y4]`
    pub roi: [f64; 8],
    /// Hough transform parameters passed to the extractor
    pub hough: HoughParams,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            // 1920x1080 display with the left 200px (game HUD) cut away
            crop: CropBox {
                top_left: Point::new(200, 0),
                bottom_right: Point::new(1920, 1080),
            },
            roi: [0.22, 0.8, 0.4, 0.55, 0.6, 0.55, 0.78, 0.8],
            hough: HoughParams::default(),
        }
    }
}

/// Lane line estimation parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Frames averaged per lane side
    pub lane_window: usize,
    /// Segments with `|slope|` at or below this are ignored
    pub min_abs_slope: f64,
    /// Delta applied when only one lane line is visible (pixels)
    pub single_line_offset: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            lane_window: DEFAULT_LANE_WINDOW,
            min_abs_slope: DEFAULT_MIN_ABS_SLOPE,
            single_line_offset: DEFAULT_SINGLE_LINE_OFFSET,
        }
    }
}

/// Steering output parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Deltas averaged by the steering smoother
    pub window: usize,
    /// Pixel delta that maps to one full unit of steering
    pub scale: f64,
    /// Constant throttle published alongside steering (0-1)
    pub throttle: f64,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_STEERING_WINDOW,
            scale: DEFAULT_STEERING_SCALE,
            throttle: 0.0,
        }
    }
}

/// Vehicle link (UDP) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Protocol identifier used in the discovery handshake
    pub protocol_id: String,
    /// Client name announced during pairing
    pub client_name: String,
    /// Security code shown by the vehicle (QR code in game)
    pub security_code: u32,
    /// Local interface address; the telemetry socket binds here
    pub local_host: String,
    /// Vehicle host receiving command records
    pub remote_host: String,
    /// Destination for the discovery datagram
    pub broadcast_host: String,
    /// Vehicle command port (discovery + command records)
    pub command_port: u16,
    /// Local telemetry port (pairing reply + telemetry records)
    pub telemetry_port: u16,
    /// Send loop cadence in milliseconds
    pub send_interval_ms: u64,
    /// Socket read timeout (also the pairing window) in milliseconds
    pub receive_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            protocol_id: PROTOCOL_ID.to_string(),
            client_name: "lane-autopilot".to_string(),
            security_code: 0,
            local_host: "0.0.0.0".to_string(),
            remote_host: "127.0.0.1".to_string(),
            broadcast_host: "255.255.255.255".to_string(),
            command_port: DEFAULT_COMMAND_PORT,
            telemetry_port: DEFAULT_TELEMETRY_PORT,
            send_interval_ms: DEFAULT_SEND_INTERVAL_MS,
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
        }
    }
}

impl LinkConfig {
    /// Local bind address for the persistent socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.local_host, self.telemetry_port)
    }

    /// Vehicle command address
    pub fn remote_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.remote_host, self.command_port)
    }

    /// Discovery destination address
    pub fn broadcast_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.broadcast_host, self.command_port)
    }

    #[inline]
    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    #[inline]
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

fn parse_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{}:{}", host, port)
        .parse()
        .map_err(|e| Error::Config(format!("invalid address {}:{}: {}", host, port, e)))
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Example
    /// ```no_run
    /// use lane_autopilot::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("autopilot.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        self.vision.crop.validate()?;
        if self.vision.roi.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return Err(Error::Config(format!(
                "ROI fractions must be in [0, 1]: {:?}",
                self.vision.roi
            )));
        }
        if self.estimator.lane_window == 0 {
            return Err(Error::Config("estimator.lane_window must be > 0".into()));
        }
        if self.steering.window == 0 {
            return Err(Error::Config("steering.window must be > 0".into()));
        }
        if self.steering.scale == 0.0 || !self.steering.scale.is_finite() {
            return Err(Error::Config("steering.scale must be finite and non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.steering.throttle) {
            return Err(Error::Config("steering.throttle must be in [0, 1]".into()));
        }
        if self.link.send_interval_ms == 0 || self.link.receive_timeout_ms == 0 {
            return Err(Error::Config(
                "link.send_interval_ms and link.receive_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.vision.crop.size(), Point::new(1720, 1080));
        assert_eq!(config.estimator.lane_window, 5);
        assert_eq!(config.estimator.single_line_offset, 100.0);
        assert_eq!(config.steering.scale, 600.0);
        assert_eq!(config.link.command_port, 4444);
        assert_eq!(config.link.telemetry_port, 4445);
        assert_eq!(config.link.send_interval_ms, 60);
        assert_eq!(config.link.receive_timeout_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[vision]"));
        assert!(toml_string.contains("[estimator]"));
        assert!(toml_string.contains("[steering]"));
        assert!(toml_string.contains("[link]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("protocol_id = \"beamng\""));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[vision]
roi = [0.2, 0.95, 0.45, 0.6, 0.55, 0.6, 0.8, 0.95]
crop = { top_left = { x = 0, y = 0 }, bottom_right = { x = 1280, y = 720 } }

[estimator]
lane_window = 8

[steering]
throttle = 0.3

[link]
security_code = 46611
local_host = "192.168.1.5"
remote_host = "192.168.1.8"

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.vision.crop.size(), Point::new(1280, 720));
        assert_eq!(config.vision.hough, HoughParams::default());
        assert_eq!(config.estimator.lane_window, 8);
        assert_eq!(config.estimator.min_abs_slope, 0.55);
        assert_eq!(config.steering.throttle, 0.3);
        assert_eq!(config.link.security_code, 46611);
        assert_eq!(
            config.link.remote_addr().unwrap(),
            "192.168.1.8:4444".parse().unwrap()
        );
        assert_eq!(
            config.link.local_addr().unwrap(),
            "192.168.1.5:4445".parse().unwrap()
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_vision_table_uses_defaults() {
        let toml_content = r#"
[vision]
roi = [0.1, 0.9, 0.4, 0.5, 0.6, 0.5, 0.9, 0.9]

[vision.hough]
threshold = 30
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.vision.roi[0], 0.1);
        assert_eq!(config.vision.crop, VisionConfig::default().crop);
        assert_eq!(config.vision.hough.threshold, 30);
        assert_eq!(config.vision.hough.max_line_gap, 25.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autopilot.toml");

        let mut config = AppConfig::default();
        config.link.client_name = "bench".to_string();
        config.to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.link.client_name, "bench");
        assert_eq!(loaded.vision.roi, config.vision.roi);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/autopilot.toml");
        let config = AppConfig::from_file(path).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.vision.crop, defaults.vision.crop);
        assert_eq!(config.vision.roi, defaults.vision.roi);
        assert_eq!(config.vision.hough, defaults.vision.hough);
        assert_eq!(config.link.security_code, 0);
        assert_eq!(config.link.broadcast_host, "255.255.255.255");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.steering.window = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = AppConfig::default();
        config.vision.roi[3] = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.link.remote_host = "not a host".to_string();
        assert!(config.link.remote_addr().is_err());
    }
}
