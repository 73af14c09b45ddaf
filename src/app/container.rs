use std::sync::Arc;

use crate::adapters::toml_config::RepairConfig;
use crate::adapters::{FFmpegAdapter, FFprobeAdapter};
use crate::app::{AnalyzeInteractor, RepairInteractor, VerifyInteractor};
use crate::engine::FfmpegCommands;
use crate::ports::{ExecutePort, ProbePort};

/// Wires ports into the interactors
pub struct AppContainer {
    analyze_interactor: Arc<AnalyzeInteractor>,
    repair_interactor: Arc<RepairInteractor>,
    verify_interactor: Arc<VerifyInteractor>,
}

impl AppContainer {
    /// Production wiring: ffprobe/ffmpeg subprocesses
    pub fn new(config: &RepairConfig) -> Self {
        let execute_port: Arc<dyn ExecutePort> = Arc::new(FFmpegAdapter::new(&config.tools));
        let probe_port: Arc<dyn ProbePort> =
            Arc::new(FFprobeAdapter::new(Arc::clone(&execute_port)));
        Self::with_ports(config, probe_port, execute_port)
    }

    /// Wiring with caller-supplied ports
    pub fn with_ports(
        config: &RepairConfig,
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
    ) -> Self {
        let commands = FfmpegCommands::new(config.encoding.clone(), config.detection.clone());

        let analyze_interactor = Arc::new(AnalyzeInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&execute_port),
            commands.clone(),
            config.detection.clone(),
        ));

        let repair_interactor = Arc::new(RepairInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&execute_port),
            commands,
            config.detection.clone(),
        ));

        let verify_interactor = Arc::new(VerifyInteractor::new(Arc::clone(&probe_port)));

        Self {
            analyze_interactor,
            repair_interactor,
            verify_interactor,
        }
    }

    pub fn analyze_interactor(&self) -> Arc<AnalyzeInteractor> {
        Arc::clone(&self.analyze_interactor)
    }

    pub fn repair_interactor(&self) -> Arc<RepairInteractor> {
        Arc::clone(&self.repair_interactor)
    }

    pub fn verify_interactor(&self) -> Arc<VerifyInteractor> {
        Arc::clone(&self.verify_interactor)
    }
}
