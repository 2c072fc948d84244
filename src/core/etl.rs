use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load once; returns the written report
    /// locations.
    pub fn run(&mut self) -> Result<Vec<String>> {
        tracing::info!("Starting analysis...");

        // Extract
        let raw = self.pipeline.extract()?;
        tracing::info!("Extracted {} records", raw.len());
        self.monitor.log_stage("extract", raw.len());

        // Transform
        let enriched = self.pipeline.transform(raw)?;
        tracing::info!("Transformed {} records", enriched.len());
        self.monitor.log_stage("transform", enriched.len());

        // Load
        let outputs = self.pipeline.load(&enriched)?;
        for output in &outputs {
            tracing::info!("Report saved to: {}", output);
        }
        self.monitor.log_stage("load", enriched.len());
        self.monitor.log_final_stats();

        Ok(outputs)
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }
}
