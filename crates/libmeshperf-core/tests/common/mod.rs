//! In-memory machine used by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use libmeshperf_core::{CommandOutput, Machine, MachineError};

type Responder = dyn Fn(&str) -> Result<CommandOutput, MachineError> + Send + Sync;

/// Tracks how many remote commands are running at once across machines
#[derive(Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct FakeMachine {
    name: String,
    address: String,
    responder: Box<Responder>,
    delay: Duration,
    in_flight: Option<Arc<InFlight>>,
    pub commands: Mutex<Vec<String>>,
    pub installed: Mutex<Vec<String>>,
    pub uninstalled: Mutex<Vec<String>>,
    pub moved: Mutex<Vec<(String, String)>>,
}

impl FakeMachine {
    pub fn new<F>(index: usize, responder: F) -> Self
    where
        F: Fn(&str) -> Result<CommandOutput, MachineError> + Send + Sync + 'static,
    {
        Self {
            name: format!("vm-{}", index),
            address: format!("10.0.0.{}", index + 1),
            responder: Box::new(responder),
            delay: Duration::ZERO,
            in_flight: None,
            commands: Mutex::new(Vec::new()),
            installed: Mutex::new(Vec::new()),
            uninstalled: Mutex::new(Vec::new()),
            moved: Mutex::new(Vec::new()),
        }
    }

    /// Machine answering TCP_STREAM and TCP_RR with fixed reports
    pub fn netperf(index: usize, stream_report: &str, rr_report: &str) -> Self {
        let stream_report = stream_report.to_string();
        let rr_report = rr_report.to_string();
        Self::new(index, move |cmd| {
            let stdout = if cmd.contains("-t TCP_STREAM") {
                stream_report.clone()
            } else if cmd.contains("-t TCP_RR") {
                rr_report.clone()
            } else {
                String::new()
            };
            Ok(ok(stdout))
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_in_flight(mut self, in_flight: Arc<InFlight>) -> Self {
        self.in_flight = Some(in_flight);
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Machine for FakeMachine {
    fn name(&self) -> &str {
        &self.name
    }

    fn internal_address(&self) -> &str {
        &self.address
    }

    fn remote_command(&self, command: &str) -> Result<CommandOutput, MachineError> {
        self.commands.lock().unwrap().push(command.to_string());

        if let Some(ref in_flight) = self.in_flight {
            let now = in_flight.current.fetch_add(1, Ordering::SeqCst) + 1;
            in_flight.peak.fetch_max(now, Ordering::SeqCst);
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(ref in_flight) = self.in_flight {
            in_flight.current.fetch_sub(1, Ordering::SeqCst);
        }

        (self.responder)(command)
    }

    fn install_package(&self, name: &str) -> Result<(), MachineError> {
        self.installed.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn uninstall_package(&self, name: &str) -> Result<(), MachineError> {
        self.uninstalled.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn move_file(&self, destination: &dyn Machine, filename: &str) -> Result<(), MachineError> {
        self.moved
            .lock()
            .unwrap()
            .push((destination.name().to_string(), filename.to_string()));
        Ok(())
    }
}

pub fn ok(stdout: impl Into<String>) -> CommandOutput {
    CommandOutput {
        stdout: stdout.into(),
        ..Default::default()
    }
}

pub fn failed(exit_code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        stderr: stderr.to_string(),
        exit_code,
        ..Default::default()
    }
}
