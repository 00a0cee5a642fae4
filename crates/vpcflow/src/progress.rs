use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use vpcflow_core::{ProvisionEvent, Reporter};

/// Prints provisioning events as they happen, with a spinner during NAT waits
#[derive(Default)]
pub struct ConsoleReporter {
    spinner: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    fn start_spinner(&mut self, message: String) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("  {spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(pb);
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Clear any spinner still on screen
    pub fn finish(&mut self) {
        self.stop_spinner();
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: ProvisionEvent<'_>) {
        self.stop_spinner();

        match event {
            ProvisionEvent::StageStarted {
                number,
                total,
                title,
            } => {
                println!();
                println!("{}", format!("[{}/{}] {}", number, total, title).bold());
            }
            ProvisionEvent::Created {
                resource_type,
                name,
                id,
            } => {
                println!("  ✓ {} {}: {}", resource_type, name, id.cyan());
            }
            ProvisionEvent::Completed { message, .. } => {
                println!("  ✓ {}", message);
            }
            ProvisionEvent::WaitStarted { name, id } => {
                self.start_spinner(format!("Waiting for {} ({}) to become available...", name, id));
            }
            ProvisionEvent::Failed { action_id, error } => {
                eprintln!("  {} {}: {}", "✗".red(), action_id, error);
            }
            ProvisionEvent::Skipped { action_id, reason } => {
                println!("  {} {} ({})", "-".yellow(), action_id, reason);
            }
        }
    }
}
