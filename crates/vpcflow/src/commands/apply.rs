use crate::progress::ConsoleReporter;
use crate::utils;
use colored::Colorize;
use vpcflow_cloud::{NetworkProvider, StateManager};
use vpcflow_cloud_aws::Ec2NetworkProvider;
use vpcflow_config::Settings;
use vpcflow_core::{Provisioner, Topology};

pub async fn handle(topology: Topology, yes: bool, no_state: bool) -> anyhow::Result<()> {
    println!("{}", "Provisioning the network...".blue().bold());
    topology.validate()?;
    let settings = Settings::load()?;

    println!();
    utils::print_topology(&topology);

    // Confirm (unless --yes)
    if !yes {
        println!();
        utils::print_plan(&topology.plan());
        println!();
        println!(
            "{}",
            "Warning: NAT gateways and elastic IPs are billed from the moment they exist.".yellow()
        );
        println!("Pass --yes to create these resources");
        return Ok(());
    }

    println!();
    println!("{}", "Connecting to AWS...".blue());
    let provider = Ec2NetworkProvider::connect(&topology.region, settings.profile.as_deref()).await;
    preflight(&provider, &topology).await?;

    let state_manager = if no_state {
        None
    } else {
        Some(StateManager::new(settings.state_root()?))
    };
    let lock = match &state_manager {
        Some(manager) => Some(manager.acquire_lock().await?),
        None => None,
    };

    let provisioner = Provisioner::new(provider, topology)
        .with_nat_wait_timeout(settings.nat_wait_timeout());
    let mut reporter = ConsoleReporter::new();
    let outcome = provisioner.run(&mut reporter).await;
    reporter.finish();

    utils::print_apply_summary(&outcome);

    if let Some(manager) = &state_manager
        && outcome.save_state(manager, provisioner.topology()).await?
    {
        println!(
            "State saved: {}",
            manager.state_path().display().to_string().cyan()
        );
    }
    if let Some(lock) = lock {
        lock.release().await?;
    }

    outcome.ensure_complete()?;
    Ok(())
}

/// Check credentials and zone availability before anything is created
async fn preflight<P: NetworkProvider>(provider: &P, topology: &Topology) -> anyhow::Result<()> {
    let status = provider
        .check_auth()
        .await?
        .ensure_authenticated(provider.display_name())?;
    println!(
        "  ✓ Authenticated ({})",
        status.account_info.as_deref().unwrap_or(provider.region())
    );

    let missing = status.missing_zones(&topology.availability_zones);
    if !missing.is_empty() {
        anyhow::bail!(
            "availability zones not offered in {}: {}",
            provider.region(),
            missing.join(", ")
        );
    }
    println!(
        "  ✓ Availability zones: {}",
        topology.availability_zones.join(", ")
    );

    Ok(())
}
